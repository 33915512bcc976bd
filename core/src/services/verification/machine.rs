//! OTP session state machine

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use otp_shared::phone::mask_phone_number;

use crate::domain::entities::{
    AttemptGuard, CooldownTimer, OtpBuffer, OtpSession, SessionStatus, VerificationTarget,
};
use crate::errors::{DomainResult, ErrorResponse, GatewayError, OtpError};

use super::config::OtpSessionConfig;
use super::traits::{RoutingResolver, VerificationGateway};
use super::types::{
    GatewayResponse, RequestTicket, ResendRequest, SessionCommand, SessionEvent, SessionSnapshot,
    VerificationReceipt, VerificationRequest,
};

/// Shown when the backend rejects a code without saying why
const DEFAULT_REJECTION_MESSAGE: &str = "Invalid verification code";

/// Shown when the backend refuses a resend without saying why
const DEFAULT_RESEND_REFUSAL_MESSAGE: &str = "Could not send a new code. Please try again later.";

/// The one request a session may have outstanding
#[derive(Debug, Clone)]
enum PendingRequest {
    Verification { ticket: RequestTicket, code: String },
    Resend { ticket: RequestTicket, resume: SessionStatus },
}

/// Owns an `OtpSession` and every transition it goes through.
///
/// Event handling is synchronous. An event that needs the backend yields a
/// `SessionCommand`; the host runs it through [`dispatch`](Self::dispatch)
/// and hands the resulting completion event back to [`handle`](Self::handle).
/// `Verifying` and `ResendInFlight` act as the locks for their request kinds,
/// and each request carries a ticket so late or duplicate completions are
/// dropped instead of applied.
pub struct OtpSessionMachine<G, R>
where
    G: VerificationGateway,
    R: RoutingResolver,
{
    /// Backend used for verification and resend calls
    gateway: Arc<G>,
    /// Receives the session once it is verified
    resolver: Arc<R>,
    /// Session policy
    config: OtpSessionConfig,
    session: OtpSession,
    pending: Option<PendingRequest>,
    last_ticket: u64,
    receipt: Option<VerificationReceipt>,
}

impl<G, R> OtpSessionMachine<G, R>
where
    G: VerificationGateway + 'static,
    R: RoutingResolver,
{
    /// Open a session for a code that has already been sent
    ///
    /// # Arguments
    ///
    /// * `gateway` - Verification backend
    /// * `resolver` - Post-verification routing
    /// * `config` - Code length, attempt cap, and cooldown
    /// * `target` - Phone number, purpose, and user id being verified
    ///
    /// # Returns
    ///
    /// * `Ok(OtpSessionMachine)` - Session in `AwaitingInput` with the cooldown running
    /// * `Err(DomainError)` - If the configuration or target is invalid
    pub fn new(
        gateway: Arc<G>,
        resolver: Arc<R>,
        config: OtpSessionConfig,
        target: VerificationTarget,
    ) -> DomainResult<Self> {
        config.validate()?;

        let session = OtpSession::new(
            target,
            OtpBuffer::new(config.code_length),
            AttemptGuard::new(config.max_attempts),
            CooldownTimer::started(config.resend_cooldown_seconds),
        )?;

        info!(
            session_id = %session.id(),
            phone = %mask_phone_number(session.phone_number()),
            purpose = %session.purpose(),
            event = "otp_session_started",
            "Started OTP verification session"
        );

        Ok(Self {
            gateway,
            resolver,
            config,
            session,
            pending: None,
            last_ticket: 0,
            receipt: None,
        })
    }

    pub fn session(&self) -> &OtpSession {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn config(&self) -> &OtpSessionConfig {
        &self.config
    }

    /// What was handed to the resolver, once verified
    pub fn receipt(&self) -> Option<&VerificationReceipt> {
        self.receipt.as_ref()
    }

    /// Whether a resend request would be issued right now
    pub fn can_resend(&self) -> bool {
        matches!(
            self.session.status,
            SessionStatus::AwaitingInput | SessionStatus::Locked
        ) && self.session.cooldown.is_expired()
            && self.pending.is_none()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session.id(),
            purpose: self.session.purpose(),
            phone_number: self.session.phone_number().to_string(),
            status: self.session.status(),
            digits: self.session.buffer().digits().to_vec(),
            attempt_count: self.session.attempt_count(),
            remaining_attempts: self.session.remaining_attempts(),
            cooldown_seconds_remaining: self.session.cooldown_seconds_remaining(),
            can_resend: self.can_resend(),
            last_error: self.session.last_error().map(ErrorResponse::from),
        }
    }

    /// Apply one event
    ///
    /// Never fails: every problem ends up in the session's `last_error`.
    ///
    /// # Returns
    ///
    /// The network call the host must now perform, if any
    pub fn handle(&mut self, event: SessionEvent) -> Option<SessionCommand> {
        if self.session.status.is_terminal() {
            debug!(
                session_id = %self.session.id(),
                status = %self.session.status,
                "Ignoring event on closed session"
            );
            return None;
        }

        match event {
            SessionEvent::DigitEntered { index, digit } => self.on_digit_entered(index, digit),
            SessionEvent::DigitCleared { index } => {
                self.on_digit_cleared(index);
                None
            }
            SessionEvent::PasteIngested { text } => self.on_paste(&text),
            SessionEvent::SubmitRequested => self.on_submit_requested(),
            SessionEvent::VerificationCompleted { ticket, result } => {
                self.on_verification_completed(ticket, result);
                None
            }
            SessionEvent::ResendRequested => self.on_resend_requested(),
            SessionEvent::ResendCompleted { ticket, result } => {
                self.on_resend_completed(ticket, result);
                None
            }
            SessionEvent::CooldownTick => {
                self.session.cooldown.tick();
                None
            }
            SessionEvent::Cancel => {
                self.cancel();
                None
            }
        }
    }

    /// Run a command against the gateway without borrowing the machine
    ///
    /// The returned future resolves to the completion event to feed back
    /// into [`handle`](Self::handle). It can be spawned, so the host keeps
    /// processing input while the call is in flight.
    pub fn dispatch(
        &self,
        command: SessionCommand,
    ) -> impl Future<Output = SessionEvent> + Send + 'static {
        let gateway = Arc::clone(&self.gateway);
        async move { command.execute(gateway.as_ref()).await }
    }

    /// Handle an event and, if it produced a command, perform it and apply
    /// the completion before returning
    pub async fn drive(&mut self, event: SessionEvent) -> SessionStatus {
        if let Some(command) = self.handle(event) {
            let completion = self.dispatch(command).await;
            self.handle(completion);
        }
        self.session.status()
    }

    fn on_digit_entered(&mut self, index: usize, digit: char) -> Option<SessionCommand> {
        if let Err(err) = self.session.buffer.set_digit(index, digit) {
            debug!(
                session_id = %self.session.id(),
                index = index,
                event = "otp_invalid_input",
                "Rejected digit input"
            );
            self.session.last_error = Some(err);
            return None;
        }
        self.session.last_error = None;
        self.submit_if_complete()
    }

    fn on_digit_cleared(&mut self, index: usize) {
        match self.session.buffer.clear_digit(index) {
            Ok(()) => self.session.last_error = None,
            Err(err) => self.session.last_error = Some(err),
        }
    }

    fn on_paste(&mut self, text: &str) -> Option<SessionCommand> {
        if !self.session.buffer.ingest_paste(text) {
            debug!(
                session_id = %self.session.id(),
                event = "otp_paste_ignored",
                "Pasted text did not contain a complete code"
            );
            return None;
        }
        self.session.last_error = None;
        self.submit_if_complete()
    }

    fn on_submit_requested(&mut self) -> Option<SessionCommand> {
        match self.session.status {
            SessionStatus::AwaitingInput if self.session.buffer.is_complete() => {
                self.begin_verification()
            }
            SessionStatus::AwaitingInput => {
                self.session.last_error = Some(OtpError::IncompleteCode {
                    filled: self.session.buffer.filled(),
                    expected: self.session.buffer.code_length(),
                });
                None
            }
            SessionStatus::Locked => {
                self.session.last_error = Some(OtpError::Locked {
                    max_attempts: self.session.max_attempts(),
                });
                None
            }
            _ => {
                self.session.last_error = Some(OtpError::RequestInFlight);
                None
            }
        }
    }

    fn submit_if_complete(&mut self) -> Option<SessionCommand> {
        if !self.session.buffer.is_complete() {
            return None;
        }
        match self.session.status {
            SessionStatus::AwaitingInput => self.begin_verification(),
            SessionStatus::Verifying => {
                debug!(
                    session_id = %self.session.id(),
                    event = "otp_duplicate_submit_suppressed",
                    "Code completed while a verification is in flight"
                );
                None
            }
            _ => None,
        }
    }

    fn begin_verification(&mut self) -> Option<SessionCommand> {
        let code = self.session.buffer.code()?;
        let ticket = self.issue_ticket();

        self.pending = Some(PendingRequest::Verification {
            ticket,
            code: code.clone(),
        });
        self.session.status = SessionStatus::Verifying;
        self.session.last_error = None;

        info!(
            session_id = %self.session.id(),
            phone = %mask_phone_number(self.session.phone_number()),
            ticket = %ticket,
            attempt = self.session.attempt_count() + 1,
            event = "otp_submitted",
            "Submitting verification code"
        );

        Some(SessionCommand::SubmitVerification {
            ticket,
            request: VerificationRequest {
                phone_number: self.session.phone_number().to_string(),
                code,
                purpose: self.session.purpose(),
                user_id: self.session.user_id().map(str::to_string),
            },
        })
    }

    fn on_verification_completed(
        &mut self,
        ticket: RequestTicket,
        result: Result<GatewayResponse, GatewayError>,
    ) {
        let code = match self.pending.take() {
            Some(PendingRequest::Verification {
                ticket: expected,
                code,
            }) if expected == ticket => code,
            other => {
                self.pending = other;
                debug!(
                    session_id = %self.session.id(),
                    ticket = %ticket,
                    event = "otp_stale_completion",
                    "Ignoring verification result that matches no outstanding request"
                );
                return;
            }
        };

        match result {
            Ok(response) if response.accepted => self.complete_verification(code),
            Ok(response) => self.reject_verification(response.message),
            Err(err) => {
                warn!(
                    session_id = %self.session.id(),
                    error = %err,
                    event = "otp_verification_transport_error",
                    "Verification call failed; attempt not counted"
                );
                self.session.status = SessionStatus::AwaitingInput;
                self.session.last_error = Some(OtpError::Transport {
                    detail: err.to_string(),
                });
            }
        }
    }

    fn complete_verification(&mut self, code: String) {
        self.session.status = SessionStatus::Verified;
        self.session.last_error = None;

        let receipt = VerificationReceipt {
            purpose: self.session.purpose(),
            phone_number: self.session.phone_number().to_string(),
            user_id: self.session.user_id().map(str::to_string),
            code,
            verified_at: Utc::now(),
        };

        info!(
            session_id = %self.session.id(),
            phone = %mask_phone_number(self.session.phone_number()),
            purpose = %self.session.purpose(),
            event = "otp_verified",
            "Verification code accepted"
        );

        self.resolver.resolve(&receipt);
        self.receipt = Some(receipt);
    }

    fn reject_verification(&mut self, message: String) {
        let message = if message.trim().is_empty() {
            DEFAULT_REJECTION_MESSAGE.to_string()
        } else {
            message
        };

        let locked = self.session.attempts.record_failure();
        self.session.last_error = Some(OtpError::Rejected { message });

        if locked {
            self.session.status = SessionStatus::Locked;
            warn!(
                session_id = %self.session.id(),
                phone = %mask_phone_number(self.session.phone_number()),
                attempts = self.session.attempt_count(),
                event = "otp_locked",
                "Maximum verification attempts reached"
            );
        } else {
            self.session.status = SessionStatus::AwaitingInput;
            warn!(
                session_id = %self.session.id(),
                remaining_attempts = self.session.remaining_attempts(),
                event = "otp_rejected",
                "Verification code rejected"
            );
        }
    }

    fn on_resend_requested(&mut self) -> Option<SessionCommand> {
        let resume = self.session.status;
        if !matches!(resume, SessionStatus::AwaitingInput | SessionStatus::Locked) {
            self.session.last_error = Some(OtpError::RequestInFlight);
            return None;
        }

        if !self.session.cooldown.is_expired() {
            let seconds_remaining = self.session.cooldown.remaining();
            debug!(
                session_id = %self.session.id(),
                cooldown_remaining = seconds_remaining,
                event = "otp_resend_throttled",
                "Resend requested during cooldown"
            );
            self.session.last_error = Some(OtpError::CooldownActive { seconds_remaining });
            return None;
        }

        let ticket = self.issue_ticket();
        self.pending = Some(PendingRequest::Resend { ticket, resume });
        self.session.status = SessionStatus::ResendInFlight;
        self.session.last_error = None;

        info!(
            session_id = %self.session.id(),
            phone = %mask_phone_number(self.session.phone_number()),
            ticket = %ticket,
            event = "otp_resend_requested",
            "Requesting a new verification code"
        );

        Some(SessionCommand::RequestResend {
            ticket,
            request: ResendRequest {
                phone_number: self.session.phone_number().to_string(),
                purpose: self.session.purpose(),
                user_id: self.session.user_id().map(str::to_string),
            },
        })
    }

    fn on_resend_completed(
        &mut self,
        ticket: RequestTicket,
        result: Result<GatewayResponse, GatewayError>,
    ) {
        let resume = match self.pending.take() {
            Some(PendingRequest::Resend {
                ticket: expected,
                resume,
            }) if expected == ticket => resume,
            other => {
                self.pending = other;
                debug!(
                    session_id = %self.session.id(),
                    ticket = %ticket,
                    event = "otp_stale_completion",
                    "Ignoring resend result that matches no outstanding request"
                );
                return;
            }
        };

        match result {
            Ok(response) if response.accepted => {
                self.session.attempts.reset();
                self.session.buffer.clear();
                self.session.cooldown.start(self.config.resend_cooldown_seconds);
                self.session.status = SessionStatus::AwaitingInput;
                self.session.last_error = None;
                info!(
                    session_id = %self.session.id(),
                    cooldown_seconds = self.config.resend_cooldown_seconds,
                    event = "otp_resent",
                    "New verification code issued"
                );
            }
            Ok(response) => {
                let message = if response.message.trim().is_empty() {
                    DEFAULT_RESEND_REFUSAL_MESSAGE.to_string()
                } else {
                    response.message
                };
                warn!(
                    session_id = %self.session.id(),
                    event = "otp_resend_refused",
                    "Backend refused to issue a new code"
                );
                self.session.status = resume;
                self.session.last_error = Some(OtpError::ResendRefused { message });
            }
            Err(err) => {
                warn!(
                    session_id = %self.session.id(),
                    error = %err,
                    event = "otp_resend_transport_error",
                    "Resend call failed"
                );
                self.session.status = resume;
                self.session.last_error = Some(OtpError::Transport {
                    detail: err.to_string(),
                });
            }
        }
    }

    fn cancel(&mut self) {
        let previous = self.session.status;
        self.session.status = SessionStatus::Aborted;
        self.pending = None;
        info!(
            session_id = %self.session.id(),
            previous_status = %previous,
            event = "otp_session_aborted",
            "Verification session cancelled"
        );
    }

    fn issue_ticket(&mut self) -> RequestTicket {
        self.last_ticket += 1;
        RequestTicket(self.last_ticket)
    }
}
