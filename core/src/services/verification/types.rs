//! Events, commands, and gateway payloads for the OTP session machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{SessionStatus, VerificationPurpose};
use crate::errors::{ErrorResponse, GatewayError};

use super::traits::VerificationGateway;

/// Payload of a verification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub phone_number: String,
    pub code: String,
    pub purpose: VerificationPurpose,
    pub user_id: Option<String>,
}

/// Payload of a resend call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendRequest {
    pub phone_number: String,
    pub purpose: VerificationPurpose,
    pub user_id: Option<String>,
}

/// Verdict returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Whether the backend accepted the request
    pub accepted: bool,
    /// Backend message, shown to the user on rejection
    pub message: String,
}

impl GatewayResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            accepted: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
        }
    }
}

/// Identifies one outbound request so its completion can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestTicket(pub u64);

impl std::fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inputs to the session machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A digit was typed at a position
    DigitEntered { index: usize, digit: char },
    /// A position was emptied (backspace)
    DigitCleared { index: usize },
    /// Text arrived from the clipboard or SMS autofill
    PasteIngested { text: String },
    /// The user pressed submit
    SubmitRequested,
    /// A verification call finished
    VerificationCompleted {
        ticket: RequestTicket,
        result: Result<GatewayResponse, GatewayError>,
    },
    /// The user asked for a new code
    ResendRequested,
    /// A resend call finished
    ResendCompleted {
        ticket: RequestTicket,
        result: Result<GatewayResponse, GatewayError>,
    },
    /// One second of cooldown elapsed
    CooldownTick,
    /// The user dismissed the session
    Cancel,
}

/// Network work the host must perform on the machine's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SubmitVerification {
        ticket: RequestTicket,
        request: VerificationRequest,
    },
    RequestResend {
        ticket: RequestTicket,
        request: ResendRequest,
    },
}

impl SessionCommand {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            SessionCommand::SubmitVerification { ticket, .. }
            | SessionCommand::RequestResend { ticket, .. } => *ticket,
        }
    }

    /// Performs the call and wraps its outcome as the matching completion event
    pub async fn execute<G>(self, gateway: &G) -> SessionEvent
    where
        G: VerificationGateway + ?Sized,
    {
        match self {
            SessionCommand::SubmitVerification { ticket, request } => {
                let result = gateway.submit_verification(&request).await;
                SessionEvent::VerificationCompleted { ticket, result }
            }
            SessionCommand::RequestResend { ticket, request } => {
                let result = gateway.request_resend(&request).await;
                SessionEvent::ResendCompleted { ticket, result }
            }
        }
    }
}

/// What a `RoutingResolver` receives when a session is verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReceipt {
    pub purpose: VerificationPurpose,
    pub phone_number: String,
    pub user_id: Option<String>,
    /// The code the backend accepted
    pub code: String,
    pub verified_at: DateTime<Utc>,
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub purpose: VerificationPurpose,
    pub phone_number: String,
    pub status: SessionStatus,
    pub digits: Vec<Option<char>>,
    pub attempt_count: u32,
    pub remaining_attempts: u32,
    pub cooldown_seconds_remaining: u32,
    /// True iff a resend request would be issued right now
    pub can_resend: bool,
    pub last_error: Option<ErrorResponse>,
}
