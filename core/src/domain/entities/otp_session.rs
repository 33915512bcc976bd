//! OTP session aggregate: who is being verified, why, and where the session stands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use otp_shared::phone::is_valid_phone;

use crate::errors::{DomainResult, OtpError, ValidationError};

use super::attempt_guard::AttemptGuard;
use super::cooldown_timer::CooldownTimer;
use super::otp_buffer::OtpBuffer;

/// Why a phone number is being verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    /// New account sign-up
    Registration,
    /// Forgotten password recovery
    PasswordReset,
    /// Moving an existing account to a new number
    PhoneChange,
}

impl VerificationPurpose {
    /// Whether sessions for this purpose must carry a user id
    pub fn requires_user_id(&self) -> bool {
        matches!(self, VerificationPurpose::PhoneChange)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationPurpose::Registration => "registration",
            VerificationPurpose::PasswordReset => "password_reset",
            VerificationPurpose::PhoneChange => "phone_change",
        }
    }
}

impl std::fmt::Display for VerificationPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "registration" | "register" => Ok(VerificationPurpose::Registration),
            "password_reset" | "reset" => Ok(VerificationPurpose::PasswordReset),
            "phone_change" | "change_phone" => Ok(VerificationPurpose::PhoneChange),
            _ => Err(format!("Invalid verification purpose: {}", s)),
        }
    }
}

/// Lifecycle state of an OTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the user to complete the code
    AwaitingInput,
    /// One verification call is outstanding
    Verifying,
    /// Code accepted (terminal)
    Verified,
    /// One resend call is outstanding
    ResendInFlight,
    /// Attempt cap reached; only a resend unlocks
    Locked,
    /// Cancelled by the user (terminal)
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Verified | SessionStatus::Aborted)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::AwaitingInput => "awaiting_input",
            SessionStatus::Verifying => "verifying",
            SessionStatus::Verified => "verified",
            SessionStatus::ResendInFlight => "resend_in_flight",
            SessionStatus::Locked => "locked",
            SessionStatus::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// The phone number and purpose a session is opened for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTarget {
    pub phone_number: String,
    pub purpose: VerificationPurpose,
    pub user_id: Option<String>,
}

impl VerificationTarget {
    pub fn registration(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            purpose: VerificationPurpose::Registration,
            user_id: None,
        }
    }

    pub fn password_reset(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            purpose: VerificationPurpose::PasswordReset,
            user_id: None,
        }
    }

    pub fn phone_change(phone_number: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            purpose: VerificationPurpose::PhoneChange,
            user_id: Some(user_id.into()),
        }
    }
}

/// Aggregate root of the verification workflow.
///
/// Phone number, purpose and user id are fixed at creation. The buffer,
/// counters and status are mutated only by `OtpSessionMachine`.
#[derive(Debug, Clone)]
pub struct OtpSession {
    id: Uuid,
    phone_number: String,
    purpose: VerificationPurpose,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    pub(crate) buffer: OtpBuffer,
    pub(crate) attempts: AttemptGuard,
    pub(crate) cooldown: CooldownTimer,
    pub(crate) status: SessionStatus,
    pub(crate) last_error: Option<OtpError>,
}

impl OtpSession {
    /// Opens a session in `AwaitingInput`
    ///
    /// # Arguments
    ///
    /// * `target` - Phone number, purpose, and user id being verified
    /// * `buffer` - Empty buffer sized to the code length
    /// * `attempts` - Guard carrying the attempt cap
    /// * `cooldown` - Timer already running for the initial code
    ///
    /// # Returns
    ///
    /// * `Ok(OtpSession)` - The new session
    /// * `Err(DomainError)` - If the phone number is malformed or a phone
    ///   change session has no user id
    pub fn new(
        target: VerificationTarget,
        buffer: OtpBuffer,
        attempts: AttemptGuard,
        cooldown: CooldownTimer,
    ) -> DomainResult<Self> {
        if !is_valid_phone(&target.phone_number) {
            return Err(ValidationError::InvalidFormat {
                field: "phone_number".to_string(),
            }
            .into());
        }

        let user_id = target.user_id.filter(|id| !id.trim().is_empty());
        if target.purpose.requires_user_id() && user_id.is_none() {
            return Err(ValidationError::RequiredField {
                field: "user_id".to_string(),
            }
            .into());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            phone_number: target.phone_number,
            purpose: target.purpose,
            user_id,
            created_at: Utc::now(),
            buffer,
            attempts,
            cooldown,
            status: SessionStatus::AwaitingInput,
            last_error: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn purpose(&self) -> VerificationPurpose {
        self.purpose
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn buffer(&self) -> &OtpBuffer {
        &self.buffer
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts.count()
    }

    pub fn max_attempts(&self) -> u32 {
        self.attempts.max()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.attempts.remaining()
    }

    pub fn cooldown_seconds_remaining(&self) -> u32 {
        self.cooldown.remaining()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&OtpError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::attempt_guard::MAX_ATTEMPTS;
    use crate::domain::entities::cooldown_timer::DEFAULT_COOLDOWN_SECONDS;
    use crate::errors::DomainError;

    fn open(target: VerificationTarget) -> DomainResult<OtpSession> {
        OtpSession::new(
            target,
            OtpBuffer::default(),
            AttemptGuard::default(),
            CooldownTimer::started(DEFAULT_COOLDOWN_SECONDS),
        )
    }

    #[test]
    fn test_new_session_defaults() {
        let session = open(VerificationTarget::registration("0712345678")).unwrap();

        assert_eq!(session.phone_number(), "0712345678");
        assert_eq!(session.purpose(), VerificationPurpose::Registration);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.status(), SessionStatus::AwaitingInput);
        assert_eq!(session.attempt_count(), 0);
        assert_eq!(session.max_attempts(), MAX_ATTEMPTS);
        assert_eq!(session.cooldown_seconds_remaining(), 60);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_phone_change_requires_user_id() {
        let mut target = VerificationTarget::phone_change("0712345678", "user-1");
        assert!(open(target.clone()).is_ok());

        target.user_id = None;
        let err = open(target.clone()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ValidationErr(ValidationError::RequiredField { ref field }) if field == "user_id"
        ));

        target.user_id = Some("   ".to_string());
        assert!(open(target).is_err());
    }

    #[test]
    fn test_user_id_optional_for_other_purposes() {
        let mut target = VerificationTarget::password_reset("+254712345678");
        target.user_id = Some("user-9".to_string());
        let session = open(target).unwrap();
        assert_eq!(session.user_id(), Some("user-9"));
    }

    #[test]
    fn test_rejects_malformed_phone() {
        let err = open(VerificationTarget::registration("call me")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ValidationErr(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_purpose_parsing_and_serialization() {
        assert_eq!(
            "password-reset".parse::<VerificationPurpose>().unwrap(),
            VerificationPurpose::PasswordReset
        );
        assert!("login".parse::<VerificationPurpose>().is_err());
        assert_eq!(
            serde_json::to_string(&VerificationPurpose::PhoneChange).unwrap(),
            "\"phone_change\""
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SessionStatus::Verified.is_terminal());
        assert!(SessionStatus::Aborted.is_terminal());
        assert!(!SessionStatus::Locked.is_terminal());
        assert!(!SessionStatus::ResendInFlight.is_terminal());
    }
}
