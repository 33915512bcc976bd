//! Error types for the OTP verification workflow
//!
//! `OtpError` covers everything a session can surface to the host through
//! `last_error`. `GatewayError` is what a gateway implementation reports when
//! the backend could not be reached or answered with something unusable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error category used by hosts to pick a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or incomplete input, caught before any network call
    Format,
    /// The backend explicitly refused the request
    Rejection,
    /// Network, timeout, or unexpected backend failure
    Transport,
    /// Attempt cap exhausted; only a resend unlocks the session
    Lockout,
    /// The requested action is not available in the current state
    Precondition,
}

/// Errors surfaced by an OTP session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Digit must be a single numeral, got '{digit}'")]
    InvalidDigit { digit: char },

    #[error("Position {index} is outside a {code_length}-digit code")]
    IndexOutOfRange { index: usize, code_length: usize },

    #[error("Enter all {expected} digits of the code ({filled} entered)")]
    IncompleteCode { filled: usize, expected: usize },

    /// Message is the gateway's, surfaced verbatim
    #[error("{message}")]
    Rejected { message: String },

    /// Message is the gateway's, surfaced verbatim
    #[error("{message}")]
    ResendRefused { message: String },

    /// `detail` is for logs only; users see the generic message
    #[error("Something went wrong. Please check your connection and try again.")]
    Transport { detail: String },

    #[error("Too many incorrect attempts. Request a new code to continue.")]
    Locked { max_attempts: u32 },

    #[error("Please wait {seconds_remaining} seconds before requesting a new code")]
    CooldownActive { seconds_remaining: u32 },

    #[error("Please wait for the current request to finish")]
    RequestInFlight,
}

impl OtpError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            OtpError::InvalidDigit { .. }
            | OtpError::IndexOutOfRange { .. }
            | OtpError::IncompleteCode { .. } => ErrorKind::Format,
            OtpError::Rejected { .. } | OtpError::ResendRefused { .. } => ErrorKind::Rejection,
            OtpError::Transport { .. } => ErrorKind::Transport,
            OtpError::Locked { .. } => ErrorKind::Lockout,
            OtpError::CooldownActive { .. }
            | OtpError::RequestInFlight => ErrorKind::Precondition,
        }
    }

    /// Stable code for programmatic handling by the host
    pub fn error_code(&self) -> &'static str {
        match self {
            OtpError::InvalidDigit { .. } => "INVALID_DIGIT",
            OtpError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            OtpError::IncompleteCode { .. } => "INCOMPLETE_CODE",
            OtpError::Rejected { .. } => "INVALID_VERIFICATION_CODE",
            OtpError::ResendRefused { .. } => "RESEND_REFUSED",
            OtpError::Transport { .. } => "VERIFICATION_SERVICE_UNAVAILABLE",
            OtpError::Locked { .. } => "MAX_ATTEMPTS_EXCEEDED",
            OtpError::CooldownActive { .. } => "RESEND_COOLDOWN_ACTIVE",
            OtpError::RequestInFlight => "REQUEST_IN_FLIGHT",
        }
    }
}

/// Transport-level failure reported by a `VerificationGateway`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response (status {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },
}

/// Validation errors raised while constructing sessions and configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Value out of range for field: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },
}

/// Host-facing view of an `OtpError`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&OtpError> for ErrorResponse {
    fn from(err: &OtpError) -> Self {
        Self {
            error: err.error_code().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
