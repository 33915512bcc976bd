//! Domain entities representing the verification session and its parts.

pub mod attempt_guard;
pub mod cooldown_timer;
pub mod otp_buffer;
pub mod otp_session;

// Re-export commonly used types
pub use attempt_guard::{AttemptGuard, MAX_ATTEMPTS};
pub use cooldown_timer::{CooldownTimer, DEFAULT_COOLDOWN_SECONDS};
pub use otp_buffer::{OtpBuffer, CODE_LENGTH};
pub use otp_session::{OtpSession, SessionStatus, VerificationPurpose, VerificationTarget};
