//! Configuration for OTP sessions

use std::time::Duration;

use otp_shared::config::OtpConfig;

use crate::domain::entities::{CODE_LENGTH, DEFAULT_COOLDOWN_SECONDS, MAX_ATTEMPTS};
use crate::errors::{DomainResult, ValidationError};

/// Configuration for an `OtpSessionMachine`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpSessionConfig {
    /// Number of digits in a code
    pub code_length: usize,
    /// Rejected verifications allowed before the session locks
    pub max_attempts: u32,
    /// Cooldown at session start and after each successful resend
    pub resend_cooldown_seconds: u32,
    /// Period between cooldown ticks
    pub tick_interval: Duration,
}

impl Default for OtpSessionConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            max_attempts: MAX_ATTEMPTS,
            resend_cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl OtpSessionConfig {
    /// Reject configurations a session cannot run with
    pub fn validate(&self) -> DomainResult<()> {
        if self.code_length == 0 {
            return Err(ValidationError::OutOfRange {
                field: "code_length".to_string(),
                min: "1".to_string(),
                max: "unbounded".to_string(),
            }
            .into());
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::OutOfRange {
                field: "max_attempts".to_string(),
                min: "1".to_string(),
                max: "unbounded".to_string(),
            }
            .into());
        }
        if self.tick_interval.is_zero() {
            return Err(ValidationError::OutOfRange {
                field: "tick_interval".to_string(),
                min: "1ms".to_string(),
                max: "unbounded".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl From<&OtpConfig> for OtpSessionConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
            max_attempts: config.max_attempts,
            resend_cooldown_seconds: config.resend_cooldown_seconds,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }
}
