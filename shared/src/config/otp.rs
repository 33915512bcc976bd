//! OTP session policy configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Number of digits in a verification code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Rejected verifications allowed before the session locks
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Seconds a user must wait between resend requests
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: u32 = 60;

/// Policy knobs for an OTP verification session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Maximum rejected verifications before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Cooldown applied at session start and after every successful resend
    #[serde(default = "default_resend_cooldown_seconds")]
    pub resend_cooldown_seconds: u32,

    /// Period of the cooldown ticker in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl OtpConfig {
    /// Load OTP policy from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            code_length: env::var("OTP_CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CODE_LENGTH),
            max_attempts: env::var("OTP_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            resend_cooldown_seconds: env::var("OTP_RESEND_COOLDOWN_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RESEND_COOLDOWN_SECONDS),
            tick_interval_ms: env::var("OTP_TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_tick_interval_ms),
        }
    }

    /// Set the cooldown in seconds
    pub fn with_resend_cooldown(mut self, seconds: u32) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    /// Set the attempt cap
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_resend_cooldown_seconds() -> u32 {
    DEFAULT_RESEND_COOLDOWN_SECONDS
}

fn default_tick_interval_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = OtpConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.resend_cooldown_seconds, 60);
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn test_builder_overrides() {
        let config = OtpConfig::default()
            .with_resend_cooldown(30)
            .with_max_attempts(5);
        assert_eq!(config.resend_cooldown_seconds, 30);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.code_length, DEFAULT_CODE_LENGTH);
    }
}
