//! Verification backend configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Which verification gateway implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    /// In-process backend double; codes are logged instead of sent
    Mock,
    /// JSON over HTTP against the marketplace API
    Http,
}

impl std::str::FromStr for GatewayProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(GatewayProvider::Mock),
            "http" | "api" => Ok(GatewayProvider::Http),
            _ => Err(format!("Invalid gateway provider: {}", s)),
        }
    }
}

/// Verification gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Gateway implementation
    pub provider: GatewayProvider,

    /// Base URL of the marketplace API (no trailing slash required)
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Path of the code verification endpoint
    #[serde(default = "default_verify_path")]
    pub verify_path: String,

    /// Path of the code resend endpoint
    #[serde(default = "default_resend_path")]
    pub resend_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: GatewayProvider::Mock,
            base_url: String::from("http://localhost:8080/api/v1"),
            timeout_seconds: default_timeout_seconds(),
            verify_path: default_verify_path(),
            resend_path: default_resend_path(),
        }
    }
}

impl GatewayConfig {
    /// Create an HTTP gateway configuration for a base URL
    pub fn http(base_url: impl Into<String>) -> Self {
        Self {
            provider: GatewayProvider::Http,
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load gateway configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env::var("OTP_GATEWAY_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider),
            base_url: env::var("OTP_API_BASE_URL").unwrap_or(defaults.base_url),
            timeout_seconds: env::var("OTP_API_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            verify_path: defaults.verify_path,
            resend_path: defaults.resend_path,
        }
    }

    /// Full URL of the verification endpoint
    pub fn verify_url(&self) -> String {
        join_url(&self.base_url, &self.verify_path)
    }

    /// Full URL of the resend endpoint
    pub fn resend_url(&self) -> String {
        join_url(&self.base_url, &self.resend_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_verify_path() -> String {
    String::from("/auth/otp/verify")
}

fn default_resend_path() -> String {
    String::from("/auth/otp/resend")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let config = GatewayConfig::http("https://api.example.com/v1/");
        assert_eq!(config.verify_url(), "https://api.example.com/v1/auth/otp/verify");
        assert_eq!(config.resend_url(), "https://api.example.com/v1/auth/otp/resend");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("mock".parse::<GatewayProvider>().unwrap(), GatewayProvider::Mock);
        assert_eq!("HTTP".parse::<GatewayProvider>().unwrap(), GatewayProvider::Http);
        assert!("carrier-pigeon".parse::<GatewayProvider>().is_err());
    }

    #[test]
    fn test_default_is_mock() {
        let config = GatewayConfig::default();
        assert_eq!(config.provider, GatewayProvider::Mock);
        assert_eq!(config.timeout_seconds, 15);
    }
}
