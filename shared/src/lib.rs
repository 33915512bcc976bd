//! Shared utilities and configuration for the OTP verification workspace
//!
//! This crate provides common functionality used by every other crate:
//! - Configuration types (environment, logging, OTP policy, gateway)
//! - Tracing subscriber initialisation
//! - Phone number utilities (normalisation, validation, masking for logs)

pub mod config;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, GatewayConfig, GatewayProvider, LogFormat, LoggingConfig, OtpConfig,
};
pub use logging::init_tracing;
pub use utils::phone;
