//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the OTP session machine
//! depends on.
//!
//! ## Architecture
//!
//! - **Gateway**: `VerificationGateway` implementations, an HTTP client for the
//!   marketplace API and an in-process mock for development
//! - **Routing**: a `RoutingResolver` that forwards verified sessions to the host

// Re-export core types for convenience
pub use otp_core::errors::*;

/// Verification gateway module - backend clients
pub mod gateway;

/// Routing module - post-verification hand-off
pub mod routing;

pub use gateway::{create_gateway, ConfiguredGateway, HttpVerificationGateway, MockVerificationGateway};
pub use routing::ChannelRoutingResolver;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
