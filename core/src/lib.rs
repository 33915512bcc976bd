//! # OTP Core
//!
//! Domain layer of the OTP verification workflow.
//! This crate contains the session entities, the session state machine,
//! the gateway and routing traits it depends on, and the error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
