//! Domain layer containing the OTP session aggregate and its components.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
