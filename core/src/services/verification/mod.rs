//! OTP verification session workflow
//!
//! This module drives one verification session from code entry to outcome:
//! - Digit buffer with paste/autofill extraction
//! - Auto-submit once the code is complete, one request in flight at a time
//! - Attempt cap with lockout, resend cooldown
//! - Purpose-specific routing after success

mod config;
mod machine;
mod routing;
mod ticker;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpSessionConfig;
pub use machine::OtpSessionMachine;
pub use routing::PostVerificationRoute;
pub use ticker::CooldownTicker;
pub use traits::{RoutingResolver, VerificationGateway};
pub use types::{
    GatewayResponse, RequestTicket, ResendRequest, SessionCommand, SessionEvent, SessionSnapshot,
    VerificationReceipt, VerificationRequest,
};
