//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    CooldownTicker, GatewayResponse, OtpSessionConfig, OtpSessionMachine, PostVerificationRoute,
    RequestTicket, ResendRequest, RoutingResolver, SessionCommand, SessionEvent, SessionSnapshot,
    VerificationGateway, VerificationReceipt, VerificationRequest,
};
