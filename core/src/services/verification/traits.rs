//! Collaborator traits for the OTP session machine

use async_trait::async_trait;

use crate::errors::GatewayError;

use super::types::{GatewayResponse, ResendRequest, VerificationReceipt, VerificationRequest};

/// Network boundary to the backend that issues and validates codes
///
/// `Ok` carries the backend's verdict, accepted or not. `Err` is reserved for
/// failures where no verdict was obtained.
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Submit a code for validation
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<GatewayResponse, GatewayError>;

    /// Ask the backend to issue and send a fresh code
    async fn request_resend(&self, request: &ResendRequest) -> Result<GatewayResponse, GatewayError>;
}

/// Receives a session once it has been verified
///
/// Called exactly once per session, from inside the machine's event handler,
/// so implementations should hand off rather than block.
pub trait RoutingResolver: Send + Sync {
    fn resolve(&self, receipt: &VerificationReceipt);
}
