//! Verification Gateway Module
//!
//! Backends that validate codes and issue new ones on resend.
//!
//! ## Features
//!
//! - **HTTP Gateway**: JSON calls against the marketplace API
//! - **Mock Gateway**: in-process code issuing for development and tests
//! - **Factory**: picks the implementation from `GatewayConfig`

use async_trait::async_trait;

use otp_core::errors::GatewayError;
use otp_core::services::verification::{
    GatewayResponse, ResendRequest, VerificationGateway, VerificationRequest,
};
use otp_shared::config::{GatewayConfig, GatewayProvider};

use crate::InfrastructureError;

pub mod http;
pub mod mock;

pub use http::HttpVerificationGateway;
pub use mock::MockVerificationGateway;

#[cfg(test)]
mod tests;

/// Gateway chosen at startup from configuration
pub enum ConfiguredGateway {
    Http(HttpVerificationGateway),
    Mock(MockVerificationGateway),
}

impl ConfiguredGateway {
    pub fn provider_name(&self) -> &'static str {
        match self {
            ConfiguredGateway::Http(_) => "http",
            ConfiguredGateway::Mock(_) => "mock",
        }
    }

    /// The mock backend, when that is what was configured
    pub fn as_mock(&self) -> Option<&MockVerificationGateway> {
        match self {
            ConfiguredGateway::Mock(mock) => Some(mock),
            ConfiguredGateway::Http(_) => None,
        }
    }
}

#[async_trait]
impl VerificationGateway for ConfiguredGateway {
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        match self {
            ConfiguredGateway::Http(gateway) => gateway.submit_verification(request).await,
            ConfiguredGateway::Mock(gateway) => gateway.submit_verification(request).await,
        }
    }

    async fn request_resend(&self, request: &ResendRequest) -> Result<GatewayResponse, GatewayError> {
        match self {
            ConfiguredGateway::Http(gateway) => gateway.request_resend(request).await,
            ConfiguredGateway::Mock(gateway) => gateway.request_resend(request).await,
        }
    }
}

/// Create a verification gateway based on configuration
///
/// # Arguments
///
/// * `config` - Gateway configuration containing provider settings
/// * `code_length` - Length of codes the mock gateway issues
///
/// # Returns
///
/// The configured gateway, or an error if the HTTP client cannot be built
pub fn create_gateway(
    config: &GatewayConfig,
    code_length: usize,
) -> Result<ConfiguredGateway, InfrastructureError> {
    let gateway = match config.provider {
        GatewayProvider::Mock => ConfiguredGateway::Mock(MockVerificationGateway::new(code_length)),
        GatewayProvider::Http => {
            ConfiguredGateway::Http(HttpVerificationGateway::new(config.clone())?)
        }
    };
    tracing::info!(provider = gateway.provider_name(), "Verification gateway created");
    Ok(gateway)
}
