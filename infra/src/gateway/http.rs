//! HTTP Verification Gateway
//!
//! Talks to the marketplace API over JSON.
//!
//! ## Protocol
//!
//! - `POST {base_url}/auth/otp/verify` with `{phone_number, code, purpose, user_id}`
//! - `POST {base_url}/auth/otp/resend` with `{phone_number, purpose, user_id}`
//! - Both answer `{"success": bool, "message": string}`
//!
//! A 2xx answer carries the verdict and a 4xx answer with a readable body is
//! an explicit rejection. Anything else is a `GatewayError`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use otp_core::errors::GatewayError;
use otp_core::services::verification::{
    GatewayResponse, ResendRequest, VerificationGateway, VerificationRequest,
};
use otp_shared::config::GatewayConfig;
use otp_shared::phone::mask_phone_number;

use crate::InfrastructureError;

/// Longest slice of an unreadable body kept in an error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Response envelope returned by both endpoints
#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    message: String,
}

/// Verification gateway backed by the marketplace HTTP API
pub struct HttpVerificationGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpVerificationGateway {
    /// Create a new HTTP gateway
    pub fn new(config: GatewayConfig) -> Result<Self, InfrastructureError> {
        if config.base_url.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "OTP_API_BASE_URL must not be empty".to_string(),
            ));
        }
        if config.timeout_seconds == 0 {
            return Err(InfrastructureError::Config(
                "OTP_API_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(
            base_url = %config.base_url,
            timeout_seconds = config.timeout_seconds,
            "HTTP verification gateway initialized"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<GatewayResponse, GatewayError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!(url = %url, status = status, "Verification backend responded");
        interpret_response(status, &text)
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                seconds: self.config.timeout_seconds,
            }
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl VerificationGateway for HttpVerificationGateway {
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let result = self.post(&self.config.verify_url(), request).await;
        if let Err(ref e) = result {
            warn!(
                phone = %mask_phone_number(&request.phone_number),
                error = %e,
                "Verification request failed"
            );
        }
        result
    }

    async fn request_resend(&self, request: &ResendRequest) -> Result<GatewayResponse, GatewayError> {
        let result = self.post(&self.config.resend_url(), request).await;
        if let Err(ref e) = result {
            warn!(
                phone = %mask_phone_number(&request.phone_number),
                error = %e,
                "Resend request failed"
            );
        }
        result
    }
}

/// Map a status code and raw body to the backend's verdict
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<GatewayResponse, GatewayError> {
    let parsed = serde_json::from_str::<ApiResponse>(body).ok();

    match (status, parsed) {
        (200..=299, Some(envelope)) => Ok(GatewayResponse {
            accepted: envelope.success,
            message: envelope.message,
        }),
        (400..=499, Some(envelope)) => Ok(GatewayResponse::rejected(envelope.message)),
        (_, Some(envelope)) => Err(GatewayError::UnexpectedResponse {
            status,
            message: envelope.message,
        }),
        (_, None) => Err(GatewayError::UnexpectedResponse {
            status,
            message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }),
    }
}
