//! Mock Verification Gateway
//!
//! An in-process stand-in for the marketplace backend, for development and
//! testing. Codes are generated locally and logged instead of sent by SMS.

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

use otp_core::errors::GatewayError;
use otp_core::services::verification::{
    GatewayResponse, ResendRequest, VerificationGateway, VerificationRequest,
};
use otp_core::CODE_LENGTH;
use otp_shared::phone::mask_phone_number;

/// Mock verification backend
///
/// This implementation:
/// - Holds the latest issued code per phone number
/// - Compares submitted codes in constant time
/// - Invalidates a code once it has been accepted
/// - Can simulate transport failures
pub struct MockVerificationGateway {
    code_length: usize,
    /// Latest issued code per phone number
    issued: Mutex<HashMap<String, String>>,
    verify_count: AtomicU64,
    resend_count: AtomicU64,
    simulate_failure: AtomicBool,
}

impl MockVerificationGateway {
    pub fn new(code_length: usize) -> Self {
        Self {
            code_length,
            issued: Mutex::new(HashMap::new()),
            verify_count: AtomicU64::new(0),
            resend_count: AtomicU64::new(0),
            simulate_failure: AtomicBool::new(false),
        }
    }

    /// Generate a code for `phone_number`, replacing any earlier one
    pub async fn issue_code(&self, phone_number: &str) -> String {
        let code = generate_code(self.code_length);
        self.issued
            .lock()
            .await
            .insert(phone_number.to_string(), code.clone());

        info!(
            target: "otp_gateway",
            provider = "mock",
            phone = %mask_phone_number(phone_number),
            code = %code,
            "Mock verification code issued"
        );
        code
    }

    /// Code currently valid for `phone_number`
    pub async fn issued_code(&self, phone_number: &str) -> Option<String> {
        self.issued.lock().await.get(phone_number).cloned()
    }

    /// Make every call fail as if the backend were unreachable
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    pub fn verify_count(&self) -> u64 {
        self.verify_count.load(Ordering::SeqCst)
    }

    pub fn resend_count(&self) -> u64 {
        self.resend_count.load(Ordering::SeqCst)
    }

    fn check_available(&self, phone_number: &str) -> Result<(), GatewayError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "mock",
                phone = %mask_phone_number(phone_number),
                "Mock gateway simulating failure"
            );
            return Err(GatewayError::Network(
                "Simulated gateway failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MockVerificationGateway {
    fn default() -> Self {
        Self::new(CODE_LENGTH)
    }
}

#[async_trait]
impl VerificationGateway for MockVerificationGateway {
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        self.verify_count.fetch_add(1, Ordering::SeqCst);
        self.check_available(&request.phone_number)?;

        let mut issued = self.issued.lock().await;
        let matches = issued
            .get(&request.phone_number)
            .map(|expected| constant_time_eq(expected.as_bytes(), request.code.as_bytes()))
            .unwrap_or(false);

        if matches {
            issued.remove(&request.phone_number);
            Ok(GatewayResponse::accepted("Phone number verified"))
        } else {
            Ok(GatewayResponse::rejected("Invalid verification code"))
        }
    }

    async fn request_resend(&self, request: &ResendRequest) -> Result<GatewayResponse, GatewayError> {
        self.resend_count.fetch_add(1, Ordering::SeqCst);
        self.check_available(&request.phone_number)?;

        self.issue_code(&request.phone_number).await;
        Ok(GatewayResponse::accepted("Verification code sent"))
    }
}

fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
