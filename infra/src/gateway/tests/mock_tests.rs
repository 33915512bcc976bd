//! Unit tests for the mock verification gateway

use otp_core::errors::GatewayError;
use otp_core::services::verification::{ResendRequest, VerificationGateway, VerificationRequest};
use otp_core::VerificationPurpose;

use crate::gateway::MockVerificationGateway;

const PHONE: &str = "0712345678";

fn submit(code: &str) -> VerificationRequest {
    VerificationRequest {
        phone_number: PHONE.to_string(),
        code: code.to_string(),
        purpose: VerificationPurpose::Registration,
        user_id: None,
    }
}

fn resend() -> ResendRequest {
    ResendRequest {
        phone_number: PHONE.to_string(),
        purpose: VerificationPurpose::Registration,
        user_id: None,
    }
}

#[tokio::test]
async fn test_issued_code_shape() {
    let gateway = MockVerificationGateway::default();

    let code = gateway.issue_code(PHONE).await;

    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(gateway.issued_code(PHONE).await, Some(code));
}

#[tokio::test]
async fn test_accepts_issued_code_once() {
    let gateway = MockVerificationGateway::new(6);
    let code = gateway.issue_code(PHONE).await;

    let response = gateway.submit_verification(&submit(&code)).await.unwrap();
    assert!(response.accepted);

    // Codes are single use
    let response = gateway.submit_verification(&submit(&code)).await.unwrap();
    assert!(!response.accepted);
    assert_eq!(gateway.verify_count(), 2);
}

#[tokio::test]
async fn test_rejects_wrong_code() {
    let gateway = MockVerificationGateway::new(6);
    let code = gateway.issue_code(PHONE).await;
    let wrong: String = code
        .chars()
        .map(|c| if c == '9' { '0' } else { '9' })
        .collect();

    let response = gateway.submit_verification(&submit(&wrong)).await.unwrap();

    assert!(!response.accepted);
    assert_eq!(response.message, "Invalid verification code");
}

#[tokio::test]
async fn test_rejects_when_nothing_issued() {
    let gateway = MockVerificationGateway::new(6);

    let response = gateway.submit_verification(&submit("123456")).await.unwrap();

    assert!(!response.accepted);
}

#[tokio::test]
async fn test_resend_replaces_previous_code() {
    let gateway = MockVerificationGateway::new(6);
    let first = gateway.issue_code(PHONE).await;

    let response = gateway.request_resend(&resend()).await.unwrap();
    assert!(response.accepted);
    assert_eq!(gateway.resend_count(), 1);

    let latest = gateway.issued_code(PHONE).await.unwrap();
    if latest != first {
        let response = gateway.submit_verification(&submit(&first)).await.unwrap();
        assert!(!response.accepted);
    }
    let response = gateway.submit_verification(&submit(&latest)).await.unwrap();
    assert!(response.accepted);
}

#[tokio::test]
async fn test_simulated_failure_is_transport_error() {
    let gateway = MockVerificationGateway::new(6);
    let code = gateway.issue_code(PHONE).await;
    gateway.set_simulate_failure(true);

    let err = gateway.submit_verification(&submit(&code)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
    assert!(gateway.request_resend(&resend()).await.is_err());

    // The issued code survives the outage
    gateway.set_simulate_failure(false);
    let response = gateway.submit_verification(&submit(&code)).await.unwrap();
    assert!(response.accepted);
}
