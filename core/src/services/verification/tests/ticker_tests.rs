//! Unit tests for the cooldown ticker

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::VerificationTarget;
use crate::services::verification::{
    CooldownTicker, OtpSessionConfig, OtpSessionMachine, SessionEvent,
};

use super::mocks::{RecordingResolver, ScriptedGateway};

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_one_period() {
    let mut ticker = CooldownTicker::new(Duration::from_secs(1));
    let started = tokio::time::Instant::now();

    let event = ticker.next_tick().await;

    assert!(matches!(event, SessionEvent::CooldownTick));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_ticker_drives_cooldown_to_zero() {
    let config = OtpSessionConfig {
        resend_cooldown_seconds: 5,
        ..OtpSessionConfig::default()
    };
    let mut ticker = CooldownTicker::from_config(&config);
    let mut machine = OtpSessionMachine::new(
        Arc::new(ScriptedGateway::new()),
        Arc::new(RecordingResolver::new()),
        config,
        VerificationTarget::registration("0712345678"),
    )
    .unwrap();
    let started = tokio::time::Instant::now();

    while machine.session().cooldown_seconds_remaining() > 0 {
        let event = ticker.next_tick().await;
        machine.handle(event);
    }

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(machine.can_resend());
}

#[test]
fn test_period_follows_config() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let _guard = runtime.enter();

    let config = OtpSessionConfig {
        tick_interval: Duration::from_millis(250),
        ..OtpSessionConfig::default()
    };

    assert_eq!(
        CooldownTicker::from_config(&config).period(),
        Duration::from_millis(250)
    );
}
