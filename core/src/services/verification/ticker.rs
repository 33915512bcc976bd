//! Time source for the resend cooldown

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::config::OtpSessionConfig;
use super::types::SessionEvent;

/// Emits `SessionEvent::CooldownTick` once per period
///
/// The first tick fires one full period after creation. Ticks missed while
/// the host was busy are delayed rather than replayed in a burst.
#[derive(Debug)]
pub struct CooldownTicker {
    interval: Interval,
}

impl CooldownTicker {
    /// # Panics
    ///
    /// If `period` is zero. `OtpSessionConfig::validate` rules that out.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn from_config(config: &OtpSessionConfig) -> Self {
        Self::new(config.tick_interval)
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Wait for the next tick. Cancel-safe, so it can sit in `tokio::select!`.
    pub async fn next_tick(&mut self) -> SessionEvent {
        self.interval.tick().await;
        SessionEvent::CooldownTick
    }
}
