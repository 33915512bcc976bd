//! Resend cooldown countdown.

use serde::{Deserialize, Serialize};

/// Default resend cooldown in seconds
pub const DEFAULT_COOLDOWN_SECONDS: u32 = 60;

/// A single countdown advanced one second per `tick`.
///
/// The timer owns no clock. Whoever drives it (a `CooldownTicker`, a test)
/// calls `tick` once per elapsed second.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownTimer {
    remaining: u32,
    running: bool,
}

impl CooldownTimer {
    /// Creates a stopped, expired timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timer already counting down from `seconds`
    pub fn started(seconds: u32) -> Self {
        let mut timer = Self::new();
        timer.start(seconds);
        timer
    }

    /// Restarts the countdown from `seconds`, whether or not it is running
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.running = seconds > 0;
    }

    /// Advances the countdown by one second and returns the remaining time.
    ///
    /// Stops itself on reaching zero; ticking a stopped timer does nothing.
    pub fn tick(&mut self) -> u32 {
        if self.running {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.running = false;
            }
        }
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_expired() {
        let timer = CooldownTimer::new();
        assert!(timer.is_expired());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_countdown_to_zero_stops() {
        let mut timer = CooldownTimer::started(3);
        assert!(timer.is_running());
        assert_eq!(timer.tick(), 2);
        assert_eq!(timer.tick(), 1);
        assert!(!timer.is_expired());
        assert_eq!(timer.tick(), 0);
        assert!(timer.is_expired());
        assert!(!timer.is_running());

        // No auto-repeat and no underflow
        assert_eq!(timer.tick(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_is_reentrant() {
        let mut timer = CooldownTimer::started(DEFAULT_COOLDOWN_SECONDS);
        for _ in 0..45 {
            timer.tick();
        }
        assert_eq!(timer.remaining(), 15);

        timer.start(DEFAULT_COOLDOWN_SECONDS);
        assert_eq!(timer.remaining(), 60);
        assert!(timer.is_running());
    }

    #[test]
    fn test_start_with_zero_is_expired() {
        let timer = CooldownTimer::started(0);
        assert!(timer.is_expired());
        assert!(!timer.is_running());
    }
}
