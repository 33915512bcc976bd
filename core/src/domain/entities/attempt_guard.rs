//! Failed-verification counter.

use serde::{Deserialize, Serialize};

/// Maximum number of rejected verifications allowed
pub const MAX_ATTEMPTS: u32 = 3;

/// Counts rejected verification attempts against a cap.
///
/// Only explicit rejections from the backend are recorded here; format
/// errors and transport failures never reach the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptGuard {
    count: u32,
    max: u32,
}

impl AttemptGuard {
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    /// Records a rejected attempt
    ///
    /// # Returns
    ///
    /// `true` if the cap is now reached
    pub fn record_failure(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.is_locked()
    }

    /// Zeroes the count (a fresh code was issued)
    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn is_locked(&self) -> bool {
        self.count >= self.max
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Attempts left before lockout (0 when locked)
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.count)
    }
}

impl Default for AttemptGuard {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS)
    }
}
