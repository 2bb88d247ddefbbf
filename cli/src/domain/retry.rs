//! Capped exponential backoff shared by submission and readiness polling.

use std::time::Duration;

/// Attempt ceiling for every Marathon retry loop.
pub const MAX_ATTEMPTS: u32 = 10;

/// Backoff cap for app submission.
pub const SUBMIT_BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Bounded retry policy: `max_attempts` tries, sleeping `min(2^n, cap)`
/// seconds after failed attempt `n` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub cap: Duration,
}

impl RetryPolicy {
    /// Policy used when submitting a new app.
    #[must_use]
    pub fn submission() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            cap: SUBMIT_BACKOFF_CAP,
        }
    }

    /// Policy used while waiting for an app to report running tasks.
    #[must_use]
    pub fn readiness(launch_timeout: Duration) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            cap: launch_timeout,
        }
    }

    /// Delay to wait after failed attempt `attempt`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.cap)
    }
}
