//! Bounded retry loop with capped exponential backoff.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::fmt::Display;

use crate::application::ports::{ProgressReporter, Sleeper};
use crate::domain::{RetryPolicy, Transient};

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy's attempt ceiling is reached. The last error is returned.
///
/// # Errors
///
/// Returns the first non-transient error, or the transient error from the
/// final attempt.
pub async fn with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    sleeper: &impl Sleeper,
    reporter: &impl ProgressReporter,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay(attempt);
                reporter.warn(&format!(
                    "{e} (attempt {attempt}/{}, retrying in {}s)",
                    policy.max_attempts,
                    delay.as_secs()
                ));
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
