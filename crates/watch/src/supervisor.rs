use std::{future::Future, time::Duration};
use tracing::warn;

/// What a supervised unit of work wants the loop to do next.
#[derive(Debug)]
pub enum Outcome<E> {
    /// The work is complete; stop the loop.
    Done,
    /// Progress was made; run again immediately.
    Continue,
    /// Nothing to do right now; sleep before the next attempt.
    Sleep,
    /// An unexpected failure; sleep, and count it against the budget.
    Retry(E),
    /// An unrecoverable failure; stop the loop now.
    Fatal(E),
}

/// Bounds for a supervised loop: how long to sleep between attempts and how
/// many consecutive unexpected failures to tolerate.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Sleep between empty rounds and after failures.
    pub retry_interval: Duration,
    /// Consecutive [`Outcome::Retry`] results before giving up.
    pub max_consecutive_failures: u32,
}

/// Drive a unit of work under a bounded retry loop.
///
/// Successful or idle rounds reset the failure counter; the loop returns
/// the last error once `max_consecutive_failures` unexpected failures occur
/// in a row, or immediately on a fatal outcome.
pub async fn supervise<E, F, Fut>(policy: RetryPolicy, mut work: F) -> Result<(), E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<E>>,
{
    let mut consecutive_failures = 0u32;
    loop {
        match work().await {
            Outcome::Done => return Ok(()),
            Outcome::Continue => consecutive_failures = 0,
            Outcome::Sleep => {
                consecutive_failures = 0;
                tokio::time::sleep(policy.retry_interval).await;
            }
            Outcome::Retry(err) => {
                consecutive_failures += 1;
                if consecutive_failures >= policy.max_consecutive_failures {
                    return Err(err);
                }
                warn!(%err, consecutive_failures, "unexpected failure; retrying");
                tokio::time::sleep(policy.retry_interval).await;
            }
            Outcome::Fatal(err) => return Err(err),
        }
    }
}
