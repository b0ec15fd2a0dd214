//! Status polling with bounded retries, exponential backoff, and cancellation.

use std::future::Future;
use std::time::Duration;

use docproc_core::{DocumentJob, JobStatus, PriceListStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ClientError;

/// A status payload the poller can judge.
pub trait Pollable {
    fn status(&self) -> JobStatus;

    /// Backend-supplied reason when `status()` is `Error`.
    fn failure_message(&self) -> Option<&str>;
}

impl Pollable for DocumentJob {
    fn status(&self) -> JobStatus {
        self.status
    }

    fn failure_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Pollable for PriceListStatus {
    fn status(&self) -> JobStatus {
        self.status
    }

    fn failure_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each status request while the job is processing.
    pub interval: Duration,
    /// Consecutive failed requests tolerated before giving up.
    pub max_retries: u32,
    /// First retry delay; doubles with each consecutive failure.
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    /// Total status requests allowed. `None` polls until a terminal state.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::documents()
    }
}

impl PollPolicy {
    pub fn documents() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_retries: 5,
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(30),
            max_polls: None,
        }
    }

    pub fn price_lists() -> Self {
        Self {
            interval: Duration::from_secs(3),
            ..Self::documents()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay after the `failures`-th consecutive failure: `base * 2^(failures-1)`, capped.
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(20); // Prevent overflow
        let delay = self.backoff_base.saturating_mul(1u32 << exponent);
        delay.min(self.backoff_max)
    }
}

/// Poll `fetch` until the job reaches a terminal state.
///
/// - `Completed` returns the payload.
/// - `Error` returns [`ClientError::Poll`] with the backend's message.
/// - Transient request failures are retried with backoff up to
///   `policy.max_retries` in a row; a successful request resets the count.
/// - `on_progress` sees every non-terminal payload.
pub async fn poll_until<T, F, Fut, P>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut fetch: F,
    mut on_progress: P,
) -> Result<T, ClientError>
where
    T: Pollable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    P: FnMut(&T),
{
    let mut delay = policy.interval;
    let mut failures = 0u32;
    let mut polls = 0u32;

    loop {
        sleep_or_cancel(delay, cancel).await?;

        if let Some(max) = policy.max_polls
            && polls >= max
        {
            return Err(ClientError::PollTimeout { polls });
        }
        polls += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            r = fetch() => r,
        };

        match result {
            Ok(payload) => {
                failures = 0;
                delay = policy.interval;
                match payload.status() {
                    JobStatus::Processing => {
                        debug!(poll = polls, "still processing");
                        on_progress(&payload);
                    }
                    JobStatus::Completed => {
                        debug!(poll = polls, "completed");
                        return Ok(payload);
                    }
                    JobStatus::Error => {
                        let message = payload
                            .failure_message()
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or("processing failed on the server");
                        return Err(ClientError::Poll(message.to_string()));
                    }
                }
            }
            Err(e) if e.is_transient() => {
                failures += 1;
                if failures > policy.max_retries {
                    return Err(ClientError::RetriesExhausted {
                        attempts: failures,
                        last: Box::new(e),
                    });
                }
                delay = policy.backoff_delay(failures);
                warn!(
                    error = %e,
                    failures,
                    retry_in_ms = delay.as_millis() as u64,
                    "status request failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), ClientError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
