//! Fixed-interval polling for provider state that settles asynchronously.
//!
//! Unlike a retry loop, a poll does not re-issue a failed call: it re-checks a
//! resource until it reports a terminal state, sleeping a fixed interval
//! between checks, and gives up after a bounded number of waits.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for polling behavior.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Time to wait before each re-check.
    pub interval: Duration,
    /// Maximum number of waits before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(4),
            max_attempts: 150,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on the time spent waiting, excluding the checks themselves.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Observation of the polled resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    Pending(T),
    Ready(T),
}

/// The terminal value and how many waits it took to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
    pub value: T,
    pub waits: u32,
}

#[derive(Debug)]
pub enum PollError<E> {
    /// Still pending after `attempts` waits.
    Exhausted { attempts: u32 },
    /// The check itself failed.
    Failed(E),
}

/// Poll until `check` reports [`PollState::Ready`].
///
/// `initial` is the observation already in hand (for example the response
/// to the request that started the transition); when it is ready no wait
/// happens at all.
pub async fn poll_until_ready<F, Fut, T, E>(
    config: &PollConfig,
    operation_name: &str,
    initial: PollState<T>,
    mut check: F,
) -> Result<Polled<T>, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>, E>>,
{
    let mut state = initial;
    let mut waits = 0;

    loop {
        match state {
            PollState::Ready(value) => {
                if waits > 0 {
                    info!(operation = operation_name, waits, "Poll reached ready state");
                }
                return Ok(Polled { value, waits });
            }
            PollState::Pending(_) => {
                if waits >= config.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempts = waits,
                        "Poll gave up before reaching ready state"
                    );
                    return Err(PollError::Exhausted { attempts: waits });
                }

                debug!(
                    operation = operation_name,
                    attempt = waits + 1,
                    interval_ms = config.interval.as_millis() as u64,
                    "Not ready, waiting before next check"
                );
                sleep(config.interval).await;
                waits += 1;

                state = check().await.map_err(PollError::Failed)?;
            }
        }
    }
}
