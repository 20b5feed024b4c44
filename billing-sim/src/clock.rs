//! Advancing the simulated clock.
//!
//! An advance request returns before the provider has finished generating the
//! invoices and renewals it triggers. The clock is `advancing` until that work
//! is done, and nothing tied to the clock may be mutated until it reports
//! `ready` again, so every advance is followed by a bounded poll.

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use service_core::poll::{poll_until_ready, PollConfig, PollError, PollState, Polled};
use tracing::info;

use crate::models::{ClockStatus, TestClock};
use crate::services::BillingProvider;

/// Moves one test clock forward and waits for it to settle.
pub struct ClockAdvancer<'a> {
    provider: &'a dyn BillingProvider,
    clock_id: String,
    poll: PollConfig,
}

impl<'a> ClockAdvancer<'a> {
    pub fn new(provider: &'a dyn BillingProvider, clock_id: &str, poll: PollConfig) -> Self {
        Self {
            provider,
            clock_id: clock_id.to_string(),
            poll,
        }
    }

    pub fn clock_id(&self) -> &str {
        &self.clock_id
    }

    /// Request the advance. The returned clock is `advancing` or `ready`.
    pub async fn advance(&self, target: DateTime<Utc>) -> Result<TestClock, AppError> {
        info!(
            clock_id = %self.clock_id,
            target = %target.format("%Y-%m-%d"),
            max_wait_secs = self.poll.max_wait().as_secs(),
            "Advancing clock"
        );
        let clock = self
            .provider
            .advance_test_clock(&self.clock_id, target.timestamp())
            .await?;
        check_not_failed(&clock)?;
        Ok(clock)
    }

    /// Poll until `clock` reports `ready`, starting from the observation in
    /// hand. Waits once per non-ready observation.
    pub async fn await_ready(&self, clock: TestClock) -> Result<Polled<TestClock>, AppError> {
        let initial = observe(clock)?;

        let result = poll_until_ready(&self.poll, "await_clock_ready", initial, || async {
            info!(clock_id = %self.clock_id, "Waiting for clock to be ready");
            let clock = self.provider.retrieve_test_clock(&self.clock_id).await?;
            observe(clock)
        })
        .await;

        match result {
            Ok(polled) => Ok(polled),
            Err(PollError::Failed(e)) => Err(e),
            Err(PollError::Exhausted { attempts }) => Err(AppError::ClockAdvanceTimeout {
                clock_id: self.clock_id.clone(),
                attempts,
            }),
        }
    }

    /// Advance to `target` and block until the clock is ready there.
    pub async fn advance_and_wait(&self, target: DateTime<Utc>) -> Result<TestClock, AppError> {
        let clock = self.advance(target).await?;
        let polled = self.await_ready(clock).await?;
        info!(
            clock_id = %self.clock_id,
            frozen_at = ?polled.value.frozen_at(),
            waits = polled.waits,
            "Clock ready"
        );
        Ok(polled.value)
    }
}

fn observe(clock: TestClock) -> Result<PollState<TestClock>, AppError> {
    check_not_failed(&clock)?;
    Ok(if clock.is_ready() {
        PollState::Ready(clock)
    } else {
        PollState::Pending(clock)
    })
}

fn check_not_failed(clock: &TestClock) -> Result<(), AppError> {
    if clock.status == ClockStatus::InternalFailure {
        return Err(AppError::Provider {
            status: 500,
            code: Some(ClockStatus::InternalFailure.as_str().to_string()),
            message: format!("Test clock {} failed while advancing", clock.id),
        });
    }
    Ok(())
}
