//! `create-test-clock`

use chrono::Utc;
use service_core::error::AppError;
use std::path::Path;
use tracing::info;

use crate::config::{upsert_env_var, SimConfig, TEST_CLOCK_ENV};
use crate::models::TestClock;
use crate::services::BillingProvider;
use crate::simulation::schedule::start_of_day;

/// Create a clock frozen at midnight UTC today and record its id in the env
/// file so later commands pick it up.
pub async fn handle(
    provider: &dyn BillingProvider,
    config: &SimConfig,
) -> Result<TestClock, AppError> {
    let frozen_at = start_of_day(Utc::now().date_naive());

    let clock = provider
        .create_test_clock(frozen_at.timestamp(), &config.clock.name)
        .await?;

    info!(
        clock_id = %clock.id,
        frozen_time = %frozen_at.to_rfc3339(),
        "Created test clock"
    );

    upsert_env_var(Path::new(&config.common.env_file), TEST_CLOCK_ENV, &clock.id)?;

    Ok(clock)
}
