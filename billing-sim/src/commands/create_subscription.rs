//! `create-subscription`

use chrono::Utc;
use service_core::error::AppError;

use crate::config::SimConfig;
use crate::services::BillingProvider;
use crate::simulation::{SimulationOutcome, SubscriptionSimulator};

pub async fn handle(
    provider: &dyn BillingProvider,
    config: &SimConfig,
) -> Result<SimulationOutcome, AppError> {
    let clock_id = config.require_test_clock()?;

    let simulator = SubscriptionSimulator::new(
        provider,
        &config.fixtures,
        clock_id,
        config.clock.poll.clone(),
    );

    simulator.run(Utc::now().date_naive()).await
}
