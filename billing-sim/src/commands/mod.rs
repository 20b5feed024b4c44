//! CLI commands.

pub mod create_subscription;
pub mod create_test_clock;
pub mod subscriptions_report;

use clap::Subcommand;
use service_core::error::AppError;

use crate::config::SimConfig;
use crate::report::TextTableSink;
use crate::services::StripeClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a test clock frozen at the start of today and save its id
    CreateTestClock,
    /// Simulate a year of a subscription on the saved test clock
    CreateSubscription,
    /// Print per-product revenue tables for the saved test clock
    SubscriptionsReport,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateTestClock => "create-test-clock",
            Command::CreateSubscription => "create-subscription",
            Command::SubscriptionsReport => "subscriptions-report",
        }
    }
}

/// Run `command` against the live provider.
pub async fn run(command: Command, config: &SimConfig) -> Result<(), AppError> {
    let client = StripeClient::new(config.stripe.clone())?;
    if !client.is_configured() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "STRIPE_SECRET_KEY must not be empty"
        )));
    }

    match command {
        Command::CreateTestClock => {
            create_test_clock::handle(&client, config).await?;
        }
        Command::CreateSubscription => {
            create_subscription::handle(&client, config).await?;
        }
        Command::SubscriptionsReport => {
            let mut sink = TextTableSink::stdout();
            subscriptions_report::handle(&client, config, &mut sink).await?;
        }
    }

    Ok(())
}
