//! Subscription lifecycle simulation on a test clock.
//!
//! Creates a customer and a discounted, trialing subscription on the basic
//! plan, then walks the clock through a year month by month. Halfway through
//! the fifth month the subscription moves to the premium plan with the
//! proration invoiced straight away.

pub mod schedule;
pub mod upgrade;

pub use schedule::{monthly_targets, PeriodTarget, SIMULATED_PERIODS, UPGRADE_PERIOD};
pub use upgrade::apply_prorated_upgrade;

use chrono::NaiveDate;
use service_core::error::AppError;
use service_core::poll::PollConfig;
use tracing::info;

use crate::clock::ClockAdvancer;
use crate::config::FixtureConfig;
use crate::models::{Coupon, CreateCustomer, CreateSubscription, Price};
use crate::services::BillingProvider;
use schedule::start_of_day;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub customer_id: String,
    pub subscription_id: String,
    pub periods_advanced: u32,
    pub upgraded_on: Option<NaiveDate>,
}

pub struct SubscriptionSimulator<'a> {
    provider: &'a dyn BillingProvider,
    fixtures: &'a FixtureConfig,
    clock: ClockAdvancer<'a>,
}

impl<'a> SubscriptionSimulator<'a> {
    pub fn new(
        provider: &'a dyn BillingProvider,
        fixtures: &'a FixtureConfig,
        clock_id: &str,
        poll: PollConfig,
    ) -> Self {
        Self {
            provider,
            fixtures,
            clock: ClockAdvancer::new(provider, clock_id, poll),
        }
    }

    /// Run the full year starting from `anchor` (normally today).
    pub async fn run(&self, anchor: NaiveDate) -> Result<SimulationOutcome, AppError> {
        let coupon = find_coupon(self.provider, &self.fixtures.coupon_name).await?;
        let basic = find_price(self.provider, &self.fixtures.basic_lookup_key).await?;
        let premium = find_price(self.provider, &self.fixtures.premium_lookup_key).await?;

        let customer = self
            .provider
            .create_customer(&CreateCustomer {
                email: self.fixtures.customer_email.clone(),
                test_clock: self.clock.clock_id().to_string(),
                payment_method: self.fixtures.payment_method.clone(),
            })
            .await?;

        let subscription = self
            .provider
            .create_subscription(&CreateSubscription {
                customer_id: customer.id.clone(),
                price_id: basic.id.clone(),
                currency: self.fixtures.currency.clone(),
                trial_period_days: self.fixtures.trial_period_days,
                coupon_id: Some(coupon.id.clone()),
            })
            .await?;

        info!(subscription_id = %subscription.id, "Created subscription");

        let item_id = subscription
            .first_item()
            .map(|item| item.id.clone())
            .ok_or_else(|| {
                AppError::MalformedData(format!(
                    "subscription {} was created without line items",
                    subscription.id
                ))
            })?;

        let mut outcome = SimulationOutcome {
            customer_id: customer.id,
            subscription_id: subscription.id,
            periods_advanced: 0,
            upgraded_on: None,
        };

        for target in monthly_targets(anchor) {
            self.clock
                .advance_and_wait(start_of_day(target.advance_to))
                .await?;
            outcome.periods_advanced = target.period;

            if let Some(upgrade_at) = target.upgrade_at {
                info!(
                    period = target.period,
                    upgrade_at = %upgrade_at,
                    "Performing mid-cycle upgrade with proration"
                );
                self.clock.advance_and_wait(start_of_day(upgrade_at)).await?;

                apply_prorated_upgrade(
                    self.provider,
                    &outcome.subscription_id,
                    &item_id,
                    &premium.id,
                )
                .await?;
                outcome.upgraded_on = Some(upgrade_at);
            }
        }

        info!(
            subscription_id = %outcome.subscription_id,
            periods = outcome.periods_advanced,
            "Simulation complete"
        );

        Ok(outcome)
    }
}

/// The coupon with the given display name. The provider has no coupon
/// search, so the full list is filtered locally.
pub async fn find_coupon(provider: &dyn BillingProvider, name: &str) -> Result<Coupon, AppError> {
    provider
        .list_coupons()
        .await?
        .into_iter()
        .find(|coupon| coupon.name.as_deref() == Some(name))
        .ok_or_else(|| AppError::LookupNotFound(format!("coupon named '{}'", name)))
}

/// The first price registered under `lookup_key`.
pub async fn find_price(provider: &dyn BillingProvider, lookup_key: &str) -> Result<Price, AppError> {
    provider
        .search_prices_by_lookup_key(lookup_key)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::LookupNotFound(format!("price with lookup key '{}'", lookup_key)))
}
