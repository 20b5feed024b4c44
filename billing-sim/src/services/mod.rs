//! Billing provider access.

mod stripe;

pub use stripe::StripeClient;

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{
    Coupon, CreateCustomer, CreateSubscription, Customer, Invoice, Price, Subscription, TestClock,
    UpgradeSubscription,
};

/// Operations the commands need from the billing provider.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn create_test_clock(&self, frozen_time: i64, name: &str)
        -> Result<TestClock, AppError>;

    /// Request an advance; the returned clock is usually still `advancing`.
    async fn advance_test_clock(
        &self,
        clock_id: &str,
        frozen_time: i64,
    ) -> Result<TestClock, AppError>;

    async fn retrieve_test_clock(&self, clock_id: &str) -> Result<TestClock, AppError>;

    /// Every coupon on the account.
    async fn list_coupons(&self) -> Result<Vec<Coupon>, AppError>;

    async fn search_prices_by_lookup_key(&self, lookup_key: &str)
        -> Result<Vec<Price>, AppError>;

    async fn create_customer(&self, params: &CreateCustomer) -> Result<Customer, AppError>;

    async fn create_subscription(
        &self,
        params: &CreateSubscription,
    ) -> Result<Subscription, AppError>;

    async fn upgrade_subscription(
        &self,
        params: &UpgradeSubscription,
    ) -> Result<Subscription, AppError>;

    /// Subscriptions of any status attached to the clock, with customer and
    /// plan product expanded.
    async fn list_clock_subscriptions(&self, clock_id: &str)
        -> Result<Vec<Subscription>, AppError>;

    /// Invoices of a subscription, newest first.
    async fn search_subscription_invoices(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<Invoice>, AppError>;
}
