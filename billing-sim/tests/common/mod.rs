#![allow(dead_code)]

use async_trait::async_trait;
use billing_sim::config::{
    ClockConfig, FixtureConfig, ReportConfig, SimConfig, StripeConfig,
};
use billing_sim::models::{
    ClockStatus, Coupon, CreateCustomer, CreateSubscription, Customer, Expandable, Invoice, List,
    Plan, Price, Product, Subscription, SubscriptionItem, SubscriptionStatus, TestClock,
    UpgradeSubscription,
};
use billing_sim::report::TableSink;
use billing_sim::services::BillingProvider;
use secrecy::Secret;
use service_core::config::Config;
use service_core::error::AppError;
use service_core::poll::PollConfig;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_CLOCK_ID: &str = "clock_test";

/// Provider calls in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateClock { frozen_time: i64, name: String },
    AdvanceClock { frozen_time: i64 },
    RetrieveClock,
    ListCoupons,
    SearchPrices { lookup_key: String },
    CreateCustomer { email: String, test_clock: String },
    CreateSubscription { price_id: String, coupon_id: Option<String> },
    Upgrade { item_id: String, new_price_id: String },
    ListSubscriptions { clock_id: String },
    SearchInvoices { subscription_id: String },
}

/// In-memory provider. Clock retrievals pop `retrieve_statuses` and fall back
/// to `default_status` once the script runs out.
pub struct FakeProvider {
    pub advance_status: ClockStatus,
    pub default_status: ClockStatus,
    retrieve_statuses: Mutex<VecDeque<ClockStatus>>,
    frozen_time: Mutex<i64>,
    calls: Mutex<Vec<Call>>,
    pub coupons: Vec<Coupon>,
    pub prices: Vec<Price>,
    pub subscriptions: Vec<Subscription>,
    pub invoices: HashMap<String, Vec<Invoice>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            advance_status: ClockStatus::Advancing,
            default_status: ClockStatus::Ready,
            retrieve_statuses: Mutex::new(VecDeque::new()),
            frozen_time: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
            coupons: Vec::new(),
            prices: Vec::new(),
            subscriptions: Vec::new(),
            invoices: HashMap::new(),
        }
    }
}

impl FakeProvider {
    /// Advances answer with `advance_status`; unscripted retrievals answer
    /// with `default_status`.
    pub fn with_statuses(advance_status: ClockStatus, default_status: ClockStatus) -> Self {
        Self {
            advance_status,
            default_status,
            ..Self::default()
        }
    }

    /// Provider stocked with the catalog the simulation looks up.
    pub fn with_catalog() -> Self {
        let fixtures = FixtureConfig::default();
        Self {
            coupons: vec![
                coupon("coupon_other", "Ten Percent Off"),
                coupon("coupon_5off", &fixtures.coupon_name),
            ],
            prices: vec![
                price("price_basic", &fixtures.basic_lookup_key),
                price("price_premium", &fixtures.premium_lookup_key),
            ],
            ..Self::default()
        }
    }

    pub fn script_statuses(&self, statuses: &[ClockStatus]) {
        self.retrieve_statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn clock(&self, status: ClockStatus) -> TestClock {
        TestClock {
            id: TEST_CLOCK_ID.to_string(),
            frozen_time: *self.frozen_time.lock().unwrap(),
            status,
            name: None,
        }
    }
}

#[async_trait]
impl BillingProvider for FakeProvider {
    async fn create_test_clock(&self, frozen_time: i64, name: &str) -> Result<TestClock, AppError> {
        self.record(Call::CreateClock {
            frozen_time,
            name: name.to_string(),
        });
        *self.frozen_time.lock().unwrap() = frozen_time;
        Ok(self.clock(ClockStatus::Ready))
    }

    async fn advance_test_clock(&self, _clock_id: &str, frozen_time: i64) -> Result<TestClock, AppError> {
        self.record(Call::AdvanceClock { frozen_time });
        *self.frozen_time.lock().unwrap() = frozen_time;
        Ok(self.clock(self.advance_status))
    }

    async fn retrieve_test_clock(&self, _clock_id: &str) -> Result<TestClock, AppError> {
        self.record(Call::RetrieveClock);
        let status = self
            .retrieve_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_status);
        Ok(self.clock(status))
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, AppError> {
        self.record(Call::ListCoupons);
        Ok(self.coupons.clone())
    }

    async fn search_prices_by_lookup_key(&self, lookup_key: &str) -> Result<Vec<Price>, AppError> {
        self.record(Call::SearchPrices {
            lookup_key: lookup_key.to_string(),
        });
        Ok(self
            .prices
            .iter()
            .filter(|p| p.lookup_key.as_deref() == Some(lookup_key))
            .cloned()
            .collect())
    }

    async fn create_customer(&self, params: &CreateCustomer) -> Result<Customer, AppError> {
        self.record(Call::CreateCustomer {
            email: params.email.clone(),
            test_clock: params.test_clock.clone(),
        });
        Ok(Customer {
            id: "cus_test".to_string(),
            email: Some(params.email.clone()),
            test_clock: Some(params.test_clock.clone()),
        })
    }

    async fn create_subscription(&self, params: &CreateSubscription) -> Result<Subscription, AppError> {
        self.record(Call::CreateSubscription {
            price_id: params.price_id.clone(),
            coupon_id: params.coupon_id.clone(),
        });
        let mut created = subscription("sub_test", Some("yamir@example.com"), Some("Crossclip"));
        created.status = SubscriptionStatus::Trialing;
        Ok(created)
    }

    async fn upgrade_subscription(&self, params: &UpgradeSubscription) -> Result<Subscription, AppError> {
        self.record(Call::Upgrade {
            item_id: params.item_id.clone(),
            new_price_id: params.new_price_id.clone(),
        });
        Ok(subscription(
            &params.subscription_id,
            Some("yamir@example.com"),
            Some("Crossclip"),
        ))
    }

    async fn list_clock_subscriptions(&self, clock_id: &str) -> Result<Vec<Subscription>, AppError> {
        self.record(Call::ListSubscriptions {
            clock_id: clock_id.to_string(),
        });
        Ok(self.subscriptions.clone())
    }

    async fn search_subscription_invoices(&self, subscription_id: &str) -> Result<Vec<Invoice>, AppError> {
        self.record(Call::SearchInvoices {
            subscription_id: subscription_id.to_string(),
        });
        Ok(self.invoices.get(subscription_id).cloned().unwrap_or_default())
    }
}

/// Captures emitted tables instead of printing them.
#[derive(Default)]
pub struct RecordingSink {
    pub tables: Vec<(String, Vec<String>, Vec<Vec<String>>)>,
}

impl TableSink for RecordingSink {
    fn emit(&mut self, title: &str, headers: &[String], rows: &[Vec<String>]) -> Result<(), AppError> {
        self.tables
            .push((title.to_string(), headers.to_vec(), rows.to_vec()));
        Ok(())
    }
}

pub fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig::new(Duration::from_millis(1), max_attempts)
}

pub fn test_config(env_file: &Path, test_clock: Option<&str>) -> SimConfig {
    SimConfig {
        common: Config {
            env_file: env_file.to_string_lossy().into_owned(),
            ..Config::default()
        },
        service_name: "billing-sim-test".to_string(),
        log_level: "debug".to_string(),
        stripe: StripeConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            api_base_url: "http://127.0.0.1:1".to_string(),
            api_version: "2024-06-20".to_string(),
            test_clock: test_clock.map(str::to_string),
            request_timeout: Duration::from_secs(5),
        },
        clock: ClockConfig {
            name: "Billing Simulator Test Clock".to_string(),
            poll: fast_poll(5),
        },
        fixtures: FixtureConfig::default(),
        report: ReportConfig {
            invoice_concurrency: 2,
        },
    }
}

pub fn coupon(id: &str, name: &str) -> Coupon {
    Coupon {
        id: id.to_string(),
        name: Some(name.to_string()),
        amount_off: Some(500),
        currency: Some("gbp".to_string()),
        duration: Some("repeating".to_string()),
        duration_in_months: Some(3),
    }
}

pub fn price(id: &str, lookup_key: &str) -> Price {
    Price {
        id: id.to_string(),
        lookup_key: Some(lookup_key.to_string()),
        currency: "gbp".to_string(),
        unit_amount: Some(1000),
        product: Expandable::Id("prod_crossclip".to_string()),
    }
}

pub fn subscription(id: &str, email: Option<&str>, product_name: Option<&str>) -> Subscription {
    Subscription {
        id: id.to_string(),
        customer: Expandable::Object(Box::new(Customer {
            id: format!("cus_{}", id),
            email: email.map(str::to_string),
            test_clock: Some(TEST_CLOCK_ID.to_string()),
        })),
        status: SubscriptionStatus::Active,
        items: List {
            data: vec![SubscriptionItem {
                id: format!("si_{}", id),
                price: price("price_basic", "monthly_crossclip_basic"),
            }],
            ..List::default()
        },
        plan: Some(Plan {
            id: "price_basic".to_string(),
            product: product_name.map(|name| {
                Expandable::Object(Box::new(Product {
                    id: "prod_crossclip".to_string(),
                    name: Some(name.to_string()),
                }))
            }),
        }),
        currency: Some("gbp".to_string()),
    }
}

pub fn invoice(id: &str, currency: &str, amount_paid: i64, created: i64) -> Invoice {
    Invoice {
        id: id.to_string(),
        subscription: None,
        currency: currency.to_string(),
        amount_paid,
        created,
        status: Some("paid".to_string()),
    }
}
