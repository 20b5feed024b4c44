//! Configuration module for billing-sim.

mod env_file;

pub use env_file::upsert_env_var;

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use service_core::poll::PollConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Env var holding the simulated clock id shared by the commands.
pub const TEST_CLOCK_ENV: &str = "STRIPE_TEST_CLOCK";

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub stripe: StripeConfig,
    pub clock: ClockConfig,
    pub fixtures: FixtureConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    pub api_base_url: String,
    pub api_version: String,
    pub test_clock: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ClockConfig {
    pub name: String,
    pub poll: PollConfig,
}

/// Catalog entries and customer details the simulation subscribes with.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub customer_email: String,
    pub payment_method: String,
    pub currency: String,
    pub trial_period_days: u32,
    pub coupon_name: String,
    pub basic_lookup_key: String,
    pub premium_lookup_key: String,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Subscriptions whose invoices are fetched concurrently.
    pub invoice_concurrency: usize,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            customer_email: "yamir@example.com".to_string(),
            payment_method: "pm_card_visa".to_string(),
            currency: "gbp".to_string(),
            trial_period_days: 30,
            coupon_name: "5 Dollar Off for 3 Months".to_string(),
            basic_lookup_key: "monthly_crossclip_basic".to_string(),
            premium_lookup_key: "monthly_crossclip_premium".to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let defaults = FixtureConfig::default();

        let secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("STRIPE_SECRET_KEY is required"))
        })?;
        let request_timeout = Duration::from_secs(common.request_timeout_secs);

        Ok(Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "billing-sim".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            stripe: StripeConfig {
                secret_key: Secret::new(secret_key),
                api_base_url: env::var("STRIPE_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
                api_version: env::var("STRIPE_API_VERSION")
                    .unwrap_or_else(|_| "2024-06-20".to_string()),
                test_clock: env::var(TEST_CLOCK_ENV).ok().filter(|id| !id.is_empty()),
                request_timeout,
            },
            clock: ClockConfig {
                name: env::var("STRIPE_TEST_CLOCK_NAME")
                    .unwrap_or_else(|_| "Billing Simulator Test Clock".to_string()),
                poll: PollConfig::new(
                    Duration::from_secs(parse_env("CLOCK_POLL_INTERVAL_SECS", 4)?),
                    parse_env("CLOCK_POLL_MAX_ATTEMPTS", 150)?,
                ),
            },
            fixtures: FixtureConfig {
                customer_email: env::var("SIM_CUSTOMER_EMAIL").unwrap_or(defaults.customer_email),
                payment_method: env::var("SIM_PAYMENT_METHOD").unwrap_or(defaults.payment_method),
                currency: env::var("SIM_CURRENCY").unwrap_or(defaults.currency),
                trial_period_days: parse_env("SIM_TRIAL_PERIOD_DAYS", defaults.trial_period_days)?,
                coupon_name: env::var("SIM_COUPON_NAME").unwrap_or(defaults.coupon_name),
                basic_lookup_key: env::var("SIM_BASIC_LOOKUP_KEY")
                    .unwrap_or(defaults.basic_lookup_key),
                premium_lookup_key: env::var("SIM_PREMIUM_LOOKUP_KEY")
                    .unwrap_or(defaults.premium_lookup_key),
            },
            report: ReportConfig {
                invoice_concurrency: parse_env("REPORT_INVOICE_CONCURRENCY", 4)?,
            },
            common,
        })
    }

    /// Clock id the simulation and report operate on.
    pub fn require_test_clock(&self) -> Result<&str, AppError> {
        self.stripe.test_clock.as_deref().ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} is required; run create-test-clock first",
                TEST_CLOCK_ENV
            ))
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}
