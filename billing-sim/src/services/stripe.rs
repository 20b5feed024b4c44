//! Stripe API client.
//!
//! Implements the test-clock, customer, subscription, catalog and invoice
//! endpoints the simulator uses. Requests are form-encoded and authenticated
//! with the account secret key; responses are decoded into [`crate::models`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::error::AppError;

use super::BillingProvider;
use crate::config::StripeConfig;
use crate::models::{
    Coupon, CreateCustomer, CreateSubscription, Customer, Invoice, List, Price, Subscription,
    TestClock, UpgradeSubscription,
};

/// Largest page the list and search endpoints accept.
const PAGE_LIMIT: &str = "100";

type Params = Vec<(String, String)>;

/// Stripe client for interacting with the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// Stripe API error response.
#[derive(Debug, Deserialize)]
pub struct StripeError {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub param: Option<String>,
}

impl StripeClient {
    /// Create a new Stripe client.
    pub fn new(config: StripeConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    /// Check if Stripe is configured (secret key is set).
    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.api_base_url.trim_end_matches('/'),
            path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.config.secret_key.expose_secret())
            .header("Stripe-Version", &self.config.api_version)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        operation: &str,
    ) -> Result<T, AppError> {
        let request = self.authorized(self.client.get(self.url(path)).query(query));
        self.send(request, operation).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        operation: &str,
    ) -> Result<T, AppError> {
        let request = self.authorized(self.client.post(self.url(path)).form(form));
        self.send(request, operation).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, AppError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Stripe request failed");
            AppError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(operation, status = %status, body = %body, "Stripe response");

        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            let error: StripeError =
                serde_json::from_str(&body).unwrap_or_else(|_| StripeError {
                    error: StripeErrorDetail {
                        error_type: None,
                        code: None,
                        message: Some(body.clone()),
                        param: None,
                    },
                });
            tracing::error!(
                operation,
                status = status.as_u16(),
                error_type = ?error.error.error_type,
                code = ?error.error.code,
                param = ?error.error.param,
                message = ?error.error.message,
                "Stripe request rejected"
            );
            Err(AppError::Provider {
                status: status.as_u16(),
                code: error.error.code,
                message: error
                    .error
                    .message
                    .unwrap_or_else(|| status.to_string()),
            })
        }
    }

    /// Walk a list endpoint with `starting_after` cursors.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Params,
        id_of: fn(&T) -> &str,
        operation: &str,
    ) -> Result<Vec<T>, AppError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = params.clone();
            query.push(pair("limit", PAGE_LIMIT));
            if let Some(after) = &cursor {
                query.push(pair("starting_after", after));
            }

            let page: List<T> = self.get(path, &query, operation).await?;
            let has_more = page.has_more;
            items.extend(page.data);

            match items.last() {
                Some(last) if has_more => cursor = Some(id_of(last).to_string()),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Walk a search endpoint with `page` tokens.
    async fn search_all<T: DeserializeOwned>(
        &self,
        path: &str,
        search_query: &str,
        operation: &str,
    ) -> Result<Vec<T>, AppError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![pair("query", search_query), pair("limit", PAGE_LIMIT)];
            if let Some(token) = &page_token {
                query.push(pair("page", token));
            }

            let page: List<T> = self.get(path, &query, operation).await?;
            items.extend(page.data);

            match page.next_page {
                Some(token) if page.has_more => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_test_clock(
        &self,
        frozen_time: i64,
        name: &str,
    ) -> Result<TestClock, AppError> {
        let form = vec![
            pair("frozen_time", &frozen_time.to_string()),
            pair("name", name),
        ];
        let clock: TestClock = self
            .post_form("test_helpers/test_clocks", &form, "create_test_clock")
            .await?;
        tracing::info!(clock_id = %clock.id, frozen_time, "Test clock created");
        Ok(clock)
    }

    async fn advance_test_clock(
        &self,
        clock_id: &str,
        frozen_time: i64,
    ) -> Result<TestClock, AppError> {
        let form = vec![pair("frozen_time", &frozen_time.to_string())];
        self.post_form(
            &format!("test_helpers/test_clocks/{}/advance", clock_id),
            &form,
            "advance_test_clock",
        )
        .await
    }

    async fn retrieve_test_clock(&self, clock_id: &str) -> Result<TestClock, AppError> {
        self.get(
            &format!("test_helpers/test_clocks/{}", clock_id),
            &[],
            "retrieve_test_clock",
        )
        .await
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, AppError> {
        self.list_all("coupons", Vec::new(), |c: &Coupon| c.id.as_str(), "list_coupons")
            .await
    }

    async fn search_prices_by_lookup_key(
        &self,
        lookup_key: &str,
    ) -> Result<Vec<Price>, AppError> {
        self.search_all(
            "prices/search",
            &format!("lookup_key:'{}'", lookup_key),
            "search_prices",
        )
        .await
    }

    async fn create_customer(&self, params: &CreateCustomer) -> Result<Customer, AppError> {
        let customer: Customer = self
            .post_form("customers", &customer_form(params), "create_customer")
            .await?;
        tracing::info!(customer_id = %customer.id, test_clock = %params.test_clock, "Customer created");
        Ok(customer)
    }

    async fn create_subscription(
        &self,
        params: &CreateSubscription,
    ) -> Result<Subscription, AppError> {
        let subscription: Subscription = self
            .post_form(
                "subscriptions",
                &subscription_form(params),
                "create_subscription",
            )
            .await?;
        tracing::info!(
            subscription_id = %subscription.id,
            status = subscription.status.as_str(),
            "Subscription created"
        );
        Ok(subscription)
    }

    async fn upgrade_subscription(
        &self,
        params: &UpgradeSubscription,
    ) -> Result<Subscription, AppError> {
        self.post_form(
            &format!("subscriptions/{}", params.subscription_id),
            &upgrade_form(params),
            "upgrade_subscription",
        )
        .await
    }

    async fn list_clock_subscriptions(
        &self,
        clock_id: &str,
    ) -> Result<Vec<Subscription>, AppError> {
        let params = vec![
            pair("status", "all"),
            pair("test_clock", clock_id),
            pair("expand[]", "data.customer"),
            pair("expand[]", "data.plan.product"),
        ];
        self.list_all(
            "subscriptions",
            params,
            |s: &Subscription| s.id.as_str(),
            "list_subscriptions",
        )
        .await
    }

    async fn search_subscription_invoices(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<Invoice>, AppError> {
        self.search_all(
            "invoices/search",
            &format!("subscription:'{}'", subscription_id),
            "search_invoices",
        )
        .await
    }
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn customer_form(params: &CreateCustomer) -> Params {
    vec![
        pair("email", &params.email),
        pair("test_clock", &params.test_clock),
        pair("payment_method", &params.payment_method),
        pair(
            "invoice_settings[default_payment_method]",
            &params.payment_method,
        ),
    ]
}

fn subscription_form(params: &CreateSubscription) -> Params {
    let mut form = vec![
        pair("customer", &params.customer_id),
        pair("items[0][price]", &params.price_id),
        pair("currency", &params.currency),
        pair("trial_period_days", &params.trial_period_days.to_string()),
    ];
    // Top-level `coupon` is deprecated in favour of `discounts`.
    if let Some(coupon_id) = &params.coupon_id {
        form.push(pair("discounts[0][coupon]", coupon_id));
    }
    form
}

fn upgrade_form(params: &UpgradeSubscription) -> Params {
    vec![
        pair("payment_behavior", params.payment_behavior.as_str()),
        pair("proration_behavior", params.proration_behavior.as_str()),
        pair("items[0][id]", &params.item_id),
        pair("items[0][price]", &params.new_price_id),
    ]
}
