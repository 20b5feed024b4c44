//! Subscription model.

use serde::{Deserialize, Serialize};

use super::{Customer, Expandable, List, Price, Product};

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Unknown => "unknown",
        }
    }
}

/// Line item of a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub id: String,
    pub price: Price,
}

/// Legacy plan view of a single-item subscription. Carries the product
/// when listed with `expand[]=data.plan.product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub product: Option<Expandable<Product>>,
}

/// Subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer: Expandable<Customer>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub items: List<SubscriptionItem>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Subscription {
    pub fn first_item(&self) -> Option<&SubscriptionItem> {
        self.items.data.first()
    }

    /// Email of the expanded customer, if the listing expanded it.
    pub fn customer_email(&self) -> Option<&str> {
        self.customer
            .as_object()
            .and_then(|customer| customer.email.as_deref())
    }

    /// Name of the expanded plan product, if the listing expanded it.
    pub fn product_name(&self) -> Option<&str> {
        self.plan
            .as_ref()
            .and_then(|plan| plan.product.as_ref())
            .and_then(Expandable::as_object)
            .and_then(|product| product.name.as_deref())
    }
}

/// Input for creating a subscription on a single price.
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub customer_id: String,
    pub price_id: String,
    pub currency: String,
    pub trial_period_days: u32,
    pub coupon_id: Option<String>,
}

/// How the provider treats a payment that fails during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentBehavior {
    AllowIncomplete,
    ErrorIfIncomplete,
    PendingIfIncomplete,
}

impl PaymentBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentBehavior::AllowIncomplete => "allow_incomplete",
            PaymentBehavior::ErrorIfIncomplete => "error_if_incomplete",
            PaymentBehavior::PendingIfIncomplete => "pending_if_incomplete",
        }
    }
}

/// When proration for a mid-cycle change is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationBehavior {
    AlwaysInvoice,
    CreateProrations,
    None,
}

impl ProrationBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProrationBehavior::AlwaysInvoice => "always_invoice",
            ProrationBehavior::CreateProrations => "create_prorations",
            ProrationBehavior::None => "none",
        }
    }
}

/// Input for replacing the price of an existing line item.
#[derive(Debug, Clone)]
pub struct UpgradeSubscription {
    pub subscription_id: String,
    pub item_id: String,
    pub new_price_id: String,
    pub payment_behavior: PaymentBehavior,
    pub proration_behavior: ProrationBehavior,
}
