//! Mid-cycle plan upgrade.

use service_core::error::AppError;

use crate::models::{PaymentBehavior, ProrationBehavior, Subscription, UpgradeSubscription};
use crate::services::BillingProvider;

/// Swap the subscription's line item to `new_price_id`, invoicing the
/// proration immediately. A failed payment leaves the change pending instead
/// of activating it.
pub async fn apply_prorated_upgrade(
    provider: &dyn BillingProvider,
    subscription_id: &str,
    item_id: &str,
    new_price_id: &str,
) -> Result<Subscription, AppError> {
    let params = UpgradeSubscription {
        subscription_id: subscription_id.to_string(),
        item_id: item_id.to_string(),
        new_price_id: new_price_id.to_string(),
        payment_behavior: PaymentBehavior::PendingIfIncomplete,
        proration_behavior: ProrationBehavior::AlwaysInvoice,
    };

    let subscription = provider.upgrade_subscription(&params).await?;

    tracing::info!(
        subscription_id,
        item_id,
        new_price_id,
        status = subscription.status.as_str(),
        "Subscription upgraded with proration"
    );

    Ok(subscription)
}
