//! Revenue report over the subscriptions attached to a test clock.

pub mod aggregator;
pub mod currency;
pub mod table;

pub use aggregator::{
    chronological, group_by_product, ProductReport, ReportAggregator, ReportRow,
    SkippedSubscription, SubscriptionsReport, REPORT_PERIODS,
};
pub use currency::ExchangeRates;
pub use table::{TableSink, TextTableSink};

use futures::stream::{self, StreamExt, TryStreamExt};
use service_core::error::AppError;
use tracing::{info, warn};

use crate::models::{Invoice, Subscription};
use crate::services::BillingProvider;

pub struct ReportGenerator<'a> {
    provider: &'a dyn BillingProvider,
    aggregator: ReportAggregator,
    invoice_concurrency: usize,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(
        provider: &'a dyn BillingProvider,
        aggregator: ReportAggregator,
        invoice_concurrency: usize,
    ) -> Self {
        Self {
            provider,
            aggregator,
            invoice_concurrency: invoice_concurrency.max(1),
        }
    }

    /// Fetch, group and normalize every subscription on `clock_id`.
    pub async fn generate(&self, clock_id: &str) -> Result<SubscriptionsReport, AppError> {
        let subscriptions = self.provider.list_clock_subscriptions(clock_id).await?;
        info!(
            clock_id,
            count = subscriptions.len(),
            "Fetched subscriptions for report"
        );

        let (groups, mut skipped) = group_by_product(subscriptions);
        let mut products = Vec::with_capacity(groups.len());

        for (product_name, subscriptions) in groups {
            let entries = self.fetch_invoices(subscriptions).await?;
            if let Some(product) =
                self.aggregator
                    .build_product(&product_name, &entries, &mut skipped)
            {
                products.push(product);
            }
        }

        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "Some subscriptions were left out of the report");
        }

        Ok(SubscriptionsReport { products, skipped })
    }

    /// Oldest-first invoices per subscription. Requests overlap up to the
    /// configured concurrency but results keep the subscription order.
    async fn fetch_invoices(
        &self,
        subscriptions: Vec<Subscription>,
    ) -> Result<Vec<(Subscription, Vec<Invoice>)>, AppError> {
        stream::iter(subscriptions)
            .map(|subscription| async move {
                let invoices = self
                    .provider
                    .search_subscription_invoices(&subscription.id)
                    .await?;
                Ok::<_, AppError>((subscription, chronological(invoices)))
            })
            .buffered(self.invoice_concurrency)
            .try_collect()
            .await
    }
}

/// Emit one table per product, titled with the product name.
pub fn render_report(report: &SubscriptionsReport, sink: &mut dyn TableSink) -> Result<(), AppError> {
    for product in &report.products {
        sink.emit(&product.product_name, &product.headers(), &product.table_rows())?;
    }
    Ok(())
}
