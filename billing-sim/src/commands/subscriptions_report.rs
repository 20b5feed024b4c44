//! `subscriptions-report`

use service_core::error::AppError;
use tracing::info;

use crate::config::SimConfig;
use crate::report::{
    render_report, ExchangeRates, ReportAggregator, ReportGenerator, SubscriptionsReport, TableSink,
};
use crate::services::BillingProvider;

pub async fn handle(
    provider: &dyn BillingProvider,
    config: &SimConfig,
    sink: &mut dyn TableSink,
) -> Result<SubscriptionsReport, AppError> {
    let clock_id = config.require_test_clock()?;

    let generator = ReportGenerator::new(
        provider,
        ReportAggregator::new(ExchangeRates::default()),
        config.report.invoice_concurrency,
    );

    let report = generator.generate(clock_id).await?;
    render_report(&report, sink)?;

    info!(
        products = report.products.len(),
        skipped = report.skipped.len(),
        "Report rendered"
    );

    Ok(report)
}
