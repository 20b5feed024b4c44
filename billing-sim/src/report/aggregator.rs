//! Turning subscriptions and their invoices into per-product tables.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

use super::currency::{format_usd, minor_to_major, ExchangeRates};
use crate::models::{Invoice, Subscription};
use service_core::error::AppError;

/// Months covered by the report.
pub const REPORT_PERIODS: usize = 12;

pub const CUSTOMER_EMAIL_HEADER: &str = "Customer Email";
pub const PRODUCT_NAME_HEADER: &str = "Product Name";
pub const LIFETIME_VALUE_HEADER: &str = "Life Time Value";
pub const TOTALS_LABEL: &str = "Total";

/// One subscription's normalized revenue. Amounts are USD major units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub customer_email: String,
    pub product_name: String,
    /// Slot `i` holds the `i`-th oldest invoice; `None` if not issued yet.
    pub periods: [Option<Decimal>; REPORT_PERIODS],
    pub lifetime_value: Decimal,
}

impl ReportRow {
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(REPORT_PERIODS + 3);
        cells.push(self.customer_email.clone());
        cells.push(self.product_name.clone());
        cells.extend(
            self.periods
                .iter()
                .map(|slot| slot.map(format_usd).unwrap_or_default()),
        );
        cells.push(format_usd(self.lifetime_value));
        cells
    }
}

/// Table for one product: its rows plus the trailing totals row.
#[derive(Debug, Clone)]
pub struct ProductReport {
    pub product_name: String,
    pub period_labels: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub totals: ReportRow,
}

impl ProductReport {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(REPORT_PERIODS + 3);
        headers.push(CUSTOMER_EMAIL_HEADER.to_string());
        headers.push(PRODUCT_NAME_HEADER.to_string());
        headers.extend(self.period_labels.iter().cloned());
        headers.push(LIFETIME_VALUE_HEADER.to_string());
        headers
    }

    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .chain(std::iter::once(&self.totals))
            .map(ReportRow::cells)
            .collect()
    }
}

/// A subscription left out of the report and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSubscription {
    pub subscription_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionsReport {
    pub products: Vec<ProductReport>,
    pub skipped: Vec<SkippedSubscription>,
}

/// Oldest-first view of a newest-first invoice list, cut to the report horizon.
pub fn chronological(mut invoices: Vec<Invoice>) -> Vec<Invoice> {
    invoices.reverse();
    invoices.truncate(REPORT_PERIODS);
    invoices
}

/// Partition subscriptions by expanded product name, keeping provider order
/// within each product. Subscriptions without a product cannot be placed and
/// are returned as skipped.
pub fn group_by_product(
    subscriptions: Vec<Subscription>,
) -> (BTreeMap<String, Vec<Subscription>>, Vec<SkippedSubscription>) {
    let mut groups: BTreeMap<String, Vec<Subscription>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for subscription in subscriptions {
        match subscription.product_name() {
            Some(name) => groups
                .entry(name.to_string())
                .or_default()
                .push(subscription),
            None => {
                warn!(
                    subscription_id = %subscription.id,
                    "Subscription has no expanded product, skipping"
                );
                skipped.push(SkippedSubscription {
                    subscription_id: subscription.id,
                    reason: "missing plan product".to_string(),
                });
            }
        }
    }

    (groups, skipped)
}

/// Last day of the month containing `date`.
fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))
}

/// Month-end date shared by every invoice, or `None` if they were billed in
/// different months or there are none.
fn shared_month_end<'a>(invoices: impl Iterator<Item = &'a Invoice>) -> Option<NaiveDate> {
    let mut shared: Option<NaiveDate> = None;
    for invoice in invoices {
        let month_end = end_of_month(invoice.created_at()?.date_naive())?;
        match shared {
            Some(existing) if existing != month_end => return None,
            _ => shared = Some(month_end),
        }
    }
    shared
}

/// Column labels for the period slots, given the oldest-first invoices of
/// each reported row. Slot `i` is labelled with the end-of-month date of the
/// `i`-th invoices when all rows that have one were billed in the same month.
/// Otherwise it gets the generic `endOfMonth N`.
pub fn period_labels(rows: &[&[Invoice]]) -> Vec<String> {
    (0..REPORT_PERIODS)
        .map(|slot| {
            shared_month_end(rows.iter().filter_map(|invoices| invoices.get(slot)))
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| format!("endOfMonth {}", slot + 1))
        })
        .collect()
}

/// Column-wise sum of `rows`. A period slot stays empty only if it is empty
/// in every row.
pub fn totals_row(product_name: &str, rows: &[ReportRow]) -> ReportRow {
    let mut periods: [Option<Decimal>; REPORT_PERIODS] = [None; REPORT_PERIODS];
    let mut lifetime_value = Decimal::ZERO;

    for row in rows {
        for (total, slot) in periods.iter_mut().zip(row.periods.iter()) {
            if let Some(amount) = slot {
                *total = Some(total.unwrap_or(Decimal::ZERO) + amount);
            }
        }
        lifetime_value += row.lifetime_value;
    }

    ReportRow {
        customer_email: TOTALS_LABEL.to_string(),
        product_name: product_name.to_string(),
        periods,
        lifetime_value,
    }
}

/// Builds report rows with a fixed exchange-rate table.
#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    rates: ExchangeRates,
}

impl ReportAggregator {
    pub fn new(rates: ExchangeRates) -> Self {
        Self { rates }
    }

    /// Row for one subscription. `invoices` must already be oldest-first.
    pub fn build_row(
        &self,
        subscription: &Subscription,
        product_name: &str,
        invoices: &[Invoice],
    ) -> Result<ReportRow, AppError> {
        let customer_email = subscription.customer_email().ok_or_else(|| {
            AppError::MalformedData(format!(
                "subscription {} has no expanded customer email",
                subscription.id
            ))
        })?;

        let mut periods: [Option<Decimal>; REPORT_PERIODS] = [None; REPORT_PERIODS];
        let mut lifetime_minor = Decimal::ZERO;

        for (slot, invoice) in periods.iter_mut().zip(invoices.iter()) {
            let usd_minor = self
                .rates
                .to_usd_minor(invoice.amount_paid, &invoice.currency);
            *slot = Some(minor_to_major(usd_minor));
            lifetime_minor += usd_minor;
        }

        Ok(ReportRow {
            customer_email: customer_email.to_string(),
            product_name: product_name.to_string(),
            periods,
            lifetime_value: minor_to_major(lifetime_minor),
        })
    }

    /// Table for one product from `(subscription, oldest-first invoices)`
    /// pairs. Rows that cannot be built are recorded in `skipped`; a product
    /// left with no rows yields `None`.
    pub fn build_product(
        &self,
        product_name: &str,
        entries: &[(Subscription, Vec<Invoice>)],
        skipped: &mut Vec<SkippedSubscription>,
    ) -> Option<ProductReport> {
        let mut rows = Vec::with_capacity(entries.len());
        let mut reported: Vec<&[Invoice]> = Vec::with_capacity(entries.len());

        for (subscription, invoices) in entries {
            match self.build_row(subscription, product_name, invoices) {
                Ok(row) => {
                    rows.push(row);
                    reported.push(invoices);
                }
                Err(e) => {
                    warn!(
                        subscription_id = %subscription.id,
                        product = product_name,
                        error = %e,
                        "Skipping report row"
                    );
                    skipped.push(SkippedSubscription {
                        subscription_id: subscription.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if rows.is_empty() {
            return None;
        }

        let period_labels = period_labels(&reported);
        let totals = totals_row(product_name, &rows);

        Some(ProductReport {
            product_name: product_name.to_string(),
            period_labels,
            rows,
            totals,
        })
    }
}
