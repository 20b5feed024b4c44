//! Static conversion of invoice amounts to USD.
//!
//! Rates are fixed constants, so converted figures drift from what the
//! provider actually settled at market rates. All arithmetic stays in
//! `Decimal`; amounts are only scaled to major units and rounded at the end.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

pub fn gbp_to_usd() -> Decimal {
    Decimal::new(127, 2)
}

pub fn eur_to_usd() -> Decimal {
    Decimal::new(108, 2)
}

/// Rate table keyed by lowercase currency code. Unknown currencies convert
/// at 1, i.e. pass through unchanged.
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    rates: HashMap<String, Decimal>,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::empty()
            .with_rate("gbp", gbp_to_usd())
            .with_rate("eur", eur_to_usd())
    }
}

impl ExchangeRates {
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: Decimal) -> Self {
        self.rates.insert(currency.to_ascii_lowercase(), rate);
        self
    }

    pub fn rate_for(&self, currency: &str) -> Decimal {
        self.rates
            .get(&currency.to_ascii_lowercase())
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Convert an amount in minor units to USD minor units, unrounded.
    pub fn to_usd_minor(&self, amount_minor: i64, currency: &str) -> Decimal {
        Decimal::from(amount_minor) * self.rate_for(currency)
    }
}

/// Minor units to major units, rounded to cents (half away from zero).
pub fn minor_to_major(amount_minor: Decimal) -> Decimal {
    (amount_minor / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `$12.70` style rendering of a major-unit amount.
pub fn format_usd(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}
