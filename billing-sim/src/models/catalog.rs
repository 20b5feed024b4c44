//! Catalog objects: products, prices and coupons.

use serde::{Deserialize, Serialize};

use super::Expandable;

/// Product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    /// Absent on deleted products.
    #[serde(default)]
    pub name: Option<String>,
}

/// Price of a product, resolved by its lookup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    #[serde(default)]
    pub lookup_key: Option<String>,
    pub currency: String,
    /// Amount in minor units.
    #[serde(default)]
    pub unit_amount: Option<i64>,
    pub product: Expandable<Product>,
}

/// Coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount_off: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub duration_in_months: Option<u32>,
}
