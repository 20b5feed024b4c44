//! Invoice model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invoice issued for a subscription. Immutable once finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub subscription: Option<String>,
    /// Lowercase ISO currency code.
    pub currency: String,
    /// Amount collected, in minor units.
    pub amount_paid: i64,
    /// Unix timestamp of creation.
    pub created: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Invoice {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}
