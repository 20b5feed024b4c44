//! Customer model.

use serde::{Deserialize, Serialize};

/// Customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub test_clock: Option<String>,
}

/// Input for creating a customer attached to a test clock.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub email: String,
    pub test_clock: String,
    /// Payment method attached and used as the invoice default.
    pub payment_method: String,
}
