//! service-core: Shared infrastructure for the billing simulator commands.
pub mod config;
pub mod error;
pub mod observability;
pub mod poll;

pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
