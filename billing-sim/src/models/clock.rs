//! Simulated clock model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test clock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    Advancing,
    Ready,
    InternalFailure,
    #[serde(other)]
    Unknown,
}

impl ClockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockStatus::Advancing => "advancing",
            ClockStatus::Ready => "ready",
            ClockStatus::InternalFailure => "internal_failure",
            ClockStatus::Unknown => "unknown",
        }
    }
}

/// Provider-owned simulated clock. Subscriptions and customers attached to it
/// only observe time moving when the clock is advanced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestClock {
    pub id: String,
    /// Unix timestamp the clock is frozen at.
    pub frozen_time: i64,
    pub status: ClockStatus,
    #[serde(default)]
    pub name: Option<String>,
}

impl TestClock {
    pub fn is_ready(&self) -> bool {
        self.status == ClockStatus::Ready
    }

    pub fn frozen_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.frozen_time, 0)
    }
}
