//! Usage Metrics Aggregator: command invocation events and their rollups.

mod aggregate;
mod period;

pub use aggregate::*;
pub use period::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded command invocation. Events are append-only and keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: String,
    pub user_id: String,
    pub function_name: String,
    pub channel_id: Option<String>,
    pub path_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Inclusive `[start, end]` time filter. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Unbounded on both sides.
    #[must_use]
    pub const fn all() -> Self {
        Self { start: None, end: None }
    }

    /// Boundary-equal timestamps are inside.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}
