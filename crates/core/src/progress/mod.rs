//! Progress engine: current-week calculation and per-week progress views.

mod report;
mod summary;
mod week;

pub use report::*;
pub use summary::*;
pub use week::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of one task for one user.
///
/// A missing record means the task is not completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub user_id: String,
    pub path_id: String,
    pub task_id: String,
    pub completed: bool,
    pub proof_url: String,
    pub updated_at: DateTime<Utc>,
}

/// One page of a per-week report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBlock<R> {
    pub week: u32,
    pub rows: Vec<R>,
}
