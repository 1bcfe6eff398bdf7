use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::TaskProgress;
use crate::curriculum::{Topic, path_task_ids};

/// Completed/pending counts for one user on one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub user_name: String,
    pub completed: usize,
    pub pending: usize,
}

/// A user to summarise: id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryUser {
    pub user_id: String,
    pub user_name: String,
}

/// Completed and pending counts per user.
///
/// The total is every task id reachable through the path's topics, not
/// deduplicated. Only completed records whose task belongs to the path are
/// counted, so `completed + pending == total` for every user.
#[must_use]
pub fn aggregate_user_summary(
    users: &[SummaryUser],
    topics: &[Topic],
    progress_by_user: &HashMap<String, Vec<TaskProgress>>,
) -> Vec<UserSummary> {
    let task_ids = path_task_ids(topics);
    let total = task_ids.len();
    let in_path: HashSet<&str> = task_ids.into_iter().collect();

    users
        .iter()
        .map(|user| {
            let completed = progress_by_user
                .get(&user.user_id)
                .map(|records| {
                    records
                        .iter()
                        .filter(|p| p.completed && in_path.contains(p.task_id.as_str()))
                        .map(|p| p.task_id.as_str())
                        .collect::<HashSet<_>>()
                        .len()
                })
                .unwrap_or(0)
                .min(total);
            UserSummary {
                user_id: user.user_id.clone(),
                user_name: user.user_name.clone(),
                completed,
                pending: total - completed,
            }
        })
        .collect()
}
