//! Checklist and status views grouped by week.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{TaskProgress, WeekBlock, due_date};
use crate::constants::NO_TASKS_LABEL;
use crate::curriculum::{Task, TopicWithTasks, topics_by_week};
use crate::error::CoreError;

/// One checklist line: a task (or placeholder) under a topic, with its due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRow {
    pub topic_name: String,
    /// True for the first row of a topic; renderers show the topic name only there.
    pub first_in_group: bool,
    /// `None` for the placeholder row of a topic without tasks.
    pub task_name: Option<String>,
    pub due_date: NaiveDate,
}

impl ChecklistRow {
    /// Task label, or the placeholder for a topic without tasks.
    #[must_use]
    pub fn task_label(&self) -> &str {
        self.task_name.as_deref().unwrap_or(NO_TASKS_LABEL)
    }
}

/// One status line: a task with the user's completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub topic_name: String,
    pub task_id: String,
    pub task_name: String,
    pub completed: bool,
    /// Blank when the user has not submitted proof.
    pub proof_url: String,
}

/// Outcome of [`build_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "weeks", rename_all = "snake_case")]
pub enum StatusReport {
    /// The path has no topics at all.
    NoTopics,
    /// Topics exist but none of them has a task.
    NoTasks,
    /// One block per week that has tasks, ascending.
    Weeks(Vec<WeekBlock<StatusRow>>),
}

/// Per-week checklist of topics and tasks with due dates.
///
/// Topics without tasks still produce one placeholder row. Blocks are in
/// ascending week order regardless of insertion order. An empty result means
/// the path has no topics.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when a week's due date is not a valid calendar date.
pub fn build_checklist(
    topics: &[TopicWithTasks],
    start: NaiveDate,
) -> Result<Vec<WeekBlock<ChecklistRow>>, CoreError> {
    topics_by_week(topics)
        .into_iter()
        .map(|(week, entries)| {
            let due = due_date(start, week)?;
            let mut rows = Vec::new();
            for entry in entries {
                if entry.tasks.is_empty() {
                    rows.push(ChecklistRow {
                        topic_name: entry.topic.name.clone(),
                        first_in_group: true,
                        task_name: None,
                        due_date: due,
                    });
                    continue;
                }
                for (i, task) in entry.tasks.iter().enumerate() {
                    rows.push(ChecklistRow {
                        topic_name: entry.topic.name.clone(),
                        first_in_group: i == 0,
                        task_name: Some(task.name.clone()),
                        due_date: due,
                    });
                }
            }
            Ok(WeekBlock { week, rows })
        })
        .collect()
}

/// Per-week completion status for one user.
///
/// Topics with no tasks are skipped entirely, and so are weeks left empty by that.
#[must_use]
pub fn build_status(topics: &[TopicWithTasks], progress: &[TaskProgress]) -> StatusReport {
    if topics.is_empty() {
        return StatusReport::NoTopics;
    }
    let by_task = progress_index(progress);

    let blocks: Vec<WeekBlock<StatusRow>> = topics_by_week(topics)
        .into_iter()
        .filter_map(|(week, entries)| {
            let rows: Vec<StatusRow> = entries
                .into_iter()
                .flat_map(|entry| {
                    entry.tasks.iter().map(|task| {
                        let record = by_task.get(task.id.as_str());
                        StatusRow {
                            topic_name: entry.topic.name.clone(),
                            task_id: task.id.clone(),
                            task_name: task.name.clone(),
                            completed: record.is_some_and(|p| p.completed),
                            proof_url: record.map(|p| p.proof_url.clone()).unwrap_or_default(),
                        }
                    })
                })
                .collect();
            (!rows.is_empty()).then_some(WeekBlock { week, rows })
        })
        .collect();

    if blocks.is_empty() {
        StatusReport::NoTasks
    } else {
        StatusReport::Weeks(blocks)
    }
}

/// Weeks in `1..=duration_weeks` that still hold at least one task the user
/// has not completed, ascending. Only weeks that have topics are visited.
#[must_use]
pub fn incomplete_weeks(
    duration_weeks: u32,
    topics: &[TopicWithTasks],
    progress: &[TaskProgress],
) -> Vec<u32> {
    let by_task = progress_index(progress);
    let weeks: BTreeSet<u32> = topics
        .iter()
        .filter(|entry| (1..=duration_weeks).contains(&entry.topic.week))
        .filter(|entry| {
            entry.tasks.iter().any(|task| !by_task.get(task.id.as_str()).is_some_and(|p| p.completed))
        })
        .map(|entry| entry.topic.week)
        .collect();
    weeks.into_iter().collect()
}

/// Tasks of `week` the user has not completed, in topic then task order.
#[must_use]
pub fn incomplete_tasks<'a>(
    topics: &'a [TopicWithTasks],
    week: u32,
    progress: &[TaskProgress],
) -> Vec<&'a Task> {
    let by_task = progress_index(progress);
    topics
        .iter()
        .filter(|entry| entry.topic.week == week)
        .flat_map(|entry| entry.tasks.iter())
        .filter(|task| !by_task.get(task.id.as_str()).is_some_and(|p| p.completed))
        .collect()
}

/// Completion flag for each task in `tasks`, in order.
#[must_use]
pub fn completion_flags(tasks: &[Task], progress: &[TaskProgress]) -> Vec<bool> {
    let by_task = progress_index(progress);
    tasks
        .iter()
        .map(|task| by_task.get(task.id.as_str()).is_some_and(|p| p.completed))
        .collect()
}

fn progress_index(progress: &[TaskProgress]) -> HashMap<&str, &TaskProgress> {
    progress.iter().map(|p| (p.task_id.as_str(), p)).collect()
}
