//! Curriculum domain types: paths, weekly topics, tasks and channel bindings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_DURATION_WEEKS, MAX_NAME_LEN, MAX_TEXT_LEN};
use crate::error::CoreError;

/// A curriculum split into `duration_weeks` weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub name: String,
    pub duration_weeks: u32,
    pub created_at: DateTime<Utc>,
}

impl Path {
    #[must_use]
    pub fn new(id: String, name: String, duration_weeks: u32, created_at: DateTime<Utc>) -> Self {
        Self { id, name, duration_weeks, created_at }
    }

    /// Weeks `1..=duration_weeks`, never past [`MAX_DURATION_WEEKS`].
    #[must_use]
    pub fn weeks(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.duration_weeks.clamp(1, MAX_DURATION_WEEKS)
    }

    #[must_use]
    pub fn contains_week(&self, week: u32) -> bool {
        self.weeks().contains(&week)
    }
}

/// A weekly topic. `task_ids` order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub path_id: String,
    pub name: String,
    pub description: String,
    pub week: u32,
    pub task_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub path_id: String,
    pub name: String,
    pub description: String,
    pub week: u32,
}

/// A topic with its task documents resolved, in `task_ids` order.
///
/// Ids that no longer resolve to a task are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicWithTasks {
    pub topic: Topic,
    pub tasks: Vec<Task>,
}

/// Binds one chat room to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    pub channel_id: String,
    pub channel_name: String,
    pub path_id: String,
    pub path_name: String,
    /// Raw `YYYY-MM-DD` text as entered; parsed on use so that a bad value can be corrected.
    pub start_date: String,
}

/// Validated input for creating a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPath {
    pub name: String,
    pub duration_weeks: u32,
}

impl NewPath {
    /// Validate a path name and a textual week count.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidInput` for an empty name or a non-numeric / zero duration.
    pub fn parse(name: &str, duration_weeks: &str) -> Result<Self, CoreError> {
        let name = validate_name("path name", name)?;
        let duration_weeks = parse_duration_weeks(duration_weeks)?;
        Ok(Self { name, duration_weeks })
    }
}

/// Validated input for creating a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub path_id: String,
    pub week: u32,
    pub name: String,
    pub description: String,
}

impl NewTopic {
    /// # Errors
    /// Returns `CoreError::InvalidInput` when the name is empty or the week is outside the path.
    pub fn parse(path: &Path, week: u32, name: &str, description: &str) -> Result<Self, CoreError> {
        if !path.contains_week(week) {
            return Err(CoreError::InvalidInput(format!(
                "week {week} is outside path '{}' (1-{})",
                path.name, path.duration_weeks
            )));
        }
        Ok(Self {
            path_id: path.id.clone(),
            week,
            name: validate_name("topic name", name)?,
            description: validate_text("description", description)?,
        })
    }
}

/// Validated input for creating a task under a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub path_id: String,
    pub topic_id: String,
    pub week: u32,
    pub name: String,
    pub description: String,
}

impl NewTask {
    /// # Errors
    /// Returns `CoreError::InvalidInput` when the name is empty or too long.
    pub fn parse(topic: &Topic, name: &str) -> Result<Self, CoreError> {
        Ok(Self {
            path_id: topic.path_id.clone(),
            topic_id: topic.id.clone(),
            week: topic.week,
            name: validate_name("task name", name)?,
            description: String::new(),
        })
    }
}

/// Parse a week count typed by a user. Digits only, `1..=MAX_DURATION_WEEKS`.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when the value is not a number in range.
pub fn parse_duration_weeks(raw: &str) -> Result<u32, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidInput("Duration must be a number.".to_owned()));
    }
    match trimmed.parse::<u32>() {
        Ok(0) => Err(CoreError::InvalidInput("Duration must be at least 1 week.".to_owned())),
        Ok(weeks) if weeks <= MAX_DURATION_WEEKS => Ok(weeks),
        _ => Err(CoreError::InvalidInput(format!(
            "Duration must be at most {MAX_DURATION_WEEKS} weeks."
        ))),
    }
}

/// Trim and bound a required name field.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when empty after trimming or longer than the limit.
pub fn validate_name(field: &str, raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::InvalidInput(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trim and bound an optional free-text field.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when longer than the limit.
pub fn validate_text(field: &str, raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::InvalidInput(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Validate a channel identifier: a non-empty token without whitespace.
///
/// # Errors
/// Returns `CoreError::InvalidInput` for blank ids or ids containing whitespace.
pub fn validate_channel_id(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidInput(format!("invalid channel id '{raw}'")));
    }
    Ok(trimmed.to_owned())
}

/// Group topics by week in ascending week order, keeping insertion order within a week.
#[must_use]
pub fn topics_by_week(topics: &[TopicWithTasks]) -> Vec<(u32, Vec<&TopicWithTasks>)> {
    let mut grouped: std::collections::BTreeMap<u32, Vec<&TopicWithTasks>> =
        std::collections::BTreeMap::new();
    for entry in topics {
        grouped.entry(entry.topic.week).or_default().push(entry);
    }
    grouped.into_iter().collect()
}

/// Every task id reachable through the path's topics, not deduplicated.
#[must_use]
pub fn path_task_ids(topics: &[Topic]) -> Vec<&str> {
    topics.iter().flat_map(|t| t.task_ids.iter().map(String::as_str)).collect()
}

/// Parse a stored or typed `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `CoreError::InvalidDateFormat` when the text is not a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), crate::constants::DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDateFormat { value: raw.to_owned() })
}
