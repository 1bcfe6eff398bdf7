use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use pathbot_core::{
    ChannelBinding, ChecklistRow, Path, StatusReport, SummaryUser, Task, TaskProgress,
    TopicWithTasks, UserSummary, WeekBlock, aggregate_user_summary, build_checklist, build_status,
    completion_flags, current_week, incomplete_tasks, incomplete_weeks, parse_date, validate_text,
};
use pathbot_storage::Store;
use pathbot_storage::traits::{ChannelStore, CurriculumStore, ProgressStore};
use serde::Serialize;

use crate::ServiceError;
use crate::curriculum_service::UNBOUND_CHANNEL;

/// Checklist pages for the path bound to a channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistView {
    pub path: Path,
    pub current_week: u32,
    pub weeks: Vec<WeekBlock<ChecklistRow>>,
}

/// One user's status pages for the path bound to a channel.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub path: Path,
    pub current_week: u32,
    pub report: StatusReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub path: Path,
    pub rows: Vec<UserSummary>,
}

/// One user's completion flag per path task, in path order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProgressRow {
    pub user_id: String,
    pub user_name: String,
    pub completed: Vec<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProgressView {
    pub path: Path,
    pub tasks: Vec<Task>,
    pub rows: Vec<UserProgressRow>,
}

/// Progress views and task completion for learners.
pub struct ProgressService {
    store: Arc<dyn Store>,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Binding and path of a channel. A binding whose path vanished counts as unbound.
    async fn bound_path(&self, channel_id: &str) -> Result<(ChannelBinding, Path), ServiceError> {
        let binding = self
            .store
            .get_channel_binding(channel_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(UNBOUND_CHANNEL))?;
        let path = self
            .store
            .get_path(&binding.path_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Path not found."))?;
        Ok((binding, path))
    }

    /// Week reached by a channel on `as_of`.
    ///
    /// Fails with `ServiceError::InvalidDate` when the stored start date is
    /// malformed; callers offer the correction form.
    pub async fn current_week(&self, channel_id: &str, as_of: NaiveDate) -> Result<u32, ServiceError> {
        let (binding, path) = self.bound_path(channel_id).await?;
        Ok(current_week(parse_date(&binding.start_date)?, path.duration_weeks, as_of))
    }

    pub async fn checklist(
        &self,
        channel_id: &str,
        as_of: NaiveDate,
    ) -> Result<ChecklistView, ServiceError> {
        let (binding, path) = self.bound_path(channel_id).await?;
        let start = parse_date(&binding.start_date)?;
        let topics = self.store.list_topics_with_tasks(&path.id).await?;
        Ok(ChecklistView {
            current_week: current_week(start, path.duration_weeks, as_of),
            weeks: build_checklist(&topics, start)?,
            path,
        })
    }

    pub async fn status(
        &self,
        channel_id: &str,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<StatusView, ServiceError> {
        let (binding, path) = self.bound_path(channel_id).await?;
        let start = parse_date(&binding.start_date)?;
        let topics = self.store.list_topics_with_tasks(&path.id).await?;
        let progress = self.store.list_user_progress(user_id, &path.id).await?;
        Ok(StatusView {
            current_week: current_week(start, path.duration_weeks, as_of),
            report: build_status(&topics, &progress),
            path,
        })
    }

    /// Weeks in which the user still has open tasks.
    pub async fn incomplete_weeks(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(Path, Vec<u32>), ServiceError> {
        let (_, path) = self.bound_path(channel_id).await?;
        let (topics, progress) = self.topics_and_progress(&path.id, user_id).await?;
        let weeks = incomplete_weeks(path.duration_weeks, &topics, &progress);
        Ok((path, weeks))
    }

    /// Open tasks of one week, in topic then task order.
    pub async fn incomplete_tasks(
        &self,
        path_id: &str,
        user_id: &str,
        week: u32,
    ) -> Result<Vec<Task>, ServiceError> {
        let (topics, progress) = self.topics_and_progress(path_id, user_id).await?;
        Ok(incomplete_tasks(&topics, week, &progress).into_iter().cloned().collect())
    }

    async fn topics_and_progress(
        &self,
        path_id: &str,
        user_id: &str,
    ) -> Result<(Vec<TopicWithTasks>, Vec<TaskProgress>), ServiceError> {
        let topics = self.store.list_topics_with_tasks(path_id).await?;
        let progress = self.store.list_user_progress(user_id, path_id).await?;
        Ok((topics, progress))
    }

    /// Mark a task of `path_id` completed with a proof link.
    pub async fn mark_complete(
        &self,
        user_id: &str,
        path_id: &str,
        task_id: &str,
        proof_url: &str,
    ) -> Result<Task, ServiceError> {
        let proof_url = validate_text("proof URL", proof_url)?;
        if proof_url.is_empty() {
            return Err(ServiceError::Validation("proof URL must not be empty".to_owned()));
        }
        let task = self
            .store
            .get_task(task_id)
            .await?
            .filter(|t| t.path_id == path_id)
            .ok_or_else(|| ServiceError::not_found(format!("Task {task_id} not found.")))?;
        self.store
            .upsert_task_progress(&TaskProgress {
                user_id: user_id.to_owned(),
                path_id: path_id.to_owned(),
                task_id: task.id.clone(),
                completed: true,
                proof_url,
                updated_at: Utc::now(),
            })
            .await?;
        tracing::info!(user_id, path_id, task_id, "Task completed");
        Ok(task)
    }

    /// Completed and pending counts for each of `users` on the channel's path.
    pub async fn user_summary(
        &self,
        channel_id: &str,
        users: &[SummaryUser],
    ) -> Result<SummaryView, ServiceError> {
        let (_, path) = self.bound_path(channel_id).await?;
        let topics = self.store.list_topics(&path.id).await?;
        let progress = self.progress_by_user(&path.id, users).await?;
        Ok(SummaryView { rows: aggregate_user_summary(users, &topics, &progress), path })
    }

    /// Completion flag per path task for each of `users`, one row per user.
    pub async fn user_progress(
        &self,
        channel_id: &str,
        users: &[SummaryUser],
    ) -> Result<UserProgressView, ServiceError> {
        let (_, path) = self.bound_path(channel_id).await?;
        let tasks: Vec<Task> = self
            .store
            .list_topics_with_tasks(&path.id)
            .await?
            .into_iter()
            .flat_map(|entry| entry.tasks)
            .collect();
        let mut progress = self.progress_by_user(&path.id, users).await?;
        let rows = users
            .iter()
            .map(|user| UserProgressRow {
                user_id: user.user_id.clone(),
                user_name: user.user_name.clone(),
                completed: completion_flags(
                    &tasks,
                    &progress.remove(&user.user_id).unwrap_or_default(),
                ),
            })
            .collect();
        Ok(UserProgressView { path, tasks, rows })
    }

    async fn progress_by_user(
        &self,
        path_id: &str,
        users: &[SummaryUser],
    ) -> Result<HashMap<String, Vec<TaskProgress>>, ServiceError> {
        let mut by_user = HashMap::with_capacity(users.len());
        for user in users {
            let records = self.store.list_user_progress(&user.user_id, path_id).await?;
            by_user.insert(user.user_id.clone(), records);
        }
        Ok(by_user)
    }
}
