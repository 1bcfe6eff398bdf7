use std::sync::Arc;

use pathbot_core::{
    ChannelBinding, NewPath, NewTask, NewTopic, Path, Task, Topic, parse_date, validate_channel_id,
    validate_name,
};
use pathbot_storage::Store;
use pathbot_storage::traits::{ChannelStore, CurriculumStore};
use serde::Serialize;

use crate::ServiceError;

/// Reply when a command needs a bound channel and this one is not.
pub const UNBOUND_CHANNEL: &str = "This channel is not associated with any path.";

/// Result of a link request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    Linked { binding: ChannelBinding },
    /// The channel is bound already; rebinding needs an explicit confirmation.
    NeedsConfirmation { current: ChannelBinding, requested: ChannelBinding },
}

/// Admin CRUD over paths, topics, tasks and channel bindings.
pub struct CurriculumService {
    store: Arc<dyn Store>,
}

impl CurriculumService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add_path(&self, name: &str, duration_weeks: &str) -> Result<Path, ServiceError> {
        let input = NewPath::parse(name, duration_weeks)?;
        let path = self.store.create_path(&input).await?;
        tracing::info!(path_id = %path.id, name = %path.name, weeks = path.duration_weeks, "Path added");
        Ok(path)
    }

    pub async fn list_paths(&self) -> Result<Vec<Path>, ServiceError> {
        Ok(self.store.list_paths().await?)
    }

    pub async fn get_path(&self, path_id: &str) -> Result<Path, ServiceError> {
        self.store
            .get_path(path_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Path {path_id} not found.")))
    }

    /// Bind `channel_id` to a path, or report the current binding when there is one.
    pub async fn link_channel(
        &self,
        path_id: &str,
        channel_id: &str,
        channel_name: Option<&str>,
        start_date: &str,
    ) -> Result<LinkOutcome, ServiceError> {
        let requested = self.binding_request(path_id, channel_id, channel_name, start_date).await?;
        if let Some(current) = self.store.get_channel_binding(&requested.channel_id).await? {
            tracing::debug!(
                channel_id = %requested.channel_id,
                current_path = %current.path_id,
                "Channel already bound, asking for confirmation"
            );
            return Ok(LinkOutcome::NeedsConfirmation { current, requested });
        }
        self.store.bind_channel(&requested).await?;
        Ok(LinkOutcome::Linked { binding: requested })
    }

    /// Replace a binding after the admin confirmed. Returns the previous binding.
    pub async fn confirm_relink(
        &self,
        requested: &ChannelBinding,
    ) -> Result<Option<ChannelBinding>, ServiceError> {
        // The path may have been deleted while the confirmation was pending.
        self.get_path(&requested.path_id).await?;
        let previous = self.store.rebind_channel(requested).await?;
        tracing::info!(
            channel_id = %requested.channel_id,
            path_id = %requested.path_id,
            previous_path = previous.as_ref().map(|b| b.path_id.as_str()).unwrap_or("-"),
            "Channel rebound"
        );
        Ok(previous)
    }

    async fn binding_request(
        &self,
        path_id: &str,
        channel_id: &str,
        channel_name: Option<&str>,
        start_date: &str,
    ) -> Result<ChannelBinding, ServiceError> {
        let channel_id = validate_channel_id(channel_id)?;
        let start = parse_date(start_date)?;
        let path = self.get_path(path_id).await?;
        let channel_name = channel_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| channel_id.clone(), ToOwned::to_owned);
        Ok(ChannelBinding {
            channel_id,
            channel_name,
            path_id: path.id,
            path_name: path.name,
            start_date: start.format(pathbot_core::constants::DATE_FORMAT).to_string(),
        })
    }

    pub async fn binding_for_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelBinding>, ServiceError> {
        Ok(self.store.get_channel_binding(channel_id).await?)
    }

    /// The channel's binding, or `NotFound` with the user-facing message.
    pub async fn require_binding(&self, channel_id: &str) -> Result<ChannelBinding, ServiceError> {
        self.binding_for_channel(channel_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(UNBOUND_CHANNEL))
    }

    /// Store a corrected start date for a channel. Returns the normalised date.
    pub async fn correct_start_date(
        &self,
        channel_id: &str,
        start_date: &str,
    ) -> Result<String, ServiceError> {
        let normalised = parse_date(start_date)?.format(pathbot_core::constants::DATE_FORMAT).to_string();
        self.store.update_start_date(channel_id, &normalised).await?;
        tracing::info!(channel_id, start_date = %normalised, "Start date corrected");
        Ok(normalised)
    }

    pub async fn add_topic(
        &self,
        path_id: &str,
        week: u32,
        name: &str,
        description: &str,
    ) -> Result<Topic, ServiceError> {
        let path = self.get_path(path_id).await?;
        let input = NewTopic::parse(&path, week, name, description)?;
        let topic = self.store.create_topic(&input).await?;
        tracing::info!(path_id, topic_id = %topic.id, week, "Topic added");
        Ok(topic)
    }

    pub async fn get_topic(&self, topic_id: &str) -> Result<Topic, ServiceError> {
        self.store
            .get_topic(topic_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Topic {topic_id} not found.")))
    }

    /// A topic that must belong to `path_id`.
    pub async fn topic_in_path(&self, path_id: &str, topic_id: &str) -> Result<Topic, ServiceError> {
        let topic = self.get_topic(topic_id).await?;
        if topic.path_id != path_id {
            tracing::warn!(path_id, topic_id, "Topic selected outside its path");
            return Err(ServiceError::Validation(format!(
                "Topic {topic_id} does not belong to the selected path."
            )));
        }
        Ok(topic)
    }

    /// A task that must be listed under `topic`.
    pub async fn task_in_topic(&self, topic: &Topic, task_id: &str) -> Result<Task, ServiceError> {
        if !topic.task_ids.iter().any(|id| id == task_id) {
            tracing::warn!(topic_id = %topic.id, task_id, "Task selected outside its topic");
            return Err(ServiceError::Validation(format!(
                "Task {task_id} does not belong to the selected topic."
            )));
        }
        self.get_task(task_id).await
    }

    pub async fn list_topics(&self, path_id: &str) -> Result<Vec<Topic>, ServiceError> {
        self.get_path(path_id).await?;
        Ok(self.store.list_topics(path_id).await?)
    }

    /// Topics of one path in one week.
    pub async fn topics_for_week(&self, path_id: &str, week: u32) -> Result<Vec<Topic>, ServiceError> {
        Ok(self.store.list_topics_for_week(path_id, week).await?)
    }

    pub async fn add_task(&self, topic_id: &str, name: &str) -> Result<Task, ServiceError> {
        let topic = self.get_topic(topic_id).await?;
        let input = NewTask::parse(&topic, name)?;
        let task = self.store.create_task(&input).await?;
        tracing::info!(topic_id, task_id = %task.id, "Task added");
        Ok(task)
    }

    /// Tasks of a topic in display order.
    pub async fn list_tasks(&self, topic_id: &str) -> Result<Vec<Task>, ServiceError> {
        let topic = self.get_topic(topic_id).await?;
        Ok(self.store.get_tasks(&topic.task_ids).await?)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, ServiceError> {
        self.store
            .get_task(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Task {task_id} not found.")))
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<Task, ServiceError> {
        let task = self.store.delete_task(task_id).await?;
        tracing::info!(task_id, "Task deleted");
        Ok(task)
    }

    pub async fn delete_topic(&self, topic_id: &str) -> Result<Topic, ServiceError> {
        let topic = self.store.delete_topic_cascade(topic_id).await?;
        tracing::info!(topic_id, tasks = topic.task_ids.len(), "Topic deleted");
        Ok(topic)
    }

    pub async fn delete_path(&self, path_id: &str) -> Result<Path, ServiceError> {
        let path = self.get_path(path_id).await?;
        self.store.delete_path_cascade(path_id).await?;
        tracing::info!(path_id, "Path deleted");
        Ok(path)
    }

    /// Display name for a path id, used by reports that only carry ids.
    pub async fn path_name(&self, path_id: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.store.get_path(path_id).await?.map(|p| p.name))
    }

    /// Channel name as stored with its binding.
    pub async fn channel_name(&self, channel_id: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.store.get_channel_binding(channel_id).await?.map(|b| b.channel_name))
    }
}

/// Parse a week chosen from a menu.
///
/// # Errors
/// Returns `ServiceError::Validation` when the value is not a week number.
pub fn parse_week(raw: &str) -> Result<u32, ServiceError> {
    let raw = validate_name("week", raw)?;
    raw.parse::<u32>()
        .ok()
        .filter(|w| *w >= 1)
        .ok_or_else(|| ServiceError::Validation(format!("'{raw}' is not a week number")))
}
