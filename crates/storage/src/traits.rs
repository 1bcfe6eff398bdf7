//! Async domain traits for the curriculum store.
//!
//! Services depend on these traits; `Storage` implements them by running its
//! synchronous methods on the blocking pool.

use async_trait::async_trait;
use pathbot_core::{
    ChannelBinding, ChannelMember, NewPath, NewTask, NewTopic, Path, SatisfactionResponse, Task,
    TaskProgress, TimeWindow, Topic, TopicWithTasks, UsageEvent,
};

use crate::error::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

/// Paths, topics and tasks.
#[async_trait]
pub trait CurriculumStore: Send + Sync {
    async fn create_path(&self, input: &NewPath) -> Result<Path>;

    async fn get_path(&self, id: &str) -> Result<Option<Path>>;

    async fn list_paths(&self) -> Result<Vec<Path>>;

    /// Delete a path with its topics, tasks, progress and channel bindings, atomically.
    async fn delete_path_cascade(&self, path_id: &str) -> Result<()>;

    async fn create_topic(&self, input: &NewTopic) -> Result<Topic>;

    async fn get_topic(&self, id: &str) -> Result<Option<Topic>>;

    /// Topics of a path ordered by week, then insertion.
    async fn list_topics(&self, path_id: &str) -> Result<Vec<Topic>>;

    async fn list_topics_for_week(&self, path_id: &str, week: u32) -> Result<Vec<Topic>>;

    /// Topics with their tasks resolved in display order.
    async fn list_topics_with_tasks(&self, path_id: &str) -> Result<Vec<TopicWithTasks>>;

    /// Delete a topic and the tasks it references, atomically.
    async fn delete_topic_cascade(&self, topic_id: &str) -> Result<Topic>;

    /// Create a task and append it to its topic, atomically.
    async fn create_task(&self, input: &NewTask) -> Result<Task>;

    async fn get_task(&self, id: &str) -> Result<Option<Task>>;

    async fn get_tasks(&self, ids: &[String]) -> Result<Vec<Task>>;

    /// Delete a task and remove it from its owning topic, atomically.
    async fn delete_task(&self, task_id: &str) -> Result<Task>;
}

/// Channel to path bindings.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn get_channel_binding(&self, channel_id: &str) -> Result<Option<ChannelBinding>>;

    /// Fails with `StorageError::Duplicate` when the channel is already bound.
    async fn bind_channel(&self, binding: &ChannelBinding) -> Result<()>;

    /// Replace an existing binding. Returns the previous one.
    async fn rebind_channel(&self, binding: &ChannelBinding) -> Result<Option<ChannelBinding>>;

    async fn update_start_date(&self, channel_id: &str, start_date: &str) -> Result<()>;

    async fn list_channels_for_path(&self, path_id: &str) -> Result<Vec<ChannelBinding>>;
}

/// Per-user task completion.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn upsert_task_progress(&self, progress: &TaskProgress) -> Result<()>;

    async fn list_user_progress(&self, user_id: &str, path_id: &str) -> Result<Vec<TaskProgress>>;
}

/// Channel memberships.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn add_user_channel(&self, user_id: &str, user_name: &str, channel_id: &str)
    -> Result<bool>;

    async fn list_channel_users(&self, channel_id: &str) -> Result<Vec<ChannelMember>>;
}

/// Append-only command usage log.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn append_usage_event(&self, event: &UsageEvent) -> Result<()>;

    async fn list_usage_events(&self, window: &TimeWindow) -> Result<Vec<UsageEvent>>;

    async fn list_usage_by_function(&self, function_name: &str) -> Result<Vec<UsageEvent>>;
}

/// Satisfaction survey responses.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn save_satisfaction_response(&self, response: &SatisfactionResponse) -> Result<()>;

    async fn get_satisfaction_response(&self, id: &str) -> Result<Option<SatisfactionResponse>>;
}

/// Every store the services need, usable as `Arc<dyn Store>`.
pub trait Store:
    CurriculumStore + ChannelStore + ProgressStore + MemberStore + UsageStore + SurveyStore
{
}

impl<T> Store for T where
    T: CurriculumStore + ChannelStore + ProgressStore + MemberStore + UsageStore + SurveyStore
{
}
