//! Async trait implementations for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use pathbot_core::{
    ChannelBinding, ChannelMember, NewPath, NewTask, NewTopic, Path, SatisfactionResponse, Task,
    TaskProgress, TimeWindow, Topic, TopicWithTasks, UsageEvent,
};

use crate::Storage;
use crate::error::StorageError;
use crate::traits::{
    ChannelStore, CurriculumStore, MemberStore, ProgressStore, SurveyStore, UsageStore,
};

type Result<T> = std::result::Result<T, StorageError>;

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Blocking(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`: `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`: `.to_owned()` a `&str`, pass as `&arg`
/// - `@slice arg`: `.to_vec()` a `&[T]`, pass as `&arg`
/// - `@val arg`: move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@capture slice $arg:ident) => { let $arg = $arg.to_vec(); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
    (@pass slice $arg:ident) => { &$arg };
    (@pass val $arg:ident) => { $arg };
}

// ── CurriculumStore ──────────────────────────────────────────────

#[async_trait]
impl CurriculumStore for Storage {
    async fn create_path(&self, input: &NewPath) -> Result<Path> {
        delegate!(self, create_path, @ref input)
    }
    async fn get_path(&self, id: &str) -> Result<Option<Path>> {
        delegate!(self, get_path, @str id)
    }
    async fn list_paths(&self) -> Result<Vec<Path>> {
        delegate!(self, list_paths)
    }
    async fn delete_path_cascade(&self, path_id: &str) -> Result<()> {
        delegate!(self, delete_path_cascade, @str path_id)
    }
    async fn create_topic(&self, input: &NewTopic) -> Result<Topic> {
        delegate!(self, create_topic, @ref input)
    }
    async fn get_topic(&self, id: &str) -> Result<Option<Topic>> {
        delegate!(self, get_topic, @str id)
    }
    async fn list_topics(&self, path_id: &str) -> Result<Vec<Topic>> {
        delegate!(self, list_topics, @str path_id)
    }
    async fn list_topics_for_week(&self, path_id: &str, week: u32) -> Result<Vec<Topic>> {
        delegate!(self, list_topics_for_week, @str path_id, @val week)
    }
    async fn list_topics_with_tasks(&self, path_id: &str) -> Result<Vec<TopicWithTasks>> {
        delegate!(self, list_topics_with_tasks, @str path_id)
    }
    async fn delete_topic_cascade(&self, topic_id: &str) -> Result<Topic> {
        delegate!(self, delete_topic_cascade, @str topic_id)
    }
    async fn create_task(&self, input: &NewTask) -> Result<Task> {
        delegate!(self, create_task, @ref input)
    }
    async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        delegate!(self, get_task, @str id)
    }
    async fn get_tasks(&self, ids: &[String]) -> Result<Vec<Task>> {
        delegate!(self, get_tasks, @slice ids)
    }
    async fn delete_task(&self, task_id: &str) -> Result<Task> {
        delegate!(self, delete_task, @str task_id)
    }
}

// ── ChannelStore ─────────────────────────────────────────────────

#[async_trait]
impl ChannelStore for Storage {
    async fn get_channel_binding(&self, channel_id: &str) -> Result<Option<ChannelBinding>> {
        delegate!(self, get_channel_binding, @str channel_id)
    }
    async fn bind_channel(&self, binding: &ChannelBinding) -> Result<()> {
        delegate!(self, bind_channel, @ref binding)
    }
    async fn rebind_channel(&self, binding: &ChannelBinding) -> Result<Option<ChannelBinding>> {
        delegate!(self, rebind_channel, @ref binding)
    }
    async fn update_start_date(&self, channel_id: &str, start_date: &str) -> Result<()> {
        delegate!(self, update_start_date, @str channel_id, @str start_date)
    }
    async fn list_channels_for_path(&self, path_id: &str) -> Result<Vec<ChannelBinding>> {
        delegate!(self, list_channels_for_path, @str path_id)
    }
}

// ── ProgressStore ────────────────────────────────────────────────

#[async_trait]
impl ProgressStore for Storage {
    async fn upsert_task_progress(&self, progress: &TaskProgress) -> Result<()> {
        delegate!(self, upsert_task_progress, @ref progress)
    }
    async fn list_user_progress(&self, user_id: &str, path_id: &str) -> Result<Vec<TaskProgress>> {
        delegate!(self, list_user_progress, @str user_id, @str path_id)
    }
}

// ── MemberStore ──────────────────────────────────────────────────

#[async_trait]
impl MemberStore for Storage {
    async fn add_user_channel(
        &self,
        user_id: &str,
        user_name: &str,
        channel_id: &str,
    ) -> Result<bool> {
        delegate!(self, add_user_channel, @str user_id, @str user_name, @str channel_id)
    }
    async fn list_channel_users(&self, channel_id: &str) -> Result<Vec<ChannelMember>> {
        delegate!(self, list_channel_users, @str channel_id)
    }
}

// ── UsageStore ───────────────────────────────────────────────────

#[async_trait]
impl UsageStore for Storage {
    async fn append_usage_event(&self, event: &UsageEvent) -> Result<()> {
        delegate!(self, append_usage_event, @ref event)
    }
    async fn list_usage_events(&self, window: &TimeWindow) -> Result<Vec<UsageEvent>> {
        delegate!(self, list_usage_events, @ref window)
    }
    async fn list_usage_by_function(&self, function_name: &str) -> Result<Vec<UsageEvent>> {
        delegate!(self, list_usage_by_function, @str function_name)
    }
}

// ── SurveyStore ──────────────────────────────────────────────────

#[async_trait]
impl SurveyStore for Storage {
    async fn save_satisfaction_response(&self, response: &SatisfactionResponse) -> Result<()> {
        delegate!(self, save_satisfaction_response, @ref response)
    }
    async fn get_satisfaction_response(&self, id: &str) -> Result<Option<SatisfactionResponse>> {
        delegate!(self, get_satisfaction_response, @str id)
    }
}
