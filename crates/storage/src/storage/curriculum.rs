use std::collections::HashMap;

use chrono::Utc;
use pathbot_core::{NewPath, NewTask, NewTopic, Path, Task, Topic, TopicWithTasks};
use rusqlite::{OptionalExtension, Row, Transaction, params};

use super::{Result, Storage, decode_ts, encode_ts, get_conn, log_row_error, new_id, parse_json};
use crate::error::StorageError;

const PATH_COLUMNS: &str = "id, name, duration_weeks, created_at";
const TOPIC_COLUMNS: &str = "id, path_id, name, description, week, task_ids";
const TASK_COLUMNS: &str = "id, path_id, name, description, week";

fn row_to_path(row: &Row<'_>) -> rusqlite::Result<Path> {
    Ok(Path {
        id: row.get(0)?,
        name: row.get(1)?,
        duration_weeks: row.get::<_, i64>(2)? as u32,
        created_at: decode_ts(3, &row.get::<_, String>(3)?)?,
    })
}

fn row_to_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        path_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        week: row.get::<_, i64>(4)? as u32,
        task_ids: parse_json(5, &row.get::<_, String>(5)?)?,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        path_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        week: row.get::<_, i64>(4)? as u32,
    })
}

fn topic_in_tx(tx: &Transaction<'_>, topic_id: &str) -> Result<Topic> {
    tx.query_row(
        &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?1"),
        params![topic_id],
        row_to_topic,
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("topic", topic_id))
}

/// Delete tasks of `path_id` listed in `task_ids`, along with their progress records.
fn delete_tasks_in_tx(tx: &Transaction<'_>, path_id: &str, task_ids: &[String]) -> Result<usize> {
    let mut deleted = 0;
    for task_id in task_ids {
        tx.execute("DELETE FROM user_tasks WHERE task_id = ?1", params![task_id])?;
        deleted += tx.execute(
            "DELETE FROM tasks WHERE id = ?1 AND path_id = ?2",
            params![task_id, path_id],
        )?;
    }
    Ok(deleted)
}

impl Storage {
    // ── Paths ───────────────────────────────────────────────────

    /// Create a path with a generated id.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_path(&self, input: &NewPath) -> Result<Path> {
        let conn = get_conn(&self.pool)?;
        let path = Path::new(new_id(), input.name.clone(), input.duration_weeks, Utc::now());
        conn.execute(
            "INSERT INTO paths (id, name, duration_weeks, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                path.id,
                path.name,
                i64::from(path.duration_weeks),
                encode_ts(path.created_at)
            ],
        )?;
        tracing::info!(path_id = %path.id, name = %path.name, weeks = path.duration_weeks, "Path created");
        Ok(path)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_path(&self, id: &str) -> Result<Option<Path>> {
        let conn = get_conn(&self.pool)?;
        let path = conn
            .query_row(
                &format!("SELECT {PATH_COLUMNS} FROM paths WHERE id = ?1"),
                params![id],
                row_to_path,
            )
            .optional()?;
        Ok(path)
    }

    /// All paths, oldest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_paths(&self) -> Result<Vec<Path>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {PATH_COLUMNS} FROM paths ORDER BY created_at, rowid"))?;
        let paths = stmt.query_map([], row_to_path)?.filter_map(log_row_error).collect();
        Ok(paths)
    }

    /// Delete a path with its topics, tasks, progress records and channel bindings.
    ///
    /// Runs in one transaction; a failure leaves nothing half-deleted.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the path does not exist.
    pub fn delete_path_cascade(&self, path_id: &str) -> Result<()> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;

        let exists: Option<String> = tx
            .query_row("SELECT id FROM paths WHERE id = ?1", params![path_id], |row| row.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::not_found("path", path_id));
        }

        let topics: Vec<Topic> = {
            let mut stmt =
                tx.prepare(&format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE path_id = ?1"))?;
            stmt.query_map(params![path_id], row_to_topic)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let referenced: Vec<String> =
            topics.iter().flat_map(|t| t.task_ids.iter().cloned()).collect();
        let mut tasks = delete_tasks_in_tx(&tx, path_id, &referenced)?;
        tx.execute("DELETE FROM user_tasks WHERE path_id = ?1", params![path_id])?;
        tasks += tx.execute("DELETE FROM tasks WHERE path_id = ?1", params![path_id])?;
        let topic_count = tx.execute("DELETE FROM topics WHERE path_id = ?1", params![path_id])?;
        let channels = tx.execute("DELETE FROM channels WHERE path_id = ?1", params![path_id])?;
        tx.execute("DELETE FROM paths WHERE id = ?1", params![path_id])?;
        tx.commit()?;

        tracing::info!(
            path_id,
            topics = topic_count,
            tasks,
            channels,
            "Path deleted with its curriculum"
        );
        Ok(())
    }

    // ── Topics ──────────────────────────────────────────────────

    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_topic(&self, input: &NewTopic) -> Result<Topic> {
        let conn = get_conn(&self.pool)?;
        let topic = Topic {
            id: new_id(),
            path_id: input.path_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            week: input.week,
            task_ids: Vec::new(),
        };
        conn.execute(
            "INSERT INTO topics (id, path_id, name, description, week, task_ids, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6)",
            params![
                topic.id,
                topic.path_id,
                topic.name,
                topic.description,
                i64::from(topic.week),
                encode_ts(Utc::now())
            ],
        )?;
        tracing::info!(topic_id = %topic.id, path_id = %topic.path_id, week = topic.week, "Topic created");
        Ok(topic)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_topic(&self, id: &str) -> Result<Option<Topic>> {
        let conn = get_conn(&self.pool)?;
        let topic = conn
            .query_row(
                &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?1"),
                params![id],
                row_to_topic,
            )
            .optional()?;
        Ok(topic)
    }

    /// Topics of a path ordered by week, then insertion.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_topics(&self, path_id: &str) -> Result<Vec<Topic>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE path_id = ?1 ORDER BY week, created_at, rowid"
        ))?;
        let topics = stmt.query_map(params![path_id], row_to_topic)?.filter_map(log_row_error).collect();
        Ok(topics)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_topics_for_week(&self, path_id: &str, week: u32) -> Result<Vec<Topic>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE path_id = ?1 AND week = ?2
             ORDER BY created_at, rowid"
        ))?;
        let topics = stmt
            .query_map(params![path_id, i64::from(week)], row_to_topic)?
            .filter_map(log_row_error)
            .collect();
        Ok(topics)
    }

    /// Topics of a path with their task records resolved in `task_ids` order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_topics_with_tasks(&self, path_id: &str) -> Result<Vec<TopicWithTasks>> {
        let topics = self.list_topics(path_id)?;
        let ids: Vec<String> = topics.iter().flat_map(|t| t.task_ids.iter().cloned()).collect();
        let by_id: HashMap<String, Task> =
            self.get_tasks(&ids)?.into_iter().map(|t| (t.id.clone(), t)).collect();

        Ok(topics
            .into_iter()
            .map(|topic| {
                let tasks = topic.task_ids.iter().filter_map(|id| by_id.get(id).cloned()).collect();
                TopicWithTasks { topic, tasks }
            })
            .collect())
    }

    /// Delete a topic and every task it references, with their progress records.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the topic does not exist.
    pub fn delete_topic_cascade(&self, topic_id: &str) -> Result<Topic> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let topic = topic_in_tx(&tx, topic_id)?;
        let tasks = delete_tasks_in_tx(&tx, &topic.path_id, &topic.task_ids)?;
        tx.execute("DELETE FROM topics WHERE id = ?1", params![topic_id])?;
        tx.commit()?;
        tracing::info!(topic_id, tasks, "Topic deleted with its tasks");
        Ok(topic)
    }

    // ── Tasks ───────────────────────────────────────────────────

    /// Create a task and append its id to the owning topic's `task_ids`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the topic does not exist.
    pub fn create_task(&self, input: &NewTask) -> Result<Task> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let mut topic = topic_in_tx(&tx, &input.topic_id)?;

        let task = Task {
            id: new_id(),
            path_id: input.path_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            week: input.week,
        };
        tx.execute(
            "INSERT INTO tasks (id, path_id, topic_id, name, description, week)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id,
                task.path_id,
                topic.id,
                task.name,
                task.description,
                i64::from(task.week)
            ],
        )?;
        topic.task_ids.push(task.id.clone());
        tx.execute(
            "UPDATE topics SET task_ids = ?1 WHERE id = ?2",
            params![serde_json::to_string(&topic.task_ids)?, topic.id],
        )?;
        tx.commit()?;

        tracing::info!(task_id = %task.id, topic_id = %topic.id, "Task created");
        Ok(task)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = get_conn(&self.pool)?;
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Tasks for `ids`, in the order given. Unknown ids are skipped.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_tasks(&self, ids: &[String]) -> Result<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(task) = stmt.query_row(params![id], row_to_task).optional()? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Delete a task, remove its id from the owning topic and drop its progress records.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the task does not exist.
    pub fn delete_task(&self, task_id: &str) -> Result<Task> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;

        let found: Option<(Task, String)> = tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS}, topic_id FROM tasks WHERE id = ?1"),
                params![task_id],
                |row| Ok((row_to_task(row)?, row.get(5)?)),
            )
            .optional()?;
        let Some((task, topic_id)) = found else {
            return Err(StorageError::not_found("task", task_id));
        };

        match topic_in_tx(&tx, &topic_id) {
            Ok(mut topic) => {
                topic.task_ids.retain(|id| id != task_id);
                tx.execute(
                    "UPDATE topics SET task_ids = ?1 WHERE id = ?2",
                    params![serde_json::to_string(&topic.task_ids)?, topic.id],
                )?;
            },
            Err(StorageError::NotFound { .. }) => {
                tracing::warn!(task_id, topic_id = %topic_id, "Owning topic missing while deleting task");
            },
            Err(e) => return Err(e),
        }
        tx.execute("DELETE FROM user_tasks WHERE task_id = ?1", params![task_id])?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        tx.commit()?;

        tracing::info!(task_id, topic_id = %topic_id, "Task deleted");
        Ok(task)
    }
}
