use pathbot_core::TaskProgress;
use rusqlite::params;

use super::{Result, Storage, decode_ts, encode_ts, get_conn, log_row_error};

impl Storage {
    /// Insert or overwrite the record for `(user_id, task_id)`. Last write wins.
    ///
    /// # Errors
    /// Returns error if database upsert fails.
    pub fn upsert_task_progress(&self, progress: &TaskProgress) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO user_tasks (user_id, task_id, path_id, completed, proof_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id, task_id) DO UPDATE SET
                path_id = excluded.path_id,
                completed = excluded.completed,
                proof_url = excluded.proof_url,
                updated_at = excluded.updated_at",
            params![
                progress.user_id,
                progress.task_id,
                progress.path_id,
                progress.completed,
                progress.proof_url,
                encode_ts(progress.updated_at)
            ],
        )?;
        tracing::debug!(
            user_id = %progress.user_id,
            task_id = %progress.task_id,
            completed = progress.completed,
            "Task progress saved"
        );
        Ok(())
    }

    /// Progress records of one user on one path.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_user_progress(&self, user_id: &str, path_id: &str) -> Result<Vec<TaskProgress>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT user_id, path_id, task_id, completed, proof_url, updated_at
             FROM user_tasks WHERE user_id = ?1 AND path_id = ?2 ORDER BY updated_at",
        )?;
        let records = stmt
            .query_map(params![user_id, path_id], |row| {
                Ok(TaskProgress {
                    user_id: row.get(0)?,
                    path_id: row.get(1)?,
                    task_id: row.get(2)?,
                    completed: row.get(3)?,
                    proof_url: row.get(4)?,
                    updated_at: decode_ts(5, &row.get::<_, String>(5)?)?,
                })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(records)
    }
}
