use pathbot_core::ChannelBinding;
use rusqlite::{OptionalExtension, Row, params};

use super::{Result, Storage, get_conn, log_row_error};
use crate::error::StorageError;

const CHANNEL_COLUMNS: &str = "channel_id, channel_name, path_id, path_name, start_date";

fn row_to_binding(row: &Row<'_>) -> rusqlite::Result<ChannelBinding> {
    Ok(ChannelBinding {
        channel_id: row.get(0)?,
        channel_name: row.get(1)?,
        path_id: row.get(2)?,
        path_name: row.get(3)?,
        start_date: row.get(4)?,
    })
}

impl Storage {
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_channel_binding(&self, channel_id: &str) -> Result<Option<ChannelBinding>> {
        let conn = get_conn(&self.pool)?;
        let binding = conn
            .query_row(
                &format!("SELECT {CHANNEL_COLUMNS} FROM channels WHERE channel_id = ?1"),
                params![channel_id],
                row_to_binding,
            )
            .optional()?;
        Ok(binding)
    }

    /// Bind a channel that is not bound yet.
    ///
    /// # Errors
    /// Returns `StorageError::Duplicate` when the channel is already bound.
    pub fn bind_channel(&self, binding: &ChannelBinding) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!("INSERT INTO channels ({CHANNEL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                binding.channel_id,
                binding.channel_name,
                binding.path_id,
                binding.path_name,
                binding.start_date
            ],
        )
        .map_err(|e| match StorageError::from(e) {
            StorageError::Duplicate(_) => {
                StorageError::Duplicate(format!("channel {} is already bound", binding.channel_id))
            },
            other => other,
        })?;
        tracing::info!(channel_id = %binding.channel_id, path_id = %binding.path_id, "Channel bound");
        Ok(())
    }

    /// Replace a channel's binding in one transaction: the old binding is
    /// removed before the new one is written.
    ///
    /// Returns the previous binding, if any.
    ///
    /// # Errors
    /// Returns error if the transaction fails.
    pub fn rebind_channel(&self, binding: &ChannelBinding) -> Result<Option<ChannelBinding>> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let previous = tx
            .query_row(
                &format!("SELECT {CHANNEL_COLUMNS} FROM channels WHERE channel_id = ?1"),
                params![binding.channel_id],
                row_to_binding,
            )
            .optional()?;
        tx.execute("DELETE FROM channels WHERE channel_id = ?1", params![binding.channel_id])?;
        tx.execute(
            &format!("INSERT INTO channels ({CHANNEL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                binding.channel_id,
                binding.channel_name,
                binding.path_id,
                binding.path_name,
                binding.start_date
            ],
        )?;
        tx.commit()?;
        tracing::info!(
            channel_id = %binding.channel_id,
            old_path_id = previous.as_ref().map(|b| b.path_id.as_str()),
            new_path_id = %binding.path_id,
            "Channel rebound"
        );
        Ok(previous)
    }

    /// # Errors
    /// Returns `StorageError::NotFound` if the channel is not bound.
    pub fn update_start_date(&self, channel_id: &str, start_date: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE channels SET start_date = ?1 WHERE channel_id = ?2",
            params![start_date, channel_id],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("channel", channel_id));
        }
        tracing::info!(channel_id, start_date, "Channel start date updated");
        Ok(())
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_channels_for_path(&self, path_id: &str) -> Result<Vec<ChannelBinding>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE path_id = ?1 ORDER BY channel_id"
        ))?;
        let bindings =
            stmt.query_map(params![path_id], row_to_binding)?.filter_map(log_row_error).collect();
        Ok(bindings)
    }
}
