use chrono::Utc;
use pathbot_core::ChannelMember;
use rusqlite::params;

use super::{Result, Storage, decode_ts, encode_ts, get_conn, log_row_error};

impl Storage {
    /// Record a user as a member of a channel. Returns `false` if already recorded.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn add_user_channel(&self, user_id: &str, user_name: &str, channel_id: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_channels (user_id, channel_id, user_name, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, channel_id, user_name, encode_ts(Utc::now())],
        )?;
        if inserted == 0 {
            conn.execute(
                "UPDATE user_channels SET user_name = ?1 WHERE user_id = ?2 AND channel_id = ?3",
                params![user_name, user_id, channel_id],
            )?;
        }
        Ok(inserted > 0)
    }

    /// Members recorded in a channel, in join order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_channel_users(&self, channel_id: &str) -> Result<Vec<ChannelMember>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT user_id, user_name, channel_id, joined_at FROM user_channels
             WHERE channel_id = ?1 ORDER BY joined_at, rowid",
        )?;
        let members = stmt
            .query_map(params![channel_id], |row| {
                Ok(ChannelMember {
                    user_id: row.get(0)?,
                    user_name: row.get(1)?,
                    channel_id: row.get(2)?,
                    joined_at: decode_ts(3, &row.get::<_, String>(3)?)?,
                })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(members)
    }
}
