use pathbot_core::{TimeWindow, UsageEvent};
use rusqlite::{Row, ToSql, params};

use super::{Result, Storage, decode_ts, encode_ts, get_conn, log_row_error};

const EVENT_COLUMNS: &str = "id, user_id, function_name, channel_id, path_id, timestamp";

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<UsageEvent> {
    Ok(UsageEvent {
        id: row.get(0)?,
        user_id: row.get(1)?,
        function_name: row.get(2)?,
        channel_id: row.get(3)?,
        path_id: row.get(4)?,
        timestamp: decode_ts(5, &row.get::<_, String>(5)?)?,
    })
}

impl Storage {
    /// Append one usage event. Events are never overwritten.
    ///
    /// # Errors
    /// Returns `StorageError::Duplicate` if the event id already exists.
    pub fn append_usage_event(&self, event: &UsageEvent) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!("INSERT INTO usage_events ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                event.id,
                event.user_id,
                event.function_name,
                event.channel_id,
                event.path_id,
                encode_ts(event.timestamp)
            ],
        )?;
        Ok(())
    }

    /// Events with `timestamp` inside the inclusive window, oldest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_usage_events(&self, window: &TimeWindow) -> Result<Vec<UsageEvent>> {
        let conn = get_conn(&self.pool)?;
        let start = window.start.map(encode_ts);
        let end = window.end.map(encode_ts);

        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM usage_events WHERE 1 = 1");
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if let Some(start) = &start {
            sql.push_str(" AND timestamp >= ?");
            args.push(start);
        }
        if let Some(end) = &end {
            sql.push_str(" AND timestamp <= ?");
            args.push(end);
        }
        sql.push_str(" ORDER BY timestamp, rowid");

        let mut stmt = conn.prepare(&sql)?;
        let events = stmt.query_map(args.as_slice(), row_to_event)?.filter_map(log_row_error).collect();
        Ok(events)
    }

    /// Every event recorded for one command name.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_usage_by_function(&self, function_name: &str) -> Result<Vec<UsageEvent>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM usage_events WHERE function_name = ?1 ORDER BY timestamp, rowid"
        ))?;
        let events =
            stmt.query_map(params![function_name], row_to_event)?.filter_map(log_row_error).collect();
        Ok(events)
    }
}
