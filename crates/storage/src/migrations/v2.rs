//! Migration v2: append-only usage events, channel memberships, survey responses

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS usage_events (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    function_name TEXT NOT NULL,
    channel_id TEXT,
    path_id TEXT,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_channels (
    user_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    user_name TEXT NOT NULL DEFAULT '',
    joined_at TEXT NOT NULL,
    PRIMARY KEY (user_id, channel_id)
);

CREATE TABLE IF NOT EXISTS satisfaction_responses (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    overall_satisfaction INTEGER NOT NULL,
    ease_of_use INTEGER NOT NULL,
    reliability INTEGER NOT NULL,
    support_satisfaction INTEGER NOT NULL,
    suggestions TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_usage_timestamp ON usage_events(timestamp);
CREATE INDEX IF NOT EXISTS idx_usage_function ON usage_events(function_name);
CREATE INDEX IF NOT EXISTS idx_user_channels_channel ON user_channels(channel_id);
";
