//! Migration v1: curriculum, channel bindings and task progress

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS paths (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    duration_weeks INTEGER NOT NULL CHECK (duration_weeks > 0),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    path_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    week INTEGER NOT NULL,
    task_ids TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    path_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    week INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS channels (
    channel_id TEXT PRIMARY KEY,
    channel_name TEXT NOT NULL DEFAULT '',
    path_id TEXT NOT NULL,
    path_name TEXT NOT NULL,
    start_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_tasks (
    user_id TEXT NOT NULL,
    task_id TEXT NOT NULL,
    path_id TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    proof_url TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, task_id)
);

CREATE INDEX IF NOT EXISTS idx_topics_path_week ON topics(path_id, week);
CREATE INDEX IF NOT EXISTS idx_tasks_path ON tasks(path_id);
CREATE INDEX IF NOT EXISTS idx_channels_path ON channels(path_id);
CREATE INDEX IF NOT EXISTS idx_user_tasks_path ON user_tasks(user_id, path_id);
";
