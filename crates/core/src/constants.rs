//! Shared constants for pathbot.

/// Role names treated as administrators when `PATHBOT_ADMIN_ROLES` is unset.
pub const DEFAULT_ADMIN_ROLES: &[&str] = &["admin", "administrator"];

/// Label shown in a checklist row for a topic that has no tasks yet.
pub const NO_TASKS_LABEL: &str = "No tasks";

/// Calendar date format used for start dates, due dates and metric windows.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days per curriculum week.
pub const DAYS_PER_WEEK: i64 = 7;

/// Longest accepted path, ten years of weeks.
pub const MAX_DURATION_WEEKS: u32 = 520;

/// Maximum accepted length of submitted source code.
pub const MAX_SOURCE_LEN: usize = 4000;

/// Inclusive bounds of numeric satisfaction scores.
pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 10;

/// Maximum length of names (paths, topics, tasks).
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of free-text fields (descriptions, suggestions, proof URLs).
pub const MAX_TEXT_LEN: usize = 1000;
