use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{TimeWindow, UsageEvent};
use crate::error::CoreError;

/// Command name -> invocation count, ordered by command name.
pub type CommandCounts = BTreeMap<String, u64>;

/// How metrics are grouped before counting commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageGrouping {
    /// Global per-command counts.
    #[default]
    None,
    Channel,
    Path,
}

impl UsageGrouping {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Channel => "channels",
            Self::Path => "paths",
        }
    }

    fn key(self, event: &UsageEvent) -> Option<String> {
        match self {
            Self::None => None,
            Self::Channel => event.channel_id.clone(),
            Self::Path => event.path_id.clone(),
        }
    }
}

impl FromStr for UsageGrouping {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "all" => Ok(Self::None),
            "channel" | "channels" => Ok(Self::Channel),
            "path" | "paths" => Ok(Self::Path),
            other => Err(CoreError::InvalidInput(format!(
                "unknown metric type '{other}', expected channels or paths"
            ))),
        }
    }
}

/// Count events per key and command, keeping only events inside `window`.
///
/// Events for which `key_fn` returns `None` are grouped under the `None` key.
pub fn aggregate_by_key<F>(
    events: &[UsageEvent],
    key_fn: F,
    window: &TimeWindow,
) -> BTreeMap<Option<String>, CommandCounts>
where
    F: Fn(&UsageEvent) -> Option<String>,
{
    let mut grouped: BTreeMap<Option<String>, CommandCounts> = BTreeMap::new();
    for event in events.iter().filter(|e| window.contains(e.timestamp)) {
        *grouped
            .entry(key_fn(event))
            .or_default()
            .entry(event.function_name.clone())
            .or_insert(0) += 1;
    }
    grouped
}

/// Counts for one group (channel, path, or everything).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsGroup {
    /// Channel or path id; `None` for the ungrouped report or events without that key.
    pub key: Option<String>,
    pub commands: CommandCounts,
    pub subtotal: u64,
}

/// Per-command counts with per-group subtotals and a grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub grouping: UsageGrouping,
    pub window: TimeWindow,
    pub groups: Vec<MetricsGroup>,
    pub total: u64,
}

impl MetricsReport {
    /// Aggregate `events` under `grouping`, filtered to `window`.
    #[must_use]
    pub fn build(events: &[UsageEvent], grouping: UsageGrouping, window: TimeWindow) -> Self {
        let groups: Vec<MetricsGroup> =
            aggregate_by_key(events, |e| grouping.key(e), &window)
                .into_iter()
                .map(|(key, commands)| {
                    let subtotal = commands.values().sum();
                    MetricsGroup { key, commands, subtotal }
                })
                .collect();
        let total = groups.iter().map(|g| g.subtotal).sum();
        Self { grouping, window, groups, total }
    }

    /// Per-command counts summed over every group.
    #[must_use]
    pub fn command_counts(&self) -> CommandCounts {
        let mut merged = CommandCounts::new();
        for group in &self.groups {
            for (command, count) in &group.commands {
                *merged.entry(command.clone()).or_insert(0) += count;
            }
        }
        merged
    }
}
