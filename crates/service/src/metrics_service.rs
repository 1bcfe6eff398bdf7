use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pathbot_core::{MetricsPeriod, MetricsReport, UsageEvent, UsageGrouping};
use pathbot_storage::Store;
use pathbot_storage::traits::{ChannelStore, CurriculumStore, UsageStore};
use serde::Serialize;

use crate::{ReferenceClock, ServiceError};

/// A metrics report plus display names for its group keys.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsView {
    pub report: MetricsReport,
    /// Group key -> channel or path name. Keys without a known name are absent.
    pub labels: BTreeMap<String, String>,
}

/// Command usage log and its rollups.
pub struct MetricsService {
    store: Arc<dyn Store>,
    clock: ReferenceClock,
}

impl MetricsService {
    /// `clock` fixes the timezone of custom start dates.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, clock: ReferenceClock) -> Self {
        Self { store, clock }
    }

    /// Append one usage event. The path is taken from the channel's binding.
    pub async fn record_usage(
        &self,
        user_id: &str,
        function_name: &str,
        channel_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<UsageEvent, ServiceError> {
        let path_id = match channel_id {
            Some(channel_id) => {
                self.store.get_channel_binding(channel_id).await?.map(|b| b.path_id)
            },
            None => None,
        };
        let event = UsageEvent {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            function_name: function_name.to_owned(),
            channel_id: channel_id.map(ToOwned::to_owned),
            path_id,
            timestamp: at,
        };
        self.store.append_usage_event(&event).await?;
        tracing::debug!(user_id, function_name, "Usage recorded");
        Ok(event)
    }

    pub async fn command_metrics(
        &self,
        period: MetricsPeriod,
        grouping: UsageGrouping,
        now: DateTime<Utc>,
    ) -> Result<MetricsView, ServiceError> {
        let window = period.window(now, self.clock.offset());
        let events = self.store.list_usage_events(&window).await?;
        let report = MetricsReport::build(&events, grouping, window);

        let mut labels = BTreeMap::new();
        for key in report.groups.iter().filter_map(|g| g.key.as_deref()) {
            let name = match grouping {
                UsageGrouping::None => None,
                UsageGrouping::Channel => {
                    self.store.get_channel_binding(key).await?.map(|b| b.channel_name)
                },
                UsageGrouping::Path => self.store.get_path(key).await?.map(|p| p.name),
            };
            if let Some(name) = name {
                labels.insert(key.to_owned(), name);
            }
        }
        Ok(MetricsView { report, labels })
    }

    /// Distinct ids of users who ran `function_name`, in first-use order.
    pub async fn function_usage(&self, function_name: &str) -> Result<Vec<String>, ServiceError> {
        let events = self.store.list_usage_by_function(function_name.trim()).await?;
        let mut seen = HashSet::new();
        Ok(events.into_iter().filter_map(|e| seen.insert(e.user_id.clone()).then_some(e.user_id)).collect())
    }
}
