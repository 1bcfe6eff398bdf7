use anyhow::Result;
use pathbot_core::env_config::env_list_with_default;
use pathbot_core::{MetricsPeriod, UsageGrouping};
use pathbot_http::Settings;
use pathbot_service::{
    CurriculumService, MemberService, MetricsService, ProgressService, ReferenceClock, render,
};

use crate::open_store;

pub(crate) async fn run_paths() -> Result<()> {
    let store = open_store()?;
    let paths = CurriculumService::new(store).list_paths().await?;
    println!("{}", serde_json::to_string_pretty(&paths)?);
    Ok(())
}

pub(crate) async fn run_metrics(period: &str, start_date: Option<&str>, by: Option<&str>) -> Result<()> {
    let period = MetricsPeriod::parse(Some(period), start_date)?;
    let grouping: UsageGrouping = by.unwrap_or("").parse()?;
    let store = open_store()?;
    let clock = ReferenceClock::from_offset_minutes(Settings::from_env().utc_offset_minutes);
    let view = MetricsService::new(store, clock).command_metrics(period, grouping, clock.now()).await?;
    println!("{}", render::metrics_table(&view));
    Ok(())
}

pub(crate) async fn run_summary(channel_id: &str) -> Result<()> {
    let store = open_store()?;
    let admin_roles = env_list_with_default(
        "PATHBOT_ADMIN_ROLES",
        pathbot_core::constants::DEFAULT_ADMIN_ROLES,
    );
    let members = MemberService::new(store.clone(), admin_roles);
    let learners = members.learners(channel_id, &[]).await?;
    let view = ProgressService::new(store).user_summary(channel_id, &learners).await?;
    if learners.is_empty() {
        println!("No users found in this channel.");
    } else {
        println!("{}", render::summary_table(&view));
    }
    Ok(())
}
