//! Fixed-width text rendering of reports for chat replies.
//!
//! Tables are wrapped in code fences so that chat clients keep the columns aligned.

use std::fmt::Write as _;

use pathbot_core::{ChecklistRow, StatusReport, StatusRow, Topic, UsageGrouping, WeekBlock};
use pathbot_runner::RunOutcome;

use crate::metrics_service::MetricsView;
use crate::progress_service::{ChecklistView, StatusView, SummaryView, UserProgressView};

const FENCE: &str = "```";
const DONE_MARK: &str = "✅";
const OPEN_MARK: &str = "❌";

fn page_header(out: &mut String, path_name: &str, current_week: u32, week: u32) {
    let _ = write!(
        out,
        "**Path {path_name}**\n**You are in week: {current_week}**\n\n**Week: {week}**\n{FENCE}\n"
    );
}

/// One page per week, ascending. Empty when the path has no topics.
#[must_use]
pub fn checklist_pages(view: &ChecklistView) -> Vec<String> {
    view.weeks.iter().map(|block| checklist_page(view, block)).collect()
}

fn checklist_page(view: &ChecklistView, block: &WeekBlock<ChecklistRow>) -> String {
    let mut out = String::new();
    page_header(&mut out, &view.path.name, view.current_week, block.week);
    let _ = writeln!(out, "{:<45} {:<25} {:<15}", "Topic", "Task", "Due Date");
    out.push_str(&"-".repeat(90));
    out.push('\n');
    for row in &block.rows {
        let topic = if row.first_in_group { row.topic_name.as_str() } else { "" };
        let _ = writeln!(
            out,
            "{:<45} {:<25} {:<15}",
            topic,
            row.task_label(),
            row.due_date.format(pathbot_core::constants::DATE_FORMAT)
        );
    }
    out.push_str(FENCE);
    out
}

/// One page per week with tasks. Empty for the no-topics and no-tasks outcomes.
#[must_use]
pub fn status_pages(view: &StatusView) -> Vec<String> {
    let StatusReport::Weeks(blocks) = &view.report else {
        return Vec::new();
    };
    blocks.iter().map(|block| status_page(view, block)).collect()
}

fn status_page(view: &StatusView, block: &WeekBlock<StatusRow>) -> String {
    let mut out = String::new();
    page_header(&mut out, &view.path.name, view.current_week, block.week);
    let _ = writeln!(out, "{:<19} {:<59} {:<10}", "Task", "Proof URL", "Status");
    out.push_str(&"-".repeat(94));
    out.push('\n');
    for row in &block.rows {
        let mark = if row.completed { DONE_MARK } else { OPEN_MARK };
        let _ = writeln!(out, "{:<19} {:<59} {:<10}", row.task_name, row.proof_url, mark);
    }
    out.push_str(FENCE);
    out
}

#[must_use]
pub fn summary_table(view: &SummaryView) -> String {
    let mut out = format!("Task Summary for Path: **{}**\n{FENCE}\n", view.path.name);
    let _ = writeln!(out, "{:<20} {:<15} {:<15}", "User", "Completed", "Pending");
    out.push_str(&"-".repeat(50));
    out.push('\n');
    for row in &view.rows {
        let _ = writeln!(out, "{:<20} {:<15} {:<15}", row.user_name, row.completed, row.pending);
    }
    out.push_str(FENCE);
    out
}

/// One page per user: a header row `Task 1..n` and the user's marks.
#[must_use]
pub fn user_progress_pages(view: &UserProgressView) -> Vec<String> {
    view.rows
        .iter()
        .map(|row| {
            let mut out = format!("User Progress for Path: **{}**\n{FENCE}\n", view.path.name);
            let _ = write!(out, "{:<10}", "Task");
            for n in 1..=view.tasks.len() {
                let _ = write!(out, "{:<10}", format!("Task {n}"));
            }
            out.push('\n');
            let _ = write!(out, "{:<10}", row.user_name);
            for done in &row.completed {
                let _ = write!(out, "{:<10}", if *done { DONE_MARK } else { OPEN_MARK });
            }
            out.push('\n');
            out.push_str(FENCE);
            out
        })
        .collect()
}

#[must_use]
pub fn metrics_table(view: &MetricsView) -> String {
    let report = &view.report;
    let (title, kind, unknown) = match report.grouping {
        UsageGrouping::None => ("**Command Metrics**", "", ""),
        UsageGrouping::Channel => ("**Command Metrics by Channel**", "Channel", "Unknown Channel"),
        UsageGrouping::Path => ("**Command Metrics by Path**", "Path", "Unknown Path"),
    };

    let mut out = format!("{title}\n**Total Count: {}**\n\n", report.total);
    if report.grouping == UsageGrouping::None {
        command_block(&mut out, &report.command_counts(), report.total);
        return out;
    }
    for group in &report.groups {
        let id = group.key.as_deref().unwrap_or("-");
        let name = group.key.as_ref().and_then(|k| view.labels.get(k)).map_or(unknown, String::as_str);
        let _ = writeln!(out, "\n{kind}: {name} (ID: {id})");
        command_block(&mut out, &group.commands, group.subtotal);
    }
    out
}

fn command_block(out: &mut String, commands: &pathbot_core::CommandCounts, total: u64) {
    let _ = writeln!(out, "{FENCE}");
    let _ = writeln!(out, "{:<20} {:<10}", "Command", "Count");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    for (command, count) in commands {
        let _ = writeln!(out, "{command:<20} {count:<10}");
    }
    out.push_str(&"-".repeat(30));
    out.push('\n');
    let _ = writeln!(out, "{:>20} {:<10}", "Total", total);
    let _ = writeln!(out, "{FENCE}");
}

#[must_use]
pub fn topic_list(path_id: &str, week: u32, topics: &[Topic]) -> String {
    if topics.is_empty() {
        return format!("No topics found for path ID {path_id} and week {week}.");
    }
    let mut out = format!("Topics for Path ID {path_id}, Week {week}:\n{FENCE}\n");
    for topic in topics {
        let _ = writeln!(out, "- {}", topic.name);
    }
    out.push_str(FENCE);
    out
}

#[must_use]
pub fn run_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Stdout(text) => format!("Result:\n{FENCE}{text}{FENCE}"),
        RunOutcome::Stderr(text) => format!("Error:\n{FENCE}{text}{FENCE}"),
        RunOutcome::NoOutput => "No output or error returned.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pathbot_core::{
        MetricsReport, Path, TimeWindow, UsageEvent, UserSummary, build_checklist,
    };

    use super::*;

    fn path() -> Path {
        Path::new("p1".to_owned(), "Algorithms".to_owned(), 4, Utc::now())
    }

    fn event(function: &str, channel: Option<&str>) -> UsageEvent {
        UsageEvent {
            id: function.to_owned(),
            user_id: "u1".to_owned(),
            function_name: function.to_owned(),
            channel_id: channel.map(ToOwned::to_owned),
            path_id: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn checklist_shows_topic_once_per_group() {
        let topic = pathbot_core::TopicWithTasks {
            topic: Topic {
                id: "t1".to_owned(),
                path_id: "p1".to_owned(),
                name: "Arrays".to_owned(),
                description: String::new(),
                week: 1,
                task_ids: vec!["a".to_owned(), "b".to_owned()],
            },
            tasks: ["a", "b"]
                .iter()
                .map(|id| pathbot_core::Task {
                    id: (*id).to_owned(),
                    path_id: "p1".to_owned(),
                    name: format!("Task {id}"),
                    description: String::new(),
                    week: 1,
                })
                .collect(),
        };
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let weeks = build_checklist(&[topic], start).unwrap();
        let view = ChecklistView { path: path(), current_week: 1, weeks };

        let pages = checklist_pages(&view);
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert!(page.starts_with("**Path Algorithms**\n**You are in week: 1**"));
        assert_eq!(page.matches("Arrays").count(), 1);
        assert!(page.contains("Task b"));
        assert!(page.contains("2024-01-08"));
        assert!(page.ends_with(FENCE));
    }

    #[test]
    fn summary_table_lists_users() {
        let view = SummaryView {
            path: path(),
            rows: vec![UserSummary {
                user_id: "u1".to_owned(),
                user_name: "ana".to_owned(),
                completed: 1,
                pending: 1,
            }],
        };
        let table = summary_table(&view);
        assert!(table.starts_with("Task Summary for Path: **Algorithms**"));
        assert!(table.contains(&format!("{:<20} {:<15} {:<15}", "ana", 1, 1)));
    }

    #[test]
    fn metrics_by_channel_falls_back_to_unknown_name() {
        let events = vec![event("status", Some("c1")), event("status", Some("c2"))];
        let report = MetricsReport::build(&events, UsageGrouping::Channel, TimeWindow::all());
        let labels = [("c1".to_owned(), "general".to_owned())].into_iter().collect();
        let text = metrics_table(&MetricsView { report, labels });

        assert!(text.starts_with("**Command Metrics by Channel**\n**Total Count: 2**"));
        assert!(text.contains("Channel: general (ID: c1)"));
        assert!(text.contains("Channel: Unknown Channel (ID: c2)"));
        assert!(text.contains(&format!("{:>20} {:<10}", "Total", 1)));
    }

    #[test]
    fn ungrouped_metrics_have_one_table() {
        let events = vec![event("status", None), event("checklist", None), event("status", None)];
        let report = MetricsReport::build(&events, UsageGrouping::None, TimeWindow::all());
        let text = metrics_table(&MetricsView { report, labels: Default::default() });
        assert_eq!(text.matches(FENCE).count(), 2);
        assert!(text.contains(&format!("{:<20} {:<10}", "status", 2)));
        assert!(text.contains("**Total Count: 3**"));
    }

    #[test]
    fn run_outcome_messages() {
        assert_eq!(run_outcome(&RunOutcome::Stdout("hi\n".to_owned())), "Result:\n```hi\n```");
        assert_eq!(run_outcome(&RunOutcome::NoOutput), "No output or error returned.");
    }

    #[test]
    fn empty_topic_list_message() {
        assert_eq!(topic_list("p1", 2, &[]), "No topics found for path ID p1 and week 2.");
    }
}
