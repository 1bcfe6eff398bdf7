//! Command dispatch through the router: access rules, usage recording and replies.

mod common;

use axum::http::StatusCode;
use common::{admin, create_test_app, learner};
use serde_json::json;

#[tokio::test]
async fn health_and_version() {
    let app = create_test_app();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let (status, body) = app.get("/api/version").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unknown_command_is_not_found() {
    let app = create_test_app();
    let (status, body) = app.post("/commands/launch", &learner("u1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap_or_default().contains("launch"));
}

#[tokio::test]
async fn missing_user_is_bad_request() {
    let app = create_test_app();
    let (status, _) = app.post("/commands/help", &json!({"user_id": " "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refused_admin_commands_are_not_recorded() {
    let app = create_test_app();
    let body = json!({
        "user_id": "u1",
        "roles": ["student"],
        "args": {"name": "X", "duration_weeks": "2"},
    });
    let reply = app.command("addpath", &body).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["kind"], "forbidden");
    assert!(app.state.curriculum.list_paths().await.unwrap_or_default().is_empty());

    let reply = app.command("functionusage", &admin(json!({"function_name": "addpath"}))).await;
    assert_eq!(reply["text"], "No users have used addpath.");
}

#[tokio::test]
async fn every_recognised_command_is_recorded_once() {
    let app = create_test_app();
    app.command("help", &learner("u2")).await;
    app.command("help", &learner("u1")).await;
    app.command("help", &learner("u2")).await;

    let reply = app.command("functionusage", &admin(json!({"function_name": "help"}))).await;
    assert_eq!(reply["text"], "Users who used help: u2, u1");

    let reply = app.command("commandmetrics", &admin(json!({"period": "last_7_days"}))).await;
    let text = reply["text"].as_str().unwrap_or_default();
    assert!(text.starts_with("**Command Metrics**"), "{text}");
    assert!(text.contains(&format!("{:<20} {:<10}", "help", 3)), "{text}");
}

#[tokio::test]
async fn addpath_validates_duration() {
    let app = create_test_app();
    let reply = app.command("addpath", &admin(json!({"name": "Rust", "duration_weeks": "four"}))).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["kind"], "validation");

    let reply = app.command("addpath", &admin(json!({"name": "Rust", "duration_weeks": "4"}))).await;
    assert_eq!(reply["type"], "message");
    assert!(reply["text"].as_str().unwrap_or_default().starts_with("Path \"Rust\" created"));
}

#[tokio::test]
async fn channel_commands_need_a_channel() {
    let app = create_test_app();
    let reply = app.command("status", &json!({"user_id": "u1"})).await;
    assert_eq!(reply["kind"], "validation");

    let reply = app.command("status", &learner("u1")).await;
    assert_eq!(reply["kind"], "not_found");
    assert_eq!(reply["text"], "This channel is not associated with any path.");
}

#[tokio::test]
async fn help_lists_commands() {
    let app = create_test_app();
    let reply = app.command("help", &learner("u1")).await;
    let text = reply["text"].as_str().unwrap_or_default();
    assert!(text.contains("/status - "));
    assert!(text.contains("/submit-code - "));
}

#[tokio::test]
async fn code_runs_report_missing_configuration() {
    let app = create_test_app();
    let reply = app
        .command("submit-code", &json!({"user_id": "u1", "args": {"language": "python"}}))
        .await;
    assert_eq!(reply["kind"], "unavailable");

    let reply = app
        .command("submit-code", &json!({"user_id": "u1", "args": {"language": "cobol"}}))
        .await;
    assert_eq!(reply["kind"], "validation");
}

#[tokio::test]
async fn channel_and_path_describe_the_binding() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    app.link_c1(&path_id).await;

    let reply = app.command("channel", &learner("u1")).await;
    assert_eq!(reply["text"], "You are in channel **general** (ID: c1).");
    let reply = app.command("path", &learner("u1")).await;
    assert_eq!(reply["text"], "This channel is linked to path **Algorithms**.");
}

#[tokio::test]
async fn members_are_listed_and_recorded() {
    let app = create_test_app();
    let members = json!([
        {"user_id": "u1", "name": "ana", "roles": ["student"]},
        {"user_id": "b1", "name": "helper", "bot": true},
        {"user_id": "a1", "name": "root", "roles": ["administrator"]},
    ]);
    let mut body = admin(json!({}));
    body["members"] = members.clone();

    let reply = app.command("listusers", &body).await;
    assert_eq!(reply["text"], "Users in this channel:\nana\nroot");

    let reply = app.command("add_users_from_channel", &body).await;
    assert_eq!(reply["text"], "Added 1 users from this channel.");

    let (status, added) = app
        .post("/events/members-joined", &json!({"channel_id": "c1", "members": members}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["added"], 0);

    let reply = app.command("listusers", &admin(json!({}))).await;
    assert_eq!(reply["text"], "Users in this channel:\nana");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn listtopics_shows_one_week() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    app.state.curriculum.add_topic(&path_id, 2, "Graphs", "").await.unwrap();

    let reply = app.command("listtopics", &learner_with(json!({"path_id": path_id, "week": "2"}))).await;
    assert!(reply["text"].as_str().unwrap_or_default().contains("- Graphs"));
    let reply = app.command("listtopics", &learner_with(json!({"path_id": path_id, "week": "1"}))).await;
    assert_eq!(reply["text"], format!("No topics found for path ID {path_id} and week 1."));
}

fn learner_with(args: serde_json::Value) -> serde_json::Value {
    let mut body = learner("u1");
    body["args"] = args;
    body
}
