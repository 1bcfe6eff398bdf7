//! Menus, forms, confirmations and pagers driven through `/interactions/{id}`.

mod common;

use axum::http::StatusCode;
use common::{admin, confirm, create_test_app, learner, option_value, page, select, submit};
use pathbot_storage::traits::ChannelStore;
use serde_json::json;

#[tokio::test]
async fn link_then_add_topic_and_task_then_complete() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;

    let linked = app.link_c1(&path_id).await;
    assert_eq!(linked["text"], "Channel c1 linked to path \"Algorithms\" starting on 2024-01-01.");

    let menu = app.command("addtopic", &admin(json!({}))).await;
    assert_eq!(menu["prompt"], "Please select a path:");
    let weeks = app.admin_act(&menu, select(&path_id)).await;
    assert_eq!(weeks["options"].as_array().map(Vec::len), Some(4));
    let form = app.admin_act(&weeks, select("1")).await;
    assert_eq!(form["type"], "form");
    let done = app.admin_act(&form, submit(json!({"name": "Arrays", "description": ""}))).await;
    assert!(done["text"].as_str().unwrap_or_default().starts_with("Topic \"Arrays\""), "{done}");

    let menu = app.command("addtask", &admin(json!({}))).await;
    let topics = app.admin_act(&menu, select(&path_id)).await;
    let topic_id = option_value(&topics, "Week 1: Arrays");
    let form = app.admin_act(&topics, select(&topic_id)).await;
    let done = app.admin_act(&form, submit(json!({"name": "Two Sum"}))).await;
    assert!(done["text"].as_str().unwrap_or_default().starts_with("Task \"Two Sum\""), "{done}");

    let status = app.command("status", &learner("u1")).await;
    assert_eq!(status["type"], "pages");
    assert_eq!(status["total"], 1);
    let text = status["text"].as_str().unwrap_or_default();
    assert!(text.contains("Two Sum") && text.contains("❌"), "{text}");

    let weeks = app.command("complete", &learner("u1")).await;
    assert_eq!(weeks["prompt"], "Please select a week:");
    let (_, tasks) = app.act(&weeks, "u1", select("1")).await;
    assert_eq!(tasks["prompt"], "Please select a task to mark as completed:");
    let task_id = option_value(&tasks, "Two Sum");
    let (_, form) = app.act(&tasks, "u1", select(&task_id)).await;
    let (_, done) = app.act(&form, "u1", submit(json!({"proof_url": "http://proof"}))).await;
    assert_eq!(done["text"], "Task \"Two Sum\" marked as completed with proof URL: http://proof!");

    let again = app.command("complete", &learner("u1")).await;
    assert_eq!(again["text"], "You have no incomplete tasks.");
    let status = app.command("status", &learner("u1")).await;
    assert!(status["text"].as_str().unwrap_or_default().contains("http://proof"));
}

#[tokio::test]
async fn relinking_asks_before_replacing() {
    let app = create_test_app();
    let first = app.add_path("Algorithms", "4").await;
    let second = app.add_path("Graphs", "3").await;
    app.link_c1(&first).await;

    let menu = app.command("linkchannel", &admin(json!({}))).await;
    let form = app.admin_act(&menu, select(&second)).await;
    let question =
        app.admin_act(&form, submit(json!({"channel_id": "c1", "start_date": "2024-02-01"}))).await;
    assert_eq!(question["type"], "confirm");
    assert_eq!(
        question["text"],
        "The channel ID c1 is already linked to path Algorithms. Do you want to link it to the new path?"
    );
    let path = app.command("path", &learner("u1")).await;
    assert_eq!(path["text"], "This channel is linked to path **Algorithms**.");

    let done = app.admin_act(&question, confirm(true)).await;
    assert_eq!(done["text"], "Channel c1 linked to path \"Graphs\" starting on 2024-02-01.");
    let path = app.command("path", &learner("u1")).await;
    assert_eq!(path["text"], "This channel is linked to path **Graphs**.");
}

#[tokio::test]
async fn rejected_form_can_be_resent() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    let menu = app.command("linkchannel", &admin(json!({}))).await;
    let form = app.admin_act(&menu, select(&path_id)).await;

    let error = app.admin_act(&form, submit(json!({"start_date": "01/02/2024"}))).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["kind"], "validation");

    let done = app.admin_act(&form, submit(json!({"start_date": "2024-01-02"}))).await;
    assert_eq!(done["type"], "message", "{done}");
}

#[tokio::test]
async fn sessions_belong_to_their_owner() {
    let app = create_test_app();
    app.add_path("Algorithms", "4").await;
    let menu = app.command("deletepath", &admin(json!({}))).await;
    assert_eq!(menu["prompt"], "Please select a path to delete:");

    let (status, _) = app.act(&menu, "intruder", select("x")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/interactions/not-a-session", &json!({"user_id": "admin1", "action": select("x")}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post(
            "/interactions/00000000-0000-4000-8000-000000000000",
            &json!({"user_id": "admin1", "action": select("x")}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn finished_sessions_are_closed() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    let menu = app.command("deletepath", &admin(json!({}))).await;
    let question = app.admin_act(&menu, select(&path_id)).await;
    let done = app.admin_act(&question, confirm(false)).await;
    assert_eq!(done["text"], "Deletion cancelled.");
    assert_eq!(app.state.curriculum.list_paths().await.map(|p| p.len()).unwrap_or_default(), 1);

    let (status, _) = app.act(&question, "admin1", confirm(true)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_topic_names_its_path() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    let menu = app.command("addtopic", &admin(json!({}))).await;
    let weeks = app.admin_act(&menu, select(&path_id)).await;
    let form = app.admin_act(&weeks, select("2")).await;
    app.admin_act(&form, submit(json!({"name": "Graphs"}))).await;

    let menu = app.command("deletetopic", &admin(json!({}))).await;
    let topics = app.admin_act(&menu, select(&path_id)).await;
    let topic_id = option_value(&topics, "Week 2: Graphs");
    let question = app.admin_act(&topics, select(&topic_id)).await;
    assert_eq!(question["text"], "Are you sure you want to delete topic \"Graphs\" and all its tasks?");
    let done = app.admin_act(&question, confirm(true)).await;
    assert_eq!(
        done["text"],
        format!("Topic \"Graphs\" with ID {topic_id} has been deleted from path \"Algorithms\".")
    );
}

#[tokio::test]
async fn empty_curriculum_ends_without_a_session() {
    let app = create_test_app();
    let reply = app.command("deletetask", &admin(json!({}))).await;
    assert_eq!(reply["text"], "No paths available.");
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn malformed_start_date_opens_a_correction_form() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    app.link_c1(&path_id).await;
    app.store.update_start_date("c1", "01-01-2024").await.unwrap();

    let form = app.command("checklist", &learner("u1")).await;
    assert_eq!(form["type"], "form");
    assert!(form["title"].as_str().unwrap_or_default().contains("'01-01-2024'"));

    let (_, done) = app.act(&form, "u1", submit(json!({"start_date": "2024-01-01"}))).await;
    assert_eq!(
        done["text"],
        "Start date updated to 2024-01-01. Please re-run the /checklist or /status command."
    );
    let checklist = app.command("checklist", &learner("u1")).await;
    assert_eq!(checklist["text"], "No topics found for this path.");
}

#[tokio::test]
async fn user_progress_pages_one_user_at_a_time() {
    let app = create_test_app();
    let path_id = app.add_path("Algorithms", "4").await;
    app.link_c1(&path_id).await;
    let mut body = admin(json!({}));
    body["members"] = json!([
        {"user_id": "u1", "name": "ana"},
        {"user_id": "u2", "name": "bo"},
    ]);

    let first = app.command("userprogress", &body).await;
    assert_eq!((first["page"].clone(), first["total"].clone()), (json!(1), json!(2)));
    assert!(first["text"].as_str().unwrap_or_default().contains("ana"));

    let second = app.admin_act(&first, page("next")).await;
    assert_eq!(second["page"], 2);
    assert!(second["text"].as_str().unwrap_or_default().contains("bo"));
    let still = app.admin_act(&first, page("next")).await;
    assert_eq!(still["page"], 2);
    let back = app.admin_act(&first, page("previous")).await;
    assert_eq!(back["page"], 1);

    let wrong = app.admin_act(&first, select("x")).await;
    assert_eq!(wrong["kind"], "validation");
    let after = app.admin_act(&first, page("previous")).await;
    assert_eq!(after["page"], 1);
}

#[tokio::test]
async fn satisfaction_request_reaches_each_human() {
    let app = create_test_app();
    let mut body = admin(json!({}));
    body["members"] = json!([
        {"user_id": "u1", "name": "ana"},
        {"user_id": "b1", "name": "helper", "bot": true},
    ]);
    let reply = app.command("request_satisfaction", &body).await;
    assert_eq!(reply["type"], "broadcast");
    assert_eq!(reply["text"], "Requesting satisfaction feedback from 1 users in the channel.");
    let form = &reply["forms"][0];
    assert_eq!(form["user_id"], "u1");
    assert_eq!(form["fields"].as_array().map(Vec::len), Some(5));

    let answers = json!({
        "overall_satisfaction": "9",
        "ease_of_use": "8",
        "reliability": "7",
        "support_satisfaction": "10",
        "suggestions": "more katas",
    });
    let (_, bad) = app.act(form, "u1", submit(json!({"overall_satisfaction": "11"}))).await;
    assert_eq!(bad["kind"], "validation");
    let (status, done) = app.act(form, "u1", submit(answers)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["text"], "Thank you for your feedback!");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn selections_outside_the_offered_menu_are_refused() {
    let app = create_test_app();
    let first = app.add_path("Algorithms", "4").await;
    let second = app.add_path("Graphs", "3").await;
    let own_topic = app.state.curriculum.add_topic(&first, 1, "Arrays", "").await.unwrap();
    let own_task = app.state.curriculum.add_task(&own_topic.id, "Two Sum").await.unwrap();
    let foreign_topic = app.state.curriculum.add_topic(&second, 1, "BFS", "").await.unwrap();
    let foreign_task = app.state.curriculum.add_task(&foreign_topic.id, "Islands").await.unwrap();

    let menu = app.command("deletetask", &admin(json!({}))).await;
    let topics = app.admin_act(&menu, select(&first)).await;
    let refused = app.admin_act(&topics, select(&foreign_topic.id)).await;
    assert_eq!(refused["type"], "error");
    assert_eq!(refused["kind"], "validation");

    let tasks = app.admin_act(&topics, select(&own_topic.id)).await;
    assert_eq!(tasks["prompt"], "Please select a task to delete:");
    let refused = app.admin_act(&tasks, select(&foreign_task.id)).await;
    assert_eq!(refused["kind"], "validation");

    let question = app.admin_act(&tasks, select(&own_task.id)).await;
    assert_eq!(question["type"], "confirm");
    let done = app.admin_act(&question, confirm(true)).await;
    assert_eq!(done["text"], format!("Task \"Two Sum\" with ID {} has been deleted.", own_task.id));
    assert!(app.state.curriculum.get_task(&foreign_task.id).await.is_ok());

    app.link_c1(&second).await;
    let weeks = app.command("complete", &learner("u1")).await;
    let (status, refused) = app.act(&weeks, "u1", select("3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refused["kind"], "validation");
}
