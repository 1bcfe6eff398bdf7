//! Shared helpers: an in-process router over a temporary SQLite store.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pathbot_http::{AppState, Settings, create_router};
use pathbot_storage::{Storage, Store};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<dyn Store>,
    _dir: TempDir,
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn Store> = Arc::new(Storage::new(&dir.path().join("test.db")).unwrap());
    let state = Arc::new(AppState::new(Arc::clone(&store), None, &Settings::default()));
    TestApp { router: create_router(Arc::clone(&state)), state, store, _dir: dir }
}

/// Command body for an admin in channel `c1`.
pub fn admin(args: Value) -> Value {
    json!({
        "user_id": "admin1",
        "roles": ["Admin"],
        "channel_id": "c1",
        "channel_name": "general",
        "args": args,
    })
}

/// Command body for a learner in channel `c1`.
pub fn learner(user_id: &str) -> Value {
    json!({ "user_id": user_id, "roles": ["student"], "channel_id": "c1" })
}

impl TestApp {
    #[expect(clippy::unwrap_used, reason = "test code")]
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[expect(clippy::unwrap_used, reason = "test code")]
    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Run a command and return its reply, asserting the request itself succeeded.
    pub async fn command(&self, name: &str, body: &Value) -> Value {
        let (status, reply) = self.post(&format!("/commands/{name}"), body).await;
        assert_eq!(status, StatusCode::OK, "command {name} failed: {reply}");
        reply
    }

    pub async fn act(&self, reply: &Value, user_id: &str, action: Value) -> (StatusCode, Value) {
        let session_id = reply["session_id"].as_str().unwrap_or_default();
        self.post(
            &format!("/interactions/{session_id}"),
            &json!({ "user_id": user_id, "action": action }),
        )
        .await
    }

    /// Interaction by the admin that must succeed at the HTTP level.
    pub async fn admin_act(&self, reply: &Value, action: Value) -> Value {
        let (status, next) = self.act(reply, "admin1", action).await;
        assert_eq!(status, StatusCode::OK, "interaction failed: {next}");
        next
    }

    /// Create a path through `addpath` and return its id.
    pub async fn add_path(&self, name: &str, weeks: &str) -> String {
        let reply = self.command("addpath", &admin(json!({"name": name, "duration_weeks": weeks}))).await;
        assert_eq!(reply["type"], "message", "{reply}");
        let paths = self.state.curriculum.list_paths().await.unwrap_or_default();
        paths.into_iter().find(|p| p.name == name).map(|p| p.id).unwrap_or_default()
    }

    /// Link `c1` to `path_id` from 2024-01-01 through the `linkchannel` flow.
    pub async fn link_c1(&self, path_id: &str) -> Value {
        let menu = self.command("linkchannel", &admin(json!({}))).await;
        let form = self.admin_act(&menu, select(path_id)).await;
        assert_eq!(form["type"], "form", "{form}");
        self.admin_act(&form, submit(json!({"channel_id": "", "start_date": "2024-01-01"}))).await
    }
}

pub fn select(value: &str) -> Value {
    json!({"type": "select", "value": value})
}

pub fn submit(fields: Value) -> Value {
    json!({"type": "submit", "fields": fields})
}

pub fn confirm(accepted: bool) -> Value {
    json!({"type": "confirm", "accepted": accepted})
}

pub fn page(direction: &str) -> Value {
    json!({"type": "page", "direction": direction})
}

/// Value of the menu option whose label is `label`.
pub fn option_value(menu: &Value, label: &str) -> String {
    menu["options"]
        .as_array()
        .and_then(|options| options.iter().find(|o| o["label"] == label))
        .and_then(|o| o["value"].as_str())
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}
