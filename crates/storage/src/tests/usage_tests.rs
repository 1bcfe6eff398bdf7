use std::sync::Arc;

use super::create_test_storage;
use crate::traits::{SurveyStore, UsageStore};
use crate::Store;
use chrono::{DateTime, TimeZone, Utc};
use pathbot_core::{SatisfactionResponse, SurveyAnswers, TimeWindow, UsageEvent};

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap()
}

fn event(id: &str, user: &str, function: &str, ts: DateTime<Utc>) -> UsageEvent {
    UsageEvent {
        id: id.to_owned(),
        user_id: user.to_owned(),
        function_name: function.to_owned(),
        channel_id: Some("c1".to_owned()),
        path_id: None,
        timestamp: ts,
    }
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn events_from_same_user_are_all_kept() {
    let (storage, _dir) = create_test_storage();
    storage.append_usage_event(&event("e1", "u1", "status", at(1))).unwrap();
    storage.append_usage_event(&event("e2", "u1", "checklist", at(2))).unwrap();
    storage.append_usage_event(&event("e3", "u1", "status", at(3))).unwrap();

    let events = storage.list_usage_events(&TimeWindow::all()).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1].function_name, "checklist");
    assert!(storage.append_usage_event(&event("e1", "u1", "status", at(4))).unwrap_err().is_duplicate());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn window_bounds_are_inclusive() {
    let (storage, _dir) = create_test_storage();
    for day in 1..=5 {
        storage.append_usage_event(&event(&format!("e{day}"), "u1", "status", at(day))).unwrap();
    }

    let window = TimeWindow::new(Some(at(2)), Some(at(4)));
    let ids: Vec<String> =
        storage.list_usage_events(&window).unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["e2", "e3", "e4"]);

    let open_end = TimeWindow::new(Some(at(5)), None);
    assert_eq!(storage.list_usage_events(&open_end).unwrap().len(), 1);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn usage_by_function() {
    let (storage, _dir) = create_test_storage();
    storage.append_usage_event(&event("e1", "u1", "status", at(1))).unwrap();
    storage.append_usage_event(&event("e2", "u2", "status", at(2))).unwrap();
    storage.append_usage_event(&event("e3", "u3", "help", at(3))).unwrap();

    let users: Vec<String> =
        storage.list_usage_by_function("status").unwrap().into_iter().map(|e| e.user_id).collect();
    assert_eq!(users, vec!["u1", "u2"]);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn async_traits_delegate_to_storage() {
    let (storage, _dir) = create_test_storage();
    let store: Arc<dyn Store> = Arc::new(storage);

    store.append_usage_event(&event("e1", "u1", "status", at(1))).await.unwrap();
    assert_eq!(store.list_usage_events(&TimeWindow::all()).await.unwrap().len(), 1);

    let response = SatisfactionResponse {
        id: "r1".to_owned(),
        user_id: "u1".to_owned(),
        answers: SurveyAnswers::parse("9", "8", "7", "10", "more katas").unwrap(),
        created_at: at(2),
    };
    store.save_satisfaction_response(&response).await.unwrap();
    let loaded = store.get_satisfaction_response("r1").await.unwrap().unwrap();
    assert_eq!(loaded, response);
}
