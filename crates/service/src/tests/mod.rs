//! Service tests against a real SQLite store in a temporary directory.

use std::sync::Arc;

use chrono::NaiveDate;
use pathbot_core::Member;
use pathbot_storage::{Storage, Store};
use tempfile::TempDir;

use crate::{
    CurriculumService, LinkOutcome, MemberService, MetricsService, ProgressService, ReferenceClock,
};

mod code_tests;

pub struct TestServices {
    pub curriculum: CurriculumService,
    pub progress: ProgressService,
    pub metrics: MetricsService,
    pub members: MemberService,
    pub store: Arc<dyn Store>,
    _dir: TempDir,
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_services() -> TestServices {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(&dir.path().join("test.db")).unwrap();
    let store: Arc<dyn Store> = Arc::new(storage);
    TestServices {
        curriculum: CurriculumService::new(Arc::clone(&store)),
        progress: ProgressService::new(Arc::clone(&store)),
        metrics: MetricsService::new(Arc::clone(&store), ReferenceClock::utc()),
        members: MemberService::new(
            Arc::clone(&store),
            vec!["admin".to_owned(), "administrator".to_owned()],
        ),
        store,
        _dir: dir,
    }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn member(id: &str, name: &str, roles: &[&str], bot: bool) -> Member {
    Member {
        user_id: id.to_owned(),
        name: name.to_owned(),
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
        bot,
    }
}

/// Path "Algorithms" (4 weeks) with topic "Arrays" in week 1 holding tasks A and B,
/// bound to channel `c1` from 2024-01-01. Returns `(path_id, [task A id, task B id])`.
#[expect(clippy::unwrap_used, reason = "test code")]
pub async fn seed_algorithms(services: &TestServices) -> (String, Vec<String>) {
    let path = services.curriculum.add_path("Algorithms", "4").await.unwrap();
    let topic = services.curriculum.add_topic(&path.id, 1, "Arrays", "").await.unwrap();
    let a = services.curriculum.add_task(&topic.id, "A").await.unwrap();
    let b = services.curriculum.add_task(&topic.id, "B").await.unwrap();
    let outcome =
        services.curriculum.link_channel(&path.id, "c1", Some("general"), "2024-01-01").await.unwrap();
    assert!(matches!(outcome, LinkOutcome::Linked { .. }));
    (path.id, vec![a.id, b.id])
}
