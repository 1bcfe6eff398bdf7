//! Test utilities and module declarations for storage tests.

use crate::Storage;
use pathbot_core::{NewPath, NewTask, NewTopic, Path, Task, Topic};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_path(storage: &Storage, name: &str, weeks: u32) -> Path {
    storage.create_path(&NewPath::parse(name, &weeks.to_string()).unwrap()).unwrap()
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_topic(storage: &Storage, path: &Path, week: u32, name: &str) -> Topic {
    storage.create_topic(&NewTopic::parse(path, week, name, "").unwrap()).unwrap()
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_task(storage: &Storage, topic_id: &str, name: &str) -> Task {
    let topic = storage.get_topic(topic_id).unwrap().unwrap();
    storage.create_task(&NewTask::parse(&topic, name).unwrap()).unwrap()
}

mod usage_tests;

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn reopening_database_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("reopen.db");
    {
        let storage = Storage::new(&db_path).unwrap();
        create_test_path(&storage, "Algorithms", 4);
    }
    let storage = Storage::new(&db_path).unwrap();
    let paths = storage.list_paths().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].name, "Algorithms");
}
