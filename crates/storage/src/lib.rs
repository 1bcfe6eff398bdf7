//! Storage layer for pathbot
//!
//! SQLite-backed curriculum store: paths, weekly topics, tasks, channel
//! bindings, per-user progress, channel memberships, usage events and
//! survey responses.

mod error;
mod migrations;
mod sqlite_async;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use storage::Storage;
pub use traits::Store;
