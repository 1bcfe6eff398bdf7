//! Code-execution relay for pathbot.
//!
//! Posts source code to a Judge0-compatible sandbox and relays stdout/stderr.

mod client;
pub mod error;
mod language;
mod types;

pub use client::{CodeRunner, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, normalize_source};
pub use error::RunnerError;
pub use language::Language;
pub use types::RunOutcome;
