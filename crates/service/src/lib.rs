//! Service layer for pathbot
//!
//! Business logic between the command surface and the curriculum store or
//! the execution relay.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Services hold trait objects")]
#![allow(clippy::module_name_repetitions, reason = "Services are named after their module")]

mod clock;
mod code_service;
mod curriculum_service;
mod error;
mod member_service;
mod metrics_service;
mod progress_service;
pub mod render;
mod survey_service;
#[cfg(test)]
mod tests;

pub use clock::ReferenceClock;
pub use code_service::CodeService;
pub use curriculum_service::{CurriculumService, LinkOutcome, UNBOUND_CHANNEL, parse_week};
pub use error::ServiceError;
pub use member_service::MemberService;
pub use metrics_service::{MetricsService, MetricsView};
pub use progress_service::{
    ChecklistView, ProgressService, StatusView, SummaryView, UserProgressRow, UserProgressView,
};
pub use survey_service::{SurveyService, survey_recipients};
