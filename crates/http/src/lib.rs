//! HTTP command surface for pathbot.
//!
//! The chat gateway forwards slash commands and button/form interactions here
//! and renders the returned [`CommandReply`].

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(unused_results, reason = "Some results are intentionally ignored")]
#![allow(clippy::arithmetic_side_effects, reason = "Arithmetic is safe in context")]
#![allow(missing_copy_implementations, reason = "Types may grow")]
#![allow(clippy::let_underscore_untyped, reason = "Type is clear from context")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::exhaustive_enums, reason = "Reply types are matched by the gateway")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod command;
mod handlers;
mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use pathbot_runner::CodeRunner;
use pathbot_service::{
    CodeService, CurriculumService, MemberService, MetricsService, ProgressService, ReferenceClock,
    SurveyService,
};
use pathbot_storage::Store;
use tower_http::trace::TraceLayer;

pub use api_types::{
    BroadcastForm, CommandReply, CommandRequest, DEFAULT_SESSION_TTL_SECS, FormField,
    InteractionAction, InteractionRequest, MembersJoined, MembersJoinedResponse, MenuOption,
    Settings, VersionResponse,
};
pub use command::Command;
pub use session::SessionRegistry;

/// Shared application state for all HTTP handlers.
///
/// Wrapped in `Arc` for thread-safe sharing across handlers.
pub struct AppState {
    pub curriculum: CurriculumService,
    pub progress: ProgressService,
    pub metrics: MetricsService,
    pub members: MemberService,
    pub surveys: SurveyService,
    pub code: CodeService,
    /// Open menus, forms, confirmations and pagers
    pub sessions: SessionRegistry,
    /// Reference timezone for "today"
    pub clock: ReferenceClock,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, runner: Option<Arc<CodeRunner>>, settings: &Settings) -> Self {
        let clock = ReferenceClock::from_offset_minutes(settings.utc_offset_minutes);
        Self {
            curriculum: CurriculumService::new(Arc::clone(&store)),
            progress: ProgressService::new(Arc::clone(&store)),
            metrics: MetricsService::new(Arc::clone(&store), clock),
            members: MemberService::new(Arc::clone(&store), settings.admin_roles.clone()),
            surveys: SurveyService::new(store),
            code: CodeService::new(runner),
            sessions: SessionRegistry::new(Duration::from_secs(settings.session_ttl_secs)),
            clock,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/commands/{name}", post(handlers::commands::run_command))
        .route("/interactions/{session_id}", post(handlers::interactions::interact))
        .route("/events/members-joined", post(handlers::events::members_joined))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
