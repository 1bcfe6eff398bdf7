use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{CommandReply, InteractionAction, InteractionRequest};
use crate::handlers::{flows, pages_reply};
use crate::session::SessionState;

pub async fn interact(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<InteractionRequest>,
) -> Result<Json<CommandReply>, ApiError> {
    let id = Uuid::parse_str(session_id.trim())
        .map_err(|_| ApiError::NotFound("This interaction has expired.".to_owned()))?;
    let session = state.sessions.take(id, &req.user_id).await?;

    let reply = match session.state {
        SessionState::Pages(mut pager) => {
            let reply = if let InteractionAction::Page { direction } = req.action {
                pager.turn(direction);
                pages_reply(id, &pager)
            } else {
                CommandReply::error("validation", "Use the page buttons to move through this report.")
            };
            state.sessions.store(id, &session.owner, SessionState::Pages(pager)).await;
            reply
        },
        SessionState::Flow(flow) => flows::advance(&state, id, &session.owner, *flow, req.action).await,
    };
    Ok(Json(reply))
}
