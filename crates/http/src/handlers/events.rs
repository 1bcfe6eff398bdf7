use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{MembersJoined, MembersJoinedResponse};

/// Record members who joined a channel. Bots and admins are skipped.
pub async fn members_joined(
    State(state): State<Arc<AppState>>,
    Json(event): Json<MembersJoined>,
) -> Result<Json<MembersJoinedResponse>, ApiError> {
    if event.channel_id.trim().is_empty() {
        return Err(ApiError::BadRequest("channel_id is required".to_owned()));
    }
    let added = state.members.register_members(&event.channel_id, &event.members).await?;
    Ok(Json(MembersJoinedResponse { added }))
}
