#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod commands;
pub mod events;
pub mod flows;
pub mod interactions;

use pathbot_core::Pager;
use uuid::Uuid;

use crate::AppState;
use crate::api_types::CommandReply;
use crate::session::{SessionRegistry, SessionState};

/// Open a pager session for `owner`, or reply `empty` when there is nothing to show.
pub async fn open_pages(
    state: &AppState,
    owner: &str,
    pages: Vec<String>,
    empty: &str,
) -> CommandReply {
    let Ok(pager) = Pager::new(pages) else {
        return CommandReply::message(empty);
    };
    let id = SessionRegistry::new_id();
    let reply = pages_reply(id, &pager);
    state.sessions.store(id, owner, SessionState::Pages(pager)).await;
    reply
}

pub fn pages_reply(id: Uuid, pager: &Pager<String>) -> CommandReply {
    CommandReply::Pages {
        session_id: id.to_string(),
        page: pager.index() + 1,
        total: pager.len(),
        text: pager.current().clone(),
    }
}
