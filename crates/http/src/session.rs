//! In-memory registry of open interactions.
//!
//! A session is taken out of the registry while an interaction is handled and
//! put back when the interaction stays open, so no lock is held across awaits.
//! Expired sessions are swept whenever the registry is touched.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pathbot_core::{ChannelBinding, NavState, Pager};
use pathbot_runner::Language;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api_error::ApiError;

/// A relink waiting for the admin's answer.
#[derive(Debug, Clone)]
pub struct PendingRelink {
    pub current_path: String,
    pub requested: ChannelBinding,
}

/// Values a flow needs besides its menu selections.
#[derive(Debug, Clone, Default)]
pub struct FlowContext {
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub language: Option<Language>,
    pub pending_relink: Option<PendingRelink>,
}

#[derive(Debug, Clone)]
pub struct FlowSession {
    pub nav: NavState,
    pub context: FlowContext,
}

impl FlowSession {
    pub const fn new(nav: NavState, context: FlowContext) -> Self {
        Self { nav, context }
    }
}

#[derive(Debug)]
pub enum SessionState {
    Flow(Box<FlowSession>),
    Pages(Pager<String>),
}

#[derive(Debug)]
pub struct Session {
    pub owner: String,
    pub state: SessionState,
    expires_at: Instant,
}

pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, sessions: RwLock::new(HashMap::new()) }
    }

    pub fn new_id() -> Uuid {
        Uuid::new_v4()
    }

    /// Open or refresh a session. The lifetime restarts on every store.
    pub async fn store(&self, id: Uuid, owner: &str, state: SessionState) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sweep(&mut sessions, now);
        sessions.insert(id, Session { owner: owner.to_owned(), state, expires_at: now + self.ttl });
    }

    /// Take a session out for `user_id` to act on.
    ///
    /// # Errors
    /// `NotFound` for an unknown or expired session, `Forbidden` when `user_id`
    /// does not own it. A foreign session stays in the registry.
    pub async fn take(&self, id: Uuid, user_id: &str) -> Result<Session, ApiError> {
        let mut sessions = self.sessions.write().await;
        sweep(&mut sessions, Instant::now());
        let owner = sessions
            .get(&id)
            .map(|s| s.owner.clone())
            .ok_or_else(|| ApiError::NotFound("This interaction has expired.".to_owned()))?;
        if owner != user_id {
            tracing::debug!(session_id = %id, user_id, "interaction by a non-owner refused");
            return Err(ApiError::Forbidden("This interaction belongs to another user.".to_owned()));
        }
        sessions
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound("This interaction has expired.".to_owned()))
    }

    pub async fn len(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        sweep(&mut sessions, Instant::now());
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn sweep(sessions: &mut HashMap<Uuid, Session>, now: Instant) {
    let before = sessions.len();
    sessions.retain(|_, s| s.expires_at > now);
    let swept = before - sessions.len();
    if swept > 0 {
        tracing::debug!(swept, "expired interaction sessions removed");
    }
}
