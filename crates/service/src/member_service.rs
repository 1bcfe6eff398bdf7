use std::sync::Arc;

use pathbot_core::{ChannelMember, Member, SummaryUser};
use pathbot_storage::Store;
use pathbot_storage::traits::MemberStore;

use crate::ServiceError;

/// Channel membership: who is a learner where.
pub struct MemberService {
    store: Arc<dyn Store>,
    admin_roles: Vec<String>,
}

impl MemberService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, admin_roles: Vec<String>) -> Self {
        Self { store, admin_roles }
    }

    #[must_use]
    pub fn admin_roles(&self) -> &[String] {
        &self.admin_roles
    }

    #[must_use]
    pub fn is_admin(&self, roles: &[String]) -> bool {
        pathbot_core::is_admin(roles, &self.admin_roles)
    }

    /// Record every learner among `members` as belonging to `channel_id`.
    ///
    /// Returns how many memberships were new.
    pub async fn register_members(
        &self,
        channel_id: &str,
        members: &[Member],
    ) -> Result<usize, ServiceError> {
        let mut added = 0;
        for member in members.iter().filter(|m| m.is_learner(&self.admin_roles)) {
            if self.store.add_user_channel(&member.user_id, &member.name, channel_id).await? {
                added += 1;
            }
        }
        tracing::info!(channel_id, added, seen = members.len(), "Channel members registered");
        Ok(added)
    }

    pub async fn channel_members(&self, channel_id: &str) -> Result<Vec<ChannelMember>, ServiceError> {
        Ok(self.store.list_channel_users(channel_id).await?)
    }

    /// Learners to report on: the live member list when the gateway sent one,
    /// otherwise the memberships recorded for the channel.
    pub async fn learners(
        &self,
        channel_id: &str,
        live_members: &[Member],
    ) -> Result<Vec<SummaryUser>, ServiceError> {
        if !live_members.is_empty() {
            return Ok(live_members
                .iter()
                .filter(|m| m.is_learner(&self.admin_roles))
                .map(|m| SummaryUser { user_id: m.user_id.clone(), user_name: m.name.clone() })
                .collect());
        }
        Ok(self
            .channel_members(channel_id)
            .await?
            .into_iter()
            .map(|m| SummaryUser { user_id: m.user_id, user_name: m.user_name })
            .collect())
    }
}
