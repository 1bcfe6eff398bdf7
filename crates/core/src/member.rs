use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learner recorded as a member of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMember {
    pub user_id: String,
    pub user_name: String,
    pub channel_id: String,
    pub joined_at: DateTime<Utc>,
}

/// A chat member as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    #[must_use]
    pub fn is_admin(&self, admin_roles: &[String]) -> bool {
        is_admin(&self.roles, admin_roles)
    }

    /// Members tracked for progress: humans without an admin role.
    #[must_use]
    pub fn is_learner(&self, admin_roles: &[String]) -> bool {
        !self.bot && !self.is_admin(admin_roles)
    }
}

/// Whether any of `roles` names an admin role, ignoring case.
#[must_use]
pub fn is_admin(roles: &[String], admin_roles: &[String]) -> bool {
    roles
        .iter()
        .any(|role| admin_roles.iter().any(|admin| admin.eq_ignore_ascii_case(role.trim())))
}
