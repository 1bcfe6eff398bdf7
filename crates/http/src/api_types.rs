//! Request and reply bodies of the command surface.

use std::collections::HashMap;

use pathbot_core::env_config::{env_list_with_default, env_parse_with_default};
use pathbot_core::{Member, PageDirection};
use serde::{Deserialize, Serialize};

/// A slash command as forwarded by the chat gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandRequest {
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    /// Live members of the channel, when the gateway can list them.
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl CommandRequest {
    /// Trimmed, non-empty argument value.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRequest {
    pub user_id: String,
    pub action: InteractionAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionAction {
    Select { value: String },
    Submit {
        #[serde(default)]
        fields: HashMap<String, String>,
    },
    Confirm { accepted: bool },
    Page { direction: PageDirection },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub multiline: bool,
}

impl FormField {
    pub fn line(name: &str, label: &str) -> Self {
        Self { name: name.to_owned(), label: label.to_owned(), placeholder: None, multiline: false }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_owned());
        self
    }

    #[must_use]
    pub const fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

/// A survey form addressed to one member, delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastForm {
    pub user_id: String,
    pub session_id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

/// What the gateway should show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandReply {
    Message {
        text: String,
    },
    Error {
        kind: String,
        text: String,
    },
    Menu {
        session_id: String,
        prompt: String,
        options: Vec<MenuOption>,
    },
    Form {
        session_id: String,
        title: String,
        fields: Vec<FormField>,
    },
    Confirm {
        session_id: String,
        text: String,
    },
    Pages {
        session_id: String,
        /// One-based.
        page: usize,
        total: usize,
        text: String,
    },
    Broadcast {
        text: String,
        forms: Vec<BroadcastForm>,
    },
}

impl CommandReply {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    pub fn error(kind: &str, text: impl Into<String>) -> Self {
        Self::Error { kind: kind.to_owned(), text: text.into() }
    }

    /// Whether the reply leaves an interaction open for the session.
    pub const fn awaits_interaction(&self) -> bool {
        matches!(self, Self::Menu { .. } | Self::Form { .. } | Self::Confirm { .. } | Self::Pages { .. })
    }
}

/// Body of a member-join event.
#[derive(Debug, Clone, Deserialize)]
pub struct MembersJoined {
    pub channel_id: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Serialize)]
pub struct MembersJoinedResponse {
    pub added: usize,
}

#[derive(Debug, Serialize)]
#[non_exhaustive]
pub struct VersionResponse {
    pub version: &'static str,
}

/// Command-surface settings read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Settings {
    pub admin_roles: Vec<String>,
    pub utc_offset_minutes: i32,
    pub session_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_roles: pathbot_core::constants::DEFAULT_ADMIN_ROLES
                .iter()
                .map(|r| (*r).to_owned())
                .collect(),
            utc_offset_minutes: 0,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;

impl Settings {
    pub fn from_env() -> Self {
        Self {
            admin_roles: env_list_with_default(
                "PATHBOT_ADMIN_ROLES",
                pathbot_core::constants::DEFAULT_ADMIN_ROLES,
            ),
            utc_offset_minutes: env_parse_with_default("PATHBOT_UTC_OFFSET_MINUTES", 0_i32),
            session_ttl_secs: env_parse_with_default(
                "PATHBOT_SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )
            .max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn interaction_actions_are_tagged() {
        let raw = r#"{"user_id":"u1","action":{"type":"page","direction":"next"}}"#;
        let req: InteractionRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(req.action, InteractionAction::Page { direction: PageDirection::Next }));

        let raw = r#"{"user_id":"u1","action":{"type":"submit"}}"#;
        let req: InteractionRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(req.action, InteractionAction::Submit { ref fields } if fields.is_empty()));
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn replies_serialize_with_type_tag() {
        let value = serde_json::to_value(CommandReply::message("hi")).unwrap();
        assert_eq!(value, serde_json::json!({"type": "message", "text": "hi"}));
        let value = serde_json::to_value(CommandReply::error("forbidden", "no")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["kind"], "forbidden");
    }

    #[test]
    fn blank_args_are_absent() {
        let mut req = CommandRequest::default();
        req.args.insert("name".to_owned(), "  ".to_owned());
        req.args.insert("week".to_owned(), " 2 ".to_owned());
        assert_eq!(req.arg("name"), None);
        assert_eq!(req.arg("week"), Some("2"));
    }
}
