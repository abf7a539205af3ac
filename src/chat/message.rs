//! Conversation messages and the relay wire payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MessageId;

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing in the widget.
    User,
    /// The BrandFlow assistant.
    Assistant,
}

impl Role {
    /// Stable string form used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label shown above a message bubble.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::User => "أنت",
            Self::Assistant => "BrandFlow",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry of the conversation.
///
/// Fields are private: a message never changes once it has been appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
}

impl Message {
    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Build an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
        }
    }

    /// Message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Message author.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Project to the wire form, dropping the id.
    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A message as it travels between the widget and the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl WireMessage {
    /// Build a user wire message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant wire message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full history, oldest first, ending with the newly typed message.
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// Successful relay answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated assistant text.
    pub content: String,
}

/// Failed relay answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-facing error text.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(
            serde_json::to_value(Role::User).expect("serialize"),
            serde_json::json!("user")
        );
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.display_label(), "أنت");
        assert_eq!(Role::Assistant.display_label(), "BrandFlow");
    }

    #[test]
    fn test_wire_projection_drops_id() {
        let message = Message::user("مرحبا");
        let wire = serde_json::to_value(message.to_wire()).expect("serialize");
        assert_eq!(
            wire,
            serde_json::json!({ "role": "user", "content": "مرحبا" })
        );
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let a = Message::assistant("x");
        let b = Message::assistant("x");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.content(), b.content());
    }

    #[test]
    fn test_request_without_messages_is_empty() {
        let request: ChatRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_request_rejects_unknown_role() {
        let raw = r#"{"messages":[{"role":"system","content":"x"}]}"#;
        assert!(serde_json::from_str::<ChatRequest>(raw).is_err());
    }
}
