//! Message and Conversation domain types.
//!
//! These are the value objects that flow through a conversation turn:
//! the user sends a message, the turn runner composes a system prompt,
//! the provider generates a reply, tools append their results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a conversation thread. One thread corresponds to one
/// checkpointed conversation in the [`crate::memory`] partition scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, context, memory)
    System,
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
///
/// Messages are immutable once appended, with one exception: the leading
/// system message is replaced wholesale every turn so context and memory
/// stay fresh (see [`Conversation::set_system`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a tool result message responding to a specific tool call.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Whether this assistant message requests one or more tool calls.
    pub fn requests_tools(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string
    pub arguments: String,
}

/// One conversation thread: ordered messages, a context snapshot map, and
/// the user identity used as the memory partition key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// The thread this conversation belongs to
    pub thread_id: ThreadId,

    /// The resolved user identity (memory partition key)
    pub user_id: String,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// Arbitrary key → value snapshot data refreshed each turn
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub context: serde_json::Map<String, serde_json::Value>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation for a thread and user.
    pub fn new(thread_id: ThreadId, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id,
            user_id: user_id.into(),
            messages: Vec::new(),
            context: serde_json::Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Install the system instruction for the upcoming turn.
    ///
    /// If a leading system message exists it is replaced, otherwise one is
    /// inserted at position zero. The first message, when present, is
    /// therefore always the system instruction currently in effect.
    pub fn set_system(&mut self, content: impl Into<String>) {
        let msg = Message::system(content);
        match self.messages.first() {
            Some(first) if first.role == Role::System => self.messages[0] = msg,
            _ => self.messages.insert(0, msg),
        }
        self.updated_at = Utc::now();
    }

    /// The most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello!");
        assert!(msg.tool_calls.is_empty());
        assert!(!msg.requests_tools());
    }

    #[test]
    fn assistant_with_tool_calls_requests_tools() {
        let mut msg = Message::assistant("");
        msg.tool_calls.push(MessageToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: "{}".into(),
        });
        assert!(msg.requests_tools());
    }

    #[test]
    fn set_system_inserts_when_absent() {
        let mut conv = Conversation::new(ThreadId::new(), "user_1");
        conv.push(Message::user("hi"));
        conv.set_system("be helpful");

        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::System);
        assert_eq!(conv.messages[0].content, "be helpful");
        assert_eq!(conv.messages[1].role, Role::User);
    }

    #[test]
    fn set_system_replaces_existing() {
        let mut conv = Conversation::new(ThreadId::new(), "user_1");
        conv.set_system("old instruction");
        conv.push(Message::user("hi"));
        conv.set_system("new instruction");

        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].content, "new instruction");
    }

    #[test]
    fn last_user_message_skips_tool_results() {
        let mut conv = Conversation::new(ThreadId::new(), "user_1");
        conv.push(Message::user("what's the weather?"));
        conv.push(Message::tool_result("call_1", "sunny"));
        assert_eq!(conv.last_user_message().unwrap().content, "what's the weather?");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }
}
