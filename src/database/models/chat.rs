// Database models - Chat
use serde::{Deserialize, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "user" => Sender::User,
            "assistant" => Sender::Assistant,
            _ => Sender::User,
        }
    }

    /// Display label used in prompt context and exports
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Bot",
        }
    }
}

/// Chat message status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Complete,
    Streaming,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Complete => "complete",
            MessageStatus::Streaming => "streaming",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "complete" => MessageStatus::Complete,
            "streaming" => MessageStatus::Streaming,
            "failed" => MessageStatus::Failed,
            _ => MessageStatus::Complete,
        }
    }
}

/// A single message in a conversation
///
/// Ids are millisecond-derived and strictly increasing within the live
/// sequence. The text is mutated only while the message is Streaming; the
/// error field is populated only for Failed messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender: Sender,
    pub text: String,
    pub created_at: i64,
    pub status: MessageStatus,
    pub error: Option<String>,
}

impl Message {
    /// Create a completed user message
    pub fn user(id: i64, text: &str) -> Self {
        Self {
            id,
            sender: Sender::User,
            text: text.to_string(),
            created_at: id,
            status: MessageStatus::Complete,
            error: None,
        }
    }

    /// Create an empty assistant placeholder awaiting generation
    pub fn assistant_streaming(id: i64) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text: String::new(),
            created_at: id,
            status: MessageStatus::Streaming,
            error: None,
        }
    }
}

/// A saved, named conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub created_at: String,
}

impl Conversation {
    /// Create a new conversation record from the live message sequence
    pub fn new(name: &str, messages: Vec<Message>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            messages,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
