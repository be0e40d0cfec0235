//! Conversation export - shareable transcript rendering

use anyhow::{Context, Result};

use crate::database::{Message, MessageStatus};

/// Render a message sequence as shareable text.
///
/// One `{sender}: {text}` entry per settled message, blank-line separated;
/// failed turns carry their diagnostic instead of text. Streaming
/// placeholders are omitted.
pub fn transcript(messages: &[Message]) -> String {
    let entries: Vec<String> = messages
        .iter()
        .filter(|m| m.status != MessageStatus::Streaming)
        .map(|m| match m.status {
            MessageStatus::Failed => format!(
                "{}: [failed: {}]",
                m.sender.label(),
                m.error.as_deref().unwrap_or("unknown error")
            ),
            _ => format!("{}: {}", m.sender.label(), m.text),
        })
        .collect();

    entries.join("\n\n")
}

/// Serialize a message sequence as pretty-printed JSON for file sharing
pub fn to_json(messages: &[Message]) -> Result<String> {
    serde_json::to_string_pretty(messages).context("Failed to serialize conversation")
}
