//! Prompt context assembly
//!
//! The deterministic rule for how much of the conversation the model sees on
//! each turn.

use crate::database::{Message, MessageStatus, Sender};

use super::personas::Persona;

/// How many trailing messages are included when history is on
pub const HISTORY_WINDOW: usize = 10;

/// Build the prompt for one turn.
///
/// With history on: one persona header line, then the last `HISTORY_WINDOW`
/// messages of the live sequence oldest-first (Streaming placeholders are
/// skipped), each rendered as `{sender}: {text}`.
///
/// With history off: exactly two lines - the persona header and the current
/// user turn. The sequence length is irrelevant.
pub fn build_prompt(
    persona: &Persona,
    messages: &[Message],
    include_history: bool,
    user_text: &str,
) -> String {
    if include_history {
        let mut lines = vec![format!("System: {}", persona.content)];

        let start = messages.len().saturating_sub(HISTORY_WINDOW);
        for message in &messages[start..] {
            if message.status == MessageStatus::Streaming {
                continue;
            }
            lines.push(format!("{}: {}", message.sender.label(), message.text));
        }

        lines.join("\n")
    } else {
        format!(
            "System: {}\n{}: {}",
            persona.content,
            Sender::User.label(),
            user_text
        )
    }
}
