// Database models for chat-local

mod chat;
mod settings;

pub use chat::{Conversation, Message, MessageStatus, Sender};
pub use settings::{AllSettings, Setting};
