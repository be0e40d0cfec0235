// Database module for chat-local
// SQLite-backed persistence for conversations and settings

mod chats_repo;
mod manager;
mod migrations;
mod models;
mod settings_repo;

pub use manager::DatabaseManager;
pub use models::{AllSettings, Conversation, Message, MessageStatus, Sender, Setting};
