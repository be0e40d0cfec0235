// chat-local - core engine for a local on-device LLM chat app
//
// This crate is the business core only:
// - Chat turn sequencing, context policy, and personas
// - Single-instance model lifecycle (load, generate, release)
// - Model provisioning (bundled asset, saved path, user file, download)
// - Conversation and settings persistence
//
// Presentation, speech playback, and the inference engine itself live
// behind seams and are supplied by the embedding application.

// Core modules
pub mod chat;
pub mod database;
pub mod llm_engine;
pub mod model_manager;
pub mod speech;
pub mod state;

pub use chat::{ChatController, ChatEvent, ModelState, Persona};
pub use database::{Conversation, DatabaseManager, Message, MessageStatus, Sender};
pub use llm_engine::{InferenceEngine, InferenceSession, LlmError, ModelHandle};
pub use model_manager::{
    model_store, DownloadProgress, DownloadStatus, DownloadableModel, ModelInfo,
    ModelProvisioner, ProvisionError,
};
pub use speech::{SpeechSink, TtsLanguage};
pub use state::AppState;
