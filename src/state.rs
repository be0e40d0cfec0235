// State management for chat-local
// Wires the controller to its collaborators and runs the startup sequence.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chat::ChatController;
use crate::database::DatabaseManager;
use crate::llm_engine::InferenceEngine;
use crate::model_manager::ModelProvisioner;
use crate::speech::SpeechSink;

pub struct AppState {
    /// Database manager for SQLite persistence
    pub database: Arc<DatabaseManager>,
    /// Resolves model references into local files
    pub provisioner: Arc<ModelProvisioner>,
    /// The chat-session and model-lifecycle controller
    pub controller: Arc<ChatController>,
}

impl AppState {
    /// Build the state with explicit directories and an inference engine
    pub fn new(
        app_data_dir: PathBuf,
        assets_dir: PathBuf,
        engine: Arc<dyn InferenceEngine>,
    ) -> Result<Self> {
        let database = DatabaseManager::new(app_data_dir.join("chatlocal.db"))
            .context("Failed to initialize database")?;

        Ok(Self {
            database: Arc::new(database),
            provisioner: Arc::new(ModelProvisioner::new(app_data_dir, assets_dir)),
            controller: Arc::new(ChatController::new(engine)),
        })
    }

    /// Build the state with a speech sink for spoken responses
    pub fn with_speech_sink(
        app_data_dir: PathBuf,
        assets_dir: PathBuf,
        engine: Arc<dyn InferenceEngine>,
        sink: Arc<dyn SpeechSink>,
    ) -> Result<Self> {
        let database = DatabaseManager::new(app_data_dir.join("chatlocal.db"))
            .context("Failed to initialize database")?;

        Ok(Self {
            database: Arc::new(database),
            provisioner: Arc::new(ModelProvisioner::new(app_data_dir, assets_dir)),
            controller: Arc::new(ChatController::with_speech_sink(engine, sink)),
        })
    }

    /// Default per-app data directory
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chat-local")
    }

    /// Startup sequence: apply persisted settings, then resolve and load a
    /// model (saved path first, bundled default as fallback)
    pub async fn bootstrap(&self) {
        self.controller.load_settings(&self.database).await;
        self.controller
            .auto_load(&self.provisioner, &self.database)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ModelState;
    use crate::llm_engine::{LlmError, ModelHandle};
    use crate::model_manager::DEFAULT_MODEL;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::tempdir;

    struct EchoEngine;

    struct EchoHandle;

    #[async_trait]
    impl ModelHandle for EchoHandle {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    #[async_trait]
    impl InferenceEngine for EchoEngine {
        async fn create(
            &self,
            _path: &Path,
            _max_tokens: u32,
        ) -> Result<Box<dyn ModelHandle>, LlmError> {
            Ok(Box::new(EchoHandle))
        }
    }

    #[tokio::test]
    async fn test_bootstrap_loads_bundled_default() {
        let data_dir = tempdir().unwrap();
        let assets_dir = tempdir().unwrap();
        std::fs::write(assets_dir.path().join(DEFAULT_MODEL), b"weights").unwrap();

        let state = AppState::new(
            data_dir.path().to_path_buf(),
            assets_dir.path().to_path_buf(),
            Arc::new(EchoEngine),
        )
        .unwrap();

        state.bootstrap().await;

        assert_eq!(state.controller.model_state().await, ModelState::Loaded);

        // A full turn works end to end through the wired state
        state.controller.send_user_message("round trip").await;
        let messages = state.controller.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(messages[1].text.starts_with("echo: "));
    }
}
