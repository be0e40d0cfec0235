//! Inference engine seam
//!
//! The on-device engine is an external capability: given a model file it
//! produces a handle that turns prompts into completions. Everything behind
//! these two traits is opaque to the rest of the crate.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error types for model loading and generation
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The file at the given path is missing, corrupt, or unsupported
    #[error("Invalid model file: {0}")]
    InvalidModelFile(String),
    /// Generation was requested with no model loaded
    #[error("Model not loaded")]
    NotLoaded,
    /// The underlying engine failed while generating
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

/// A live, loaded model instance
///
/// Engine resources are freed when the handle is dropped.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    /// Produce a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Factory for model handles
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Initialize a model from the local file at `path`
    async fn create(
        &self,
        path: &Path,
        max_tokens: u32,
    ) -> Result<Box<dyn ModelHandle>, LlmError>;
}
