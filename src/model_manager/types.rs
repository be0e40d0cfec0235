//! Model Manager Types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error types for model provisioning
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// The bundled default model is missing from the assets directory
    #[error("Bundled model asset not found: {0}")]
    AssetNotFound(String),
    /// Copying a model file into private storage failed
    #[error("Failed to copy model file: {0}")]
    CopyFailed(String),
    /// Fetching a remote model failed
    #[error("Failed to download model: {0}")]
    DownloadFailed(String),
}

/// Information about a downloadable model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadableModel {
    /// Model file name (also used as the local filename)
    pub name: String,
    /// Description
    pub description: String,
    /// Download URL
    pub url: String,
    /// Human-readable size label
    pub size: String,
}

/// Download progress information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub name: String,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub percent: f32,
    pub status: DownloadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DownloadStatus {
    Downloading,
    Complete,
    Failed(String),
}

/// The currently resolved, loadable model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: String,
    pub loaded_at: i64,
}

impl ModelInfo {
    pub fn new(name: &str, path: PathBuf, size: &str) -> Self {
        Self {
            name: name.to_string(),
            path,
            size: size.to_string(),
            loaded_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
