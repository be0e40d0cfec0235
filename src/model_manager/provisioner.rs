//! Model Provisioner - resolves a model reference into a local file path

use std::path::{Path, PathBuf};

use super::downloader::{cancel_download, download_model};
use super::registry::DEFAULT_MODEL;
use super::types::{DownloadProgress, DownloadableModel, ProvisionError};

/// Fallback filename for user-picked files with an unparseable name
const CUSTOM_MODEL_FALLBACK: &str = "custom_model.task";

/// Resolves model references (bundled, saved, user-picked, or remote) into
/// ready files inside the app's private models directory.
pub struct ModelProvisioner {
    /// Directory where resolved models are stored
    models_dir: PathBuf,
    /// Directory holding bundled model assets
    assets_dir: PathBuf,
}

impl ModelProvisioner {
    /// Create a new provisioner rooted at the app data directory
    pub fn new(app_data_dir: PathBuf, assets_dir: PathBuf) -> Self {
        let models_dir = app_data_dir.join("models");

        // Ensure directory exists
        if !models_dir.exists() {
            std::fs::create_dir_all(&models_dir).ok();
        }

        Self {
            models_dir,
            assets_dir,
        }
    }

    /// Get the models directory path
    pub fn models_dir(&self) -> &PathBuf {
        &self.models_dir
    }

    /// Copy the bundled default model into private storage if not already
    /// there and return its path
    pub async fn resolve_bundled_default(&self) -> Result<PathBuf, ProvisionError> {
        let dest = self.models_dir.join(DEFAULT_MODEL);
        if dest.exists() {
            return Ok(dest);
        }

        let asset = self.assets_dir.join(DEFAULT_MODEL);
        if !asset.exists() {
            return Err(ProvisionError::AssetNotFound(DEFAULT_MODEL.to_string()));
        }

        tokio::fs::copy(&asset, &dest)
            .await
            .map_err(|e| ProvisionError::CopyFailed(format!("{:?}: {}", asset, e)))?;

        log::info!("Extracted bundled model to {:?}", dest);
        Ok(dest)
    }

    /// Return the saved path if a file still exists there
    ///
    /// A missing file is not an error; the caller falls back to the default.
    pub async fn resolve_from_saved_path(&self, path: &Path) -> Option<PathBuf> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Some(path.to_path_buf()),
            _ => None,
        }
    }

    /// Copy a user-selected file into private storage and return the new path
    ///
    /// The local filename is the source's final path segment, or a generic
    /// fallback when the source has none.
    pub async fn resolve_from_user_file(&self, source: &Path) -> Result<PathBuf, ProvisionError> {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| CUSTOM_MODEL_FALLBACK.to_string());

        let dest = self.models_dir.join(file_name);
        tokio::fs::copy(source, &dest)
            .await
            .map_err(|e| ProvisionError::CopyFailed(format!("{:?}: {}", source, e)))?;

        log::info!("Copied user model {:?} to {:?}", source, dest);
        Ok(dest)
    }

    /// Download a catalog model with progress callback
    ///
    /// Returns immediately if the file already exists locally.
    pub async fn resolve_from_download<F>(
        &self,
        model: &DownloadableModel,
        on_progress: F,
    ) -> Result<PathBuf, ProvisionError>
    where
        F: Fn(DownloadProgress) + Send + 'static,
    {
        download_model(&self.models_dir, model, on_progress).await
    }

    /// Cancel an in-progress download
    pub fn cancel_download(&self, name: &str) -> Result<(), ProvisionError> {
        cancel_download(&self.models_dir, name)
    }

    /// Get list of locally resolved model files
    pub fn local_models(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.models_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read models directory: {}", e);
                return Vec::new();
            }
        };

        let mut models = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tmp").unwrap_or(false) {
                continue;
            }
            if path.is_file() {
                if let Some(name) = path.file_name() {
                    models.push(name.to_string_lossy().to_string());
                }
            }
        }

        models.sort();
        models
    }

    /// Delete a resolved model file
    pub fn delete_model(&self, name: &str) -> Result<(), ProvisionError> {
        let path = self.models_dir.join(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| ProvisionError::CopyFailed(format!("Failed to delete model: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn provisioner_with_asset(asset_bytes: Option<&[u8]>) -> (ModelProvisioner, tempfile::TempDir, tempfile::TempDir) {
        let data_dir = tempdir().unwrap();
        let assets_dir = tempdir().unwrap();

        if let Some(bytes) = asset_bytes {
            std::fs::write(assets_dir.path().join(DEFAULT_MODEL), bytes).unwrap();
        }

        let provisioner = ModelProvisioner::new(
            data_dir.path().to_path_buf(),
            assets_dir.path().to_path_buf(),
        );
        (provisioner, data_dir, assets_dir)
    }

    #[tokio::test]
    async fn test_bundled_default_is_copied_once() {
        let (provisioner, _data, _assets) = provisioner_with_asset(Some(b"weights"));

        let first = provisioner.resolve_bundled_default().await.unwrap();
        assert!(first.exists());
        assert_eq!(std::fs::read(&first).unwrap(), b"weights");

        // Second resolve returns the extracted copy without re-copying
        let second = provisioner.resolve_bundled_default().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_asset_is_reported() {
        let (provisioner, _data, _assets) = provisioner_with_asset(None);

        let err = provisioner.resolve_bundled_default().await.unwrap_err();
        assert!(matches!(err, ProvisionError::AssetNotFound(_)));
    }

    #[tokio::test]
    async fn test_saved_path_miss_is_not_an_error() {
        let (provisioner, _data, _assets) = provisioner_with_asset(Some(b"weights"));

        let missing = provisioner
            .resolve_from_saved_path(Path::new("/nonexistent/model.task"))
            .await;
        assert!(missing.is_none());

        // Fallback path: the bundled default still resolves
        let fallback = provisioner.resolve_bundled_default().await.unwrap();
        assert!(fallback.exists());
    }

    #[tokio::test]
    async fn test_saved_path_hit_returns_path() {
        let (provisioner, data, _assets) = provisioner_with_asset(None);

        let saved = data.path().join("previously-saved.task");
        std::fs::write(&saved, b"weights").unwrap();

        let resolved = provisioner.resolve_from_saved_path(&saved).await;
        assert_eq!(resolved, Some(saved));
    }

    #[tokio::test]
    async fn test_user_file_is_copied_under_its_own_name() {
        let (provisioner, _data, _assets) = provisioner_with_asset(None);

        let source_dir = tempdir().unwrap();
        let source = source_dir.path().join("picked-model.task");
        std::fs::write(&source, b"picked").unwrap();

        let dest = provisioner.resolve_from_user_file(&source).await.unwrap();
        assert_eq!(dest, provisioner.models_dir().join("picked-model.task"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"picked");
    }

    #[tokio::test]
    async fn test_user_file_copy_failure() {
        let (provisioner, _data, _assets) = provisioner_with_asset(None);

        let err = provisioner
            .resolve_from_user_file(Path::new("/nonexistent/source.task"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::CopyFailed(_)));
    }

    #[tokio::test]
    async fn test_local_models_lists_resolved_files() {
        let (provisioner, _data, _assets) = provisioner_with_asset(Some(b"weights"));

        provisioner.resolve_bundled_default().await.unwrap();
        std::fs::write(provisioner.models_dir().join("other.task"), b"x").unwrap();
        std::fs::write(provisioner.models_dir().join("partial.task.tmp"), b"x").unwrap();

        let models = provisioner.local_models();
        assert_eq!(models, vec![DEFAULT_MODEL.to_string(), "other.task".to_string()]);
    }

    #[test]
    fn test_delete_model() {
        let data_dir = tempdir().unwrap();
        let assets_dir = tempdir().unwrap();
        let provisioner = ModelProvisioner::new(
            data_dir.path().to_path_buf(),
            assets_dir.path().to_path_buf(),
        );

        let path = provisioner.models_dir().join("doomed.task");
        std::fs::write(&path, b"x").unwrap();

        provisioner.delete_model("doomed.task").unwrap();
        assert!(!path.exists());

        // Deleting a missing model is a no-op
        provisioner.delete_model("doomed.task").unwrap();
    }
}
