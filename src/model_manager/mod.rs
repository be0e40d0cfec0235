//! Model Manager
//!
//! The static model catalog plus the provisioner that turns a model
//! reference (bundled, saved, user-picked, or remote) into a ready local
//! file.

pub mod downloader;
pub mod provisioner;
pub mod registry;
pub mod types;

pub use provisioner::ModelProvisioner;
pub use registry::{find_model, model_store, DEFAULT_MODEL};
pub use types::{DownloadProgress, DownloadStatus, DownloadableModel, ModelInfo, ProvisionError};
