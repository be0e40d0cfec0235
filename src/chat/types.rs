//! Chat controller types

use serde::{Deserialize, Serialize};

use crate::model_manager::ModelInfo;

/// Lifecycle of the single process-wide model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Idle,
    Loading,
    Loaded,
    Generating,
    Error,
}

/// Change notifications emitted by the controller
///
/// Delivered in the order the controller issued them; a presentation layer
/// subscribes and re-reads the relevant state on each event.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The live message sequence changed (append, mutation, clear, replace)
    MessagesChanged,
    /// The model lifecycle state changed
    ModelStateChanged(ModelState),
    /// A new model artifact became active (None while nothing is resolved)
    ModelChanged(Option<ModelInfo>),
    /// The observable status/error slot changed
    StatusChanged(Option<String>),
    /// The persona set or active persona changed
    PersonasChanged,
}
