//! Chat module
//!
//! The controller that owns the live conversation and model lifecycle, the
//! context-assembly policy, the persona catalog, and transcript export.

pub mod context;
pub mod controller;
pub mod export;
pub mod personas;
pub mod types;

pub use controller::ChatController;
pub use personas::{default_personas, Persona};
pub use types::{ChatEvent, ModelState};
