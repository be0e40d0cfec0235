//! LLM engine module
//!
//! The engine seam (traits an inference backend implements) and the session
//! that owns the single live model instance.

pub mod engine;
pub mod session;

pub use engine::{InferenceEngine, LlmError, ModelHandle};
pub use session::{InferenceSession, DEFAULT_MAX_TOKENS};
