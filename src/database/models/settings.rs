// Database models - Settings
use serde::{Deserialize, Serialize};

/// A single settings row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub updated_at: String,
}

/// All application settings as a structured object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllSettings {
    pub tts_language: Option<String>,
    pub auto_speak_responses: bool,
    pub saved_model_path: Option<String>,
    pub saved_model_name: Option<String>,
}
