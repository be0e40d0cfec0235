// Speech output seam for chat-local
// Playback itself lives in the platform layer; the controller only decides
// when to speak and in which language.

use serde::{Deserialize, Serialize};

/// Languages selectable for spoken responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TtsLanguage {
    English,
    Hindi,
}

impl TtsLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            TtsLanguage::English => "en",
            TtsLanguage::Hindi => "hi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TtsLanguage::English => "English",
            TtsLanguage::Hindi => "Hindi",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(TtsLanguage::English),
            "hi" => Some(TtsLanguage::Hindi),
            _ => None,
        }
    }
}

impl Default for TtsLanguage {
    fn default() -> Self {
        TtsLanguage::English
    }
}

/// Sink for spoken assistant responses
pub trait SpeechSink: Send + Sync {
    fn speak(&self, text: &str, language: TtsLanguage);
}
