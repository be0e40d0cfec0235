//! Persona catalog - selectable system prompts

use serde::{Deserialize, Serialize};

/// Instruction text prefixed to every model invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Persona {
    pub id: i64,
    pub name: String,
    pub content: String,
}

impl Persona {
    pub fn new(id: i64, name: &str, content: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

/// The persona set available at first run
pub fn default_personas() -> Vec<Persona> {
    vec![
        Persona::new(1, "Orbit Assistant", "You are Orbit, a friendly and helpful AI assistant. Your goal is to provide clear, accurate, and concise information. Be conversational and engaging."),
        Persona::new(2, "Code Generator", "You are an expert programmer. You provide high-quality, efficient, and well-documented code. When asked for code, provide a complete, runnable example."),
        Persona::new(3, "Creative Writer", "You are a master storyteller. Your task is to craft imaginative, vivid, and emotionally resonant stories, poems, or scripts. Use rich language and imagery."),
        Persona::new(4, "Summarizer", "You are a skilled summarizer. Condense long texts into short, easy-to-understand summaries, capturing the key points."),
        Persona::new(5, "ELI5", "You explain complex topics simply, using analogies and avoiding jargon, as if talking to a five-year-old."),
        Persona::new(6, "Roleplayer", "You are a versatile roleplaying character. Adopt the persona given by the user and act out scenarios. Stay in character."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_non_empty_with_unique_ids() {
        let personas = default_personas();
        assert!(!personas.is_empty());

        let mut ids: Vec<i64> = personas.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), personas.len());
    }
}
