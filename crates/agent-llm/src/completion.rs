//! Generation settings and prompt construction

use crate::Message;
use serde::{Deserialize, Serialize};

/// Sampling settings applied to every generation
///
/// These are static configuration: providers take them at construction
/// time, never per call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1000,
        }
    }
}

/// How a conversation is handed to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    /// Collapse the whole conversation into one text block
    #[default]
    Flattened,
    /// Send one provider turn per message
    Turns,
}

/// Collapse a conversation into a single prompt
///
/// Each message becomes `ROLE: content`; messages are separated by a blank
/// line and keep their order.
pub fn flatten_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
