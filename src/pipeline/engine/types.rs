use serde::{Deserialize, Serialize};

use super::EngineError;

/// Sampling options forwarded to the inference backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub num_ctx: u32,
    pub num_predict: u32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            num_ctx: 4096,
            num_predict: 512,
            top_k: 40,
            top_p: 0.9,
        }
    }
}

impl GenerationOptions {
    /// Shorter, deterministic settings for conversational replies.
    pub fn chat() -> Self {
        Self {
            num_predict: 256,
            ..Self::default()
        }
    }
}

/// Local review engine abstraction (allows mocking in tests).
pub trait ReviewEngine {
    /// Run an instruction in structured mode. Must return parsed JSON or fail.
    fn generate_structured_findings(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<serde_json::Value, EngineError>;

    /// Run an instruction in free-text mode.
    fn generate_text(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<String, EngineError>;

    /// Model identifier recorded in report metadata.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_deterministic() {
        let options = GenerationOptions::default();
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.num_ctx, 4096);
        assert_eq!(options.num_predict, 512);
    }

    #[test]
    fn chat_options_limit_length() {
        let options = GenerationOptions::chat();
        assert_eq!(options.num_predict, 256);
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.top_k, 40);
    }
}
