use std::cell::RefCell;

use super::types::{GenerationOptions, ReviewEngine};
use super::EngineError;

/// Canned structured output returned in demo mode.
pub fn demo_findings() -> serde_json::Value {
    serde_json::json!({
        "summary": "Demo mode: no risks detected.",
        "flags": [],
        "missing_info_questions": [],
    })
}

/// Mock review engine for tests and offline demos.
pub struct MockReviewEngine {
    findings: Result<serde_json::Value, String>,
    text: Result<String, String>,
    prompts: RefCell<Vec<String>>,
}

impl MockReviewEngine {
    pub fn new() -> Self {
        Self {
            findings: Ok(demo_findings()),
            text: Ok("This is a mock review engine response.".to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn with_findings(mut self, findings: serde_json::Value) -> Self {
        self.findings = Ok(findings);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Ok(text.to_string());
        self
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn failing(mut self, host: &str) -> Self {
        self.findings = Err(host.to_string());
        self.text = Err(host.to_string());
        self
    }

    /// Instructions received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Default for MockReviewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewEngine for MockReviewEngine {
    fn generate_structured_findings(
        &self,
        instruction: &str,
        _options: &GenerationOptions,
    ) -> Result<serde_json::Value, EngineError> {
        self.prompts.borrow_mut().push(instruction.to_string());
        self.findings
            .clone()
            .map_err(EngineError::Connection)
    }

    fn generate_text(
        &self,
        instruction: &str,
        _options: &GenerationOptions,
    ) -> Result<String, EngineError> {
        self.prompts.borrow_mut().push(instruction.to_string());
        self.text.clone().map_err(EngineError::Connection)
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_demo_findings() {
        let engine = MockReviewEngine::new();
        let value = engine
            .generate_structured_findings("prompt", &GenerationOptions::default())
            .unwrap();
        assert_eq!(value["flags"].as_array().unwrap().len(), 0);
        assert_eq!(engine.prompts(), vec!["prompt".to_string()]);
    }

    #[test]
    fn mock_returns_configured_text() {
        let engine = MockReviewEngine::new().with_text("Flag 1 was raised because of INR 3.4.");
        let text = engine.generate_text("q", &GenerationOptions::chat()).unwrap();
        assert!(text.contains("INR"));
    }

    #[test]
    fn failing_mock_is_connection_error() {
        let engine = MockReviewEngine::new().failing("http://localhost:11434");
        let err = engine
            .generate_structured_findings("p", &GenerationOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Connection(_)));
        assert!(engine.generate_text("p", &GenerationOptions::chat()).is_err());
    }
}
