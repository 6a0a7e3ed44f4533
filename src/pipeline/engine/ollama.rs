use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::repair::parse_generated_json;
use super::types::{GenerationOptions, ReviewEngine};
use super::EngineError;
use crate::config::EngineConfig;

/// Stop sequences that end a generation before chat-template artifacts leak in.
const STOP_TOKENS: &[&str] = &["```", "<start_of_turn>"];

/// How long the backend keeps the model loaded between requests.
const KEEP_ALIVE: &str = "10m";

/// Characters of the raw model output kept in a parse-failure error.
const PREVIEW_CHARS: usize = 300;

/// Timeout for the lightweight `/api/tags` probe.
const PROBE_TIMEOUT_SECS: u64 = 3;

/// Ollama HTTP client for local review-engine inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    max_attempts: usize,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
            max_attempts: crate::config::DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut client = Self::new(&config.host, &config.model, config.timeout_secs)?;
        client.max_attempts = config.max_attempts.max(1);
        Ok(client)
    }

    /// Names of the models installed on the backend.
    pub fn list_models(&self) -> Result<Vec<String>, EngineError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EngineError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| EngineError::HttpClient(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the backend answers at all.
    pub fn check_connection(&self) -> bool {
        match self.list_models() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(host = %self.base_url, error = %e, "Review engine unreachable");
                false
            }
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> EngineError {
        if e.is_connect() {
            EngineError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            EngineError::Timeout(self.timeout_secs)
        } else {
            EngineError::HttpClient(e.to_string())
        }
    }

    /// One POST to `/api/generate`, returning the raw `response` field.
    fn call(
        &self,
        instruction: &str,
        options: &GenerationOptions,
        format: Option<&str>,
    ) -> Result<String, EngineError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: instruction,
            stream: false,
            keep_alive: KEEP_ALIVE,
            format,
            options,
            stop: STOP_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EngineError::ModelNotFound(self.model.clone()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EngineError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| EngineError::HttpClient(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    keep_alive: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: &'a GenerationOptions,
    stop: &'a [&'a str],
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Deserialize)]
struct TagsModel {
    name: String,
}

impl ReviewEngine for OllamaClient {
    fn generate_structured_findings(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<serde_json::Value, EngineError> {
        let mut last_raw = String::new();

        for attempt in 1..=self.max_attempts {
            let raw = self.call(instruction, options, Some("json"))?;
            match parse_generated_json(&raw) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Review engine returned unparseable JSON");
                    last_raw = raw;
                }
            }
        }

        let preview = if last_raw.is_empty() {
            "No response captured".to_string()
        } else {
            crate::models::truncate_chars(&last_raw, PREVIEW_CHARS).to_string()
        };
        Err(EngineError::MalformedJson {
            attempts: self.max_attempts,
            preview,
        })
    }

    fn generate_text(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<String, EngineError> {
        self.call(instruction, options, None)
            .map(|text| text.trim().to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "medgemma", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 60);
        assert_eq!(client.model(), "medgemma");
    }

    #[test]
    fn from_config_applies_attempts() {
        let mut config = EngineConfig::default();
        config.max_attempts = 0;
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.max_attempts, 1);
        assert_eq!(client.model, crate::config::DEFAULT_MODEL);
    }

    #[test]
    fn request_body_shape() {
        let options = GenerationOptions::default();
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            keep_alive: KEEP_ALIVE,
            format: Some("json"),
            options: &options,
            stop: STOP_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["format"], "json");
        assert_eq!(json["keep_alive"], "10m");
        assert_eq!(json["options"]["num_ctx"], 4096);
        assert_eq!(json["stop"][1], "<start_of_turn>");
    }

    #[test]
    fn text_mode_omits_format() {
        let options = GenerationOptions::chat();
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            keep_alive: KEEP_ALIVE,
            format: None,
            options: &options,
            stop: STOP_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("format").is_none());
    }

    #[test]
    fn non_transport_failure_maps_to_http_client_error() {
        let client = OllamaClient::new("http://localhost:11434", "m", 2).unwrap();
        // A malformed URL fails inside the client before any connection is attempted.
        let err = client.client.get("not a url").send().unwrap_err();
        assert!(!err.is_connect() && !err.is_timeout());
        assert!(matches!(
            client.map_transport_error(err),
            EngineError::HttpClient(_)
        ));
    }

    #[test]
    #[ignore = "needs a closed local port"]
    fn unreachable_host_is_connection_error() {
        let client = OllamaClient::new("http://127.0.0.1:9", "m", 2).unwrap();
        let err = client
            .generate_structured_findings("x", &GenerationOptions::default())
            .unwrap_err();
        assert!(
            matches!(err, EngineError::Connection(_) | EngineError::Timeout(_)),
            "unexpected error: {err}"
        );
        assert!(!client.check_connection());
    }
}
