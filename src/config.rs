use thiserror::Error;

use crate::pipeline::engine::GenerationOptions;

/// Application-level constants
pub const APP_NAME: &str = "Sentinel";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Ollama endpoint when `OLLAMA_HOST` is not set.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default review model.
pub const DEFAULT_MODEL: &str = "amsaravi/medgemma-4b-it:q6";

/// Blocking request timeout for one inference call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Attempts made when the model output is not parseable JSON.
pub const DEFAULT_MAX_ATTEMPTS: usize = 2;

/// Whether this is a debug build.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "sentinel_lib=debug,sentinel=debug"
    } else {
        "sentinel_lib=info,sentinel=info"
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which inference backend the host wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    Mock,
}

/// Connection and generation settings for the review engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub backend: BackendKind,
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_attempts: usize,
    pub options: GenerationOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            options: GenerationOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Build from the process environment.
    ///
    /// Recognised keys: `OLLAMA_HOST`, `SENTINEL_MODEL`, `SENTINEL_TIMEOUT_SECS`,
    /// `SENTINEL_BACKEND` (`ollama` | `mock`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().trim_end_matches('/').to_string();
        }

        if let Some(model) = lookup("SENTINEL_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(raw) = lookup("SENTINEL_TIMEOUT_SECS") {
            config.timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SENTINEL_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("SENTINEL_BACKEND") {
            config.backend = match raw.trim().to_lowercase().as_str() {
                "ollama" => BackendKind::Ollama,
                "mock" => BackendKind::Mock,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SENTINEL_BACKEND",
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}
