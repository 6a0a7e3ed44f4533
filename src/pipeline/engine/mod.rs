pub mod types;
pub mod repair;
pub mod ollama;
pub mod mock;

pub use types::*;
pub use repair::*;
pub use ollama::*;
pub use mock::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Review engine is not reachable at {0}")]
    Connection(String),

    #[error("Review engine timed out after {0}s")]
    Timeout(u64),

    #[error("Model '{0}' not found on the review engine. Run `ollama pull {0}`.")]
    ModelNotFound(String),

    #[error("Review engine returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Failed to parse valid JSON after {attempts} attempts. Response preview: {preview}")]
    MalformedJson { attempts: usize, preview: String },
}
