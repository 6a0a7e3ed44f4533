//! Follow-up questions about a finished report, answered only from that report.

pub mod classify;
pub mod context;
pub mod prompt;
pub mod assistant;
pub mod session;

pub use classify::*;
pub use context::*;
pub use prompt::*;
pub use assistant::*;
pub use session::*;

use thiserror::Error;

use crate::pipeline::engine::EngineError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No report loaded; run an audit first")]
    NoContext,

    #[error("Query refused: {0}")]
    Refused(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] EngineError),
}
