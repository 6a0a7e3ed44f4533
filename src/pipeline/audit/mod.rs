//! One audit request: prompt the review engine, then ground, calibrate,
//! guard and gate its findings.

pub mod preprocess;
pub mod prompt;
pub mod parser;
pub mod orchestrator;

pub use preprocess::*;
pub use prompt::*;
pub use parser::*;
pub use orchestrator::*;
