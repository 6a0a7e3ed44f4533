//! Post-processing of findings: calibration, advisory-tone guardrails and gating.

pub mod calibrate;
pub mod guardrails;
pub mod gate;

pub use calibrate::*;
pub use guardrails::*;
pub use gate::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuardrailError {
    #[error("Safety guardrail violations: {}", violations.join("; "))]
    MissingEvidence { violations: Vec<String> },
}
