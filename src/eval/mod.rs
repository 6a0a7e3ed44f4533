//! Offline evaluation of audit output against labelled cases.

pub mod metrics;

pub use metrics::*;
