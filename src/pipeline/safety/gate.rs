use crate::models::{GatingDecision, SafetyFlag, SafetyReport, Severity};

/// Safety gate thresholds.
pub mod gating_thresholds {
    /// Any flag below this confidence is dropped.
    pub const MIN_CONFIDENCE: f32 = 0.50;
    /// HIGH flags need at least this confidence.
    pub const HIGH_SEVERITY_MIN_CONFIDENCE: f32 = 0.65;
}

use gating_thresholds::*;

/// Why a flag must be dropped, or `None` to keep it. Checks run in order and
/// the first failing one is reported.
pub fn gate_reason(flag: &SafetyFlag) -> Option<String> {
    if flag.confidence < MIN_CONFIDENCE {
        return Some(format!("Low confidence: {:.2}", flag.confidence));
    }
    if flag.evidence.is_empty() {
        return Some("No evidence".to_string());
    }
    if flag.severity == Severity::High && flag.confidence < HIGH_SEVERITY_MIN_CONFIDENCE {
        return Some(format!(
            "HIGH severity needs >= {HIGH_SEVERITY_MIN_CONFIDENCE:.2} confidence, got {:.2}",
            flag.confidence
        ));
    }
    if flag.all_evidence_unknown() {
        return Some("Evidence could not be grounded in any source".to_string());
    }
    None
}

/// Drop weak or ungrounded flags. Kept flags are not modified.
pub fn gate_safety_flags(mut report: SafetyReport) -> SafetyReport {
    let mut kept: Vec<SafetyFlag> = Vec::with_capacity(report.flags.len());
    let mut decisions: Vec<GatingDecision> = Vec::new();

    for flag in std::mem::take(&mut report.flags) {
        match gate_reason(&flag) {
            Some(reason) => {
                tracing::debug!(severity = %flag.severity, reason = %reason, "Flag gated");
                decisions.push(GatingDecision {
                    flag: flag.preview(),
                    reason,
                });
            }
            None => kept.push(flag),
        }
    }

    tracing::info!(
        kept = kept.len(),
        dropped = decisions.len(),
        "Safety gate complete"
    );

    report.metadata.gating_kept = kept.len();
    report.metadata.gating_dropped = decisions.len();
    report.metadata.gating_decisions = decisions;
    report.flags = kept;
    report
}
