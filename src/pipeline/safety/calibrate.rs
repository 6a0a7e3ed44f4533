use crate::models::{CalibrationAdjustment, SafetyFlag, SafetyReport, Severity};

/// Confidence calibration thresholds.
pub mod calibration_thresholds {
    /// HIGH flags with at least this many evidence items are corroborated.
    pub const CORROBORATION_MIN_EVIDENCE: usize = 2;
    /// Floor for corroborated HIGH flags.
    pub const HIGH_CORROBORATED_FLOOR: f32 = 0.80;
    /// Cap for MEDIUM flags backed by a single quote (or none).
    pub const MEDIUM_WEAK_EVIDENCE_CAP: f32 = 0.65;
    /// Cap for LOW flags.
    pub const LOW_CAP: f32 = 0.55;
}

use calibration_thresholds::*;

/// Calibrated confidence for one flag. Severity partitions are disjoint, so at
/// most one rule applies.
pub fn calibrated_confidence(flag: &SafetyFlag) -> f32 {
    let evidence_count = flag.evidence.len();
    match flag.severity {
        Severity::High if evidence_count >= CORROBORATION_MIN_EVIDENCE => {
            flag.confidence.max(HIGH_CORROBORATED_FLOOR)
        }
        Severity::Medium if evidence_count <= 1 => flag.confidence.min(MEDIUM_WEAK_EVIDENCE_CAP),
        Severity::Low => flag.confidence.min(LOW_CAP),
        _ => flag.confidence,
    }
}

/// Apply calibration to every flag, recording each change.
pub fn calibrate_confidence(mut report: SafetyReport) -> SafetyReport {
    for flag in &mut report.flags {
        let calibrated = calibrated_confidence(flag);
        if calibrated != flag.confidence {
            tracing::debug!(
                severity = %flag.severity,
                from = flag.confidence,
                to = calibrated,
                "Confidence calibrated"
            );
            report.metadata.calibration_adjustments.push(CalibrationAdjustment {
                flag_preview: flag.preview(),
                from: flag.confidence,
                to: calibrated,
            });
            flag.confidence = calibrated;
        }
    }
    report
}
