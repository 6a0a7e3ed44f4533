use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EvidenceSource;
use super::flag::SafetyFlag;

/// Top-level result of one audit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub flags: Vec<SafetyFlag>,
    pub missing_info_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_demographics: Option<serde_json::Value>,
    pub metadata: ReportMetadata,
}

impl SafetyReport {
    pub fn new(summary: String, flags: Vec<SafetyFlag>, missing_info_questions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            summary,
            flags,
            missing_info_questions,
            patient_demographics: None,
            metadata: ReportMetadata::default(),
        }
    }

    /// A report with zero flags and an explanatory summary, used when the
    /// review engine could not produce findings.
    pub fn degraded(summary: &str, error: String) -> Self {
        let mut report = Self::new(summary.to_string(), vec![], vec![]);
        report.metadata.error = Some(error);
        report
    }
}

/// Audit trail for every decision the pipeline took on a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Interactions found by the deterministic scan.
    pub ddi_interactions: usize,
    /// Missing or malformed keys in the engine output that were defaulted.
    pub shape_repairs: Vec<String>,
    pub evidence_repairs: Vec<EvidenceRepair>,
    pub calibration_adjustments: Vec<CalibrationAdjustment>,
    pub guardrail_rewrites: Vec<GuardrailRewrite>,
    pub gating_kept: usize,
    pub gating_dropped: usize,
    pub gating_decisions: Vec<GatingDecision>,
    pub timings: StageTimings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How the grounder resolved one evidence item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundingOutcome {
    /// Exact substring of the claimed source.
    Verified,
    /// Found by case-insensitive search; quote case and/or source corrected.
    Corrected,
    /// Replaced by the best-matching source line.
    FuzzyRecovered { score: f64 },
    /// No source matched; left as UNKNOWN.
    Unresolved,
}

/// A grounding decision that changed (or failed to ground) an evidence item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRepair {
    pub flag_index: usize,
    pub evidence_index: usize,
    pub claimed_source: EvidenceSource,
    pub resolved_source: EvidenceSource,
    pub outcome: GroundingOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAdjustment {
    pub flag_preview: String,
    pub from: f32,
    pub to: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailRewrite {
    pub flag_preview: String,
    pub field: String,
    pub action: String,
}

/// Why a flag was removed by the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingDecision {
    pub flag: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_ms: Option<u64>,
    pub pipeline_ms: u64,
}

/// Returned instead of a report when a guardrail contract is violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedReport {
    pub generated_at: DateTime<Utc>,
    pub reason: String,
    pub violations: Vec<String>,
}

/// What an audit request produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Findings were grounded, calibrated, sanitized and gated.
    Complete(SafetyReport),
    /// The review engine failed; zero flags and an explanatory summary.
    Degraded(SafetyReport),
    /// A guardrail contract was violated; nothing from this request is shown.
    Blocked(BlockedReport),
}

impl AuditOutcome {
    pub fn report(&self) -> Option<&SafetyReport> {
        match self {
            Self::Complete(r) | Self::Degraded(r) => Some(r),
            Self::Blocked(_) => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}
