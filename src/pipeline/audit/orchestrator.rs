use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use super::parser::parse_findings;
use super::preprocess::prepare_inputs;
use super::prompt::build_audit_prompt;
use crate::models::{AuditOutcome, BlockedReport, SafetyReport};
use crate::pipeline::ddi::{interaction_to_flag, run_ddi_scan};
use crate::pipeline::engine::{GenerationOptions, ReviewEngine};
use crate::pipeline::grounding::{EvidenceGrounder, SourceTexts};
use crate::pipeline::safety::{
    calibrate_confidence, gate_safety_flags, validate_report_guardrails, GuardrailError,
};

/// Summary shown when the review engine could not produce findings.
pub const DEGRADED_SUMMARY: &str =
    "Review engine unavailable. Automated checks could not complete.";

pub const BLOCKED_REASON: &str = "Safety guardrail violation";

/// Turn raw engine findings into a final report with the default grounder.
///
/// parse → prepend interaction flags → ground → calibrate → guardrails → gate.
pub fn build_report(
    raw_findings: &Value,
    note: &str,
    labs: &str,
    meds: &str,
) -> Result<SafetyReport, GuardrailError> {
    build_report_with(&EvidenceGrounder::default(), raw_findings, note, labs, meds)
}

pub fn build_report_with(
    grounder: &EvidenceGrounder,
    raw_findings: &Value,
    note: &str,
    labs: &str,
    meds: &str,
) -> Result<SafetyReport, GuardrailError> {
    let mut report = parse_findings(raw_findings);

    let interactions = run_ddi_scan(meds);
    report.metadata.ddi_interactions = interactions.len();
    let mut flags: Vec<_> = interactions
        .iter()
        .map(|interaction| interaction_to_flag(interaction, meds))
        .collect();
    flags.append(&mut report.flags);
    report.flags = flags;

    let sources = SourceTexts::new(note, labs, meds);
    let report = grounder.ground_report(report, &sources);
    let report = calibrate_confidence(report);
    let report = validate_report_guardrails(report)?;
    Ok(gate_safety_flags(report))
}

/// Runs one audit request end to end against a review engine.
pub struct AuditPipeline<'a, E: ReviewEngine + ?Sized> {
    engine: &'a E,
    options: GenerationOptions,
    grounder: EvidenceGrounder,
}

impl<'a, E: ReviewEngine + ?Sized> AuditPipeline<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            options: GenerationOptions::default(),
            grounder: EvidenceGrounder::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_grounder(mut self, grounder: EvidenceGrounder) -> Self {
        self.grounder = grounder;
        self
    }

    /// Never fails: engine errors give a degraded report, guardrail
    /// violations give a blocked one.
    pub fn run_audit(&self, note: &str, labs: &str, meds: &str) -> AuditOutcome {
        let started = Instant::now();
        let prompt = build_audit_prompt(&prepare_inputs(note, labs, meds));

        let engine_started = Instant::now();
        let raw = self.engine.generate_structured_findings(&prompt, &self.options);
        let engine_ms = engine_started.elapsed().as_millis() as u64;

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, model = self.engine.model(), "Review engine failed, returning degraded report");
                let mut report = SafetyReport::degraded(DEGRADED_SUMMARY, e.to_string());
                report.metadata.model = Some(self.engine.model().to_string());
                report.metadata.timings.engine_ms = Some(engine_ms);
                report.metadata.timings.pipeline_ms = started.elapsed().as_millis() as u64;
                return AuditOutcome::Degraded(report);
            }
        };

        match build_report_with(&self.grounder, &raw, note, labs, meds) {
            Ok(mut report) => {
                report.metadata.model = Some(self.engine.model().to_string());
                report.metadata.timings.engine_ms = Some(engine_ms);
                report.metadata.timings.pipeline_ms = started.elapsed().as_millis() as u64;
                tracing::info!(
                    flag_count = report.flags.len(),
                    dropped = report.metadata.gating_dropped,
                    pipeline_ms = report.metadata.timings.pipeline_ms,
                    "Audit complete"
                );
                AuditOutcome::Complete(report)
            }
            Err(GuardrailError::MissingEvidence { violations }) => {
                tracing::warn!(violation_count = violations.len(), "Audit blocked");
                AuditOutcome::Blocked(BlockedReport {
                    generated_at: Utc::now(),
                    reason: BLOCKED_REASON.to_string(),
                    violations,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvidenceSource, FlagOrigin, Severity};
    use crate::pipeline::engine::MockReviewEngine;
    use serde_json::json;

    const NOTE: &str = "HPI: 72yo F with AFib on warfarin.\nPlan: ibuprofen 600mg TID for knee pain.";
    const LABS: &str = "INR 3.4 (H)\nCreatinine: 1.7 mg/dL";
    const MEDS: &str = "Coumadin 5mg daily\nIbuprofen 600mg TID";

    fn findings() -> Value {
        json!({
            "summary": "Bleeding risk identified.",
            "flags": [
                {
                    "category": "MISSING_MONITORING",
                    "severity": "MEDIUM",
                    "confidence": 0.7,
                    "explanation": "Elevated INR may need follow-up.",
                    "evidence": [{"quote": "inr 3.4", "source": "LABS"}]
                },
                {
                    "category": "OTHER",
                    "severity": "LOW",
                    "confidence": 0.9,
                    "explanation": "Unsupported claim that may be hallucinated.",
                    "evidence": [{"quote": "patient has a history of seizures", "source": "NOTE"}]
                }
            ],
            "missing_info_questions": ["When was INR last checked?"]
        })
    }

    #[test]
    fn interaction_flags_prepended() {
        let report = build_report(&findings(), NOTE, LABS, MEDS).unwrap();
        assert_eq!(report.metadata.ddi_interactions, 1);
        assert_eq!(report.flags[0].origin, FlagOrigin::InteractionScan);
        assert_eq!(report.flags[0].severity, Severity::High);
    }

    #[test]
    fn surviving_evidence_is_grounded() {
        let report = build_report(&findings(), NOTE, LABS, MEDS).unwrap();
        let sources = SourceTexts::new(NOTE, LABS, MEDS);
        for flag in &report.flags {
            for ev in &flag.evidence {
                if let Some(text) = sources.get(ev.source) {
                    assert!(text.contains(&ev.quote));
                }
            }
        }
        assert_eq!(report.flags[1].evidence[0].quote, "INR 3.4");
    }

    #[test]
    fn ungrounded_flag_is_gated() {
        let report = build_report(&findings(), NOTE, LABS, MEDS).unwrap();
        assert_eq!(report.flags.len(), 2);
        assert_eq!(report.metadata.gating_dropped, 1);
        assert!(report.metadata.gating_decisions[0].reason.contains("grounded"));
    }

    #[test]
    fn medium_single_quote_capped() {
        let report = build_report(&findings(), NOTE, LABS, MEDS).unwrap();
        assert_eq!(report.flags[1].confidence, 0.65);
    }

    #[test]
    fn flag_without_evidence_blocks() {
        let raw = json!({
            "summary": "s",
            "missing_info_questions": [],
            "flags": [{"severity": "HIGH", "confidence": 0.9, "explanation": "Stop warfarin", "evidence": []}]
        });
        let err = build_report(&raw, NOTE, LABS, MEDS).unwrap_err();
        let GuardrailError::MissingEvidence { violations } = err;
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn blocked_violation_names_model_flag_after_interaction_flags() {
        let raw = json!({
            "summary": "s",
            "missing_info_questions": [],
            "flags": [{"severity": "MEDIUM", "confidence": 0.9, "explanation": "Possible issue", "evidence": []}]
        });
        let err = build_report(&raw, NOTE, LABS, MEDS).unwrap_err();
        let GuardrailError::MissingEvidence { violations } = err;
        assert_eq!(violations, vec!["Flag 0 (OTHER) has no evidence.".to_string()]);
    }

    #[test]
    fn pipeline_complete_with_mock() {
        let engine = MockReviewEngine::new().with_findings(findings());
        let outcome = AuditPipeline::new(&engine).run_audit(NOTE, LABS, MEDS);
        let AuditOutcome::Complete(report) = outcome else {
            panic!("expected complete outcome");
        };
        assert_eq!(report.metadata.model.as_deref(), Some("mock-model"));
        assert!(report.metadata.timings.engine_ms.is_some());
        assert!(engine.prompts()[0].contains("Coumadin 5mg daily"));
    }

    #[test]
    fn pipeline_degrades_on_engine_failure() {
        let engine = MockReviewEngine::new().failing("http://localhost:11434");
        let outcome = AuditPipeline::new(&engine).run_audit(NOTE, LABS, MEDS);
        let AuditOutcome::Degraded(report) = outcome else {
            panic!("expected degraded outcome");
        };
        assert!(report.flags.is_empty());
        assert_eq!(report.summary, DEGRADED_SUMMARY);
        assert!(report.metadata.error.unwrap().contains("localhost"));
    }

    #[test]
    fn pipeline_blocks_on_guardrail_violation() {
        let engine = MockReviewEngine::new().with_findings(json!({
            "summary": "s",
            "flags": [{"severity": "HIGH", "explanation": "x", "evidence": []}]
        }));
        let outcome = AuditPipeline::new(&engine).run_audit(NOTE, LABS, MEDS);
        assert!(outcome.is_blocked());
        let AuditOutcome::Blocked(blocked) = outcome else {
            unreachable!()
        };
        assert_eq!(blocked.reason, BLOCKED_REASON);
    }

    #[test]
    fn demo_findings_with_clean_meds_are_empty() {
        let engine = MockReviewEngine::new();
        let outcome = AuditPipeline::new(&engine).run_audit("HPI: cough", "", "Lisinopril 10mg");
        let report = outcome.report().unwrap();
        assert!(report.flags.is_empty());
        assert_eq!(report.metadata.gating_kept, 0);
    }

    #[test]
    fn ddi_evidence_sourced_from_meds() {
        let report = build_report(&json!({}), NOTE, LABS, MEDS).unwrap();
        assert_eq!(report.flags.len(), 1);
        assert!(report.flags[0]
            .evidence
            .iter()
            .all(|e| e.source == EvidenceSource::Meds));
    }
}
