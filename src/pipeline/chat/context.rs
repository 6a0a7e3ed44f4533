use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{truncate_chars, SafetyFlag, SafetyReport};

/// Characters of the clinical note carried into the chat context.
const INPUT_SUMMARY_CHARS: usize = 2_000;

/// Read-only view of one finished report for the chat assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatContext {
    pub fingerprint: String,
    pub flags: Vec<SafetyFlag>,
    /// Flag ordinal → its evidence quotes joined with " | ".
    pub evidence_index: BTreeMap<usize, String>,
    pub missing_info: Vec<String>,
    pub input_summary: String,
}

#[derive(Serialize)]
struct FingerprintView<'a> {
    summary: &'a str,
    flags: &'a [SafetyFlag],
    missing_info_questions: &'a [String],
}

/// Content hash of a report. Ignores the id and timestamp so an identical
/// re-run maps to the same context.
pub fn report_fingerprint(report: &SafetyReport) -> String {
    let view = FingerprintView {
        summary: &report.summary,
        flags: &report.flags,
        missing_info_questions: &report.missing_info_questions,
    };
    let bytes = serde_json::to_vec(&view).unwrap_or_default();
    format!("{:x}", Sha256::digest(&bytes))
}

pub fn build_chat_context(report: &SafetyReport, input_summary: &str) -> ChatContext {
    let evidence_index = report
        .flags
        .iter()
        .enumerate()
        .map(|(i, flag)| {
            let quotes: Vec<&str> = flag.evidence.iter().map(|e| e.quote.as_str()).collect();
            (i, quotes.join(" | "))
        })
        .collect();

    ChatContext {
        fingerprint: report_fingerprint(report),
        flags: report.flags.clone(),
        evidence_index,
        missing_info: report.missing_info_questions.clone(),
        input_summary: input_summary.to_string(),
    }
}

/// Reuse `old` when it was built from the same report content, otherwise
/// build a fresh context.
pub fn reset_chat_context(
    old: Option<ChatContext>,
    report: &SafetyReport,
    input_summary: &str,
) -> ChatContext {
    let fingerprint = report_fingerprint(report);
    match old {
        Some(context) if context.fingerprint == fingerprint => context,
        _ => {
            tracing::debug!(flag_count = report.flags.len(), "Chat context rebuilt");
            build_chat_context(report, input_summary)
        }
    }
}

/// Short description of the inputs for the chat prompt.
pub fn summarize_inputs(note: &str) -> String {
    format!(
        "Clinical Note Content:\n{}",
        truncate_chars(note, INPUT_SUMMARY_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{evidence, flag, report};
    use crate::models::{EvidenceSource, Severity};

    fn sample() -> SafetyReport {
        report(vec![flag(
            Severity::High,
            0.9,
            vec![
                evidence("INR 3.4", EvidenceSource::Labs),
                evidence("Coumadin 5mg daily", EvidenceSource::Meds),
            ],
        )])
    }

    #[test]
    fn fingerprint_ignores_id_and_timestamp() {
        let a = sample();
        let b = sample();
        assert_ne!(a.id, b.id);
        assert_eq!(report_fingerprint(&a), report_fingerprint(&b));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = sample();
        let mut b = sample();
        b.flags[0].confidence = 0.7;
        assert_ne!(report_fingerprint(&a), report_fingerprint(&b));
    }

    #[test]
    fn evidence_index_joins_quotes() {
        let ctx = build_chat_context(&sample(), "summary");
        assert_eq!(ctx.evidence_index[&0], "INR 3.4 | Coumadin 5mg daily");
    }

    #[test]
    fn same_report_reuses_context() {
        let first = build_chat_context(&sample(), "first summary");
        let reused = reset_chat_context(Some(first.clone()), &sample(), "second summary");
        assert_eq!(reused, first);
    }

    #[test]
    fn changed_report_rebuilds_context() {
        let first = build_chat_context(&sample(), "first");
        let rebuilt = reset_chat_context(Some(first.clone()), &report(vec![]), "second");
        assert_ne!(rebuilt.fingerprint, first.fingerprint);
        assert!(rebuilt.flags.is_empty());
        assert_eq!(rebuilt.input_summary, "second");
    }

    #[test]
    fn summary_is_capped() {
        let note = "n".repeat(5_000);
        let summary = summarize_inputs(&note);
        assert!(summary.starts_with("Clinical Note Content:\n"));
        assert_eq!(summary.chars().count(), "Clinical Note Content:\n".len() + 2_000);
    }
}
