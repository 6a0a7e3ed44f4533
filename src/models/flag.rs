use serde::{Deserialize, Serialize};

use super::enums::{EvidenceSource, FlagCategory, Severity};

/// Maximum length of an evidence quote, in characters.
pub const MAX_QUOTE_CHARS: usize = 160;

/// Length of the explanation preview recorded in audit metadata.
pub const PREVIEW_CHARS: usize = 50;

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// A quote backing a safety flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub quote: String,
    pub source: EvidenceSource,
    /// Display form with numeric values emphasised. Cosmetic only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

impl Evidence {
    /// Build an evidence item, trimming and capping the quote length.
    pub fn new(quote: &str, source: EvidenceSource) -> Self {
        Self {
            quote: truncate_chars(quote.trim(), MAX_QUOTE_CHARS).to_string(),
            source,
            highlighted: None,
        }
    }
}

/// Where a flag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOrigin {
    /// Produced by the language model.
    Model,
    /// Produced by the deterministic interaction scan.
    InteractionScan,
}

/// A single safety finding surfaced to the clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFlag {
    pub category: FlagCategory,
    pub severity: Severity,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub evidence: Vec<Evidence>,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub origin: FlagOrigin,
}

impl SafetyFlag {
    /// Short explanation preview for audit metadata.
    pub fn preview(&self) -> String {
        truncate_chars(&self.explanation, PREVIEW_CHARS).to_string()
    }

    /// True when there is evidence and none of it could be grounded.
    pub fn all_evidence_unknown(&self) -> bool {
        !self.evidence.is_empty()
            && self
                .evidence
                .iter()
                .all(|e| e.source == EvidenceSource::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(severity: Severity, confidence: f32, evidence: Vec<Evidence>) -> SafetyFlag {
        SafetyFlag {
            category: FlagCategory::Other,
            severity,
            confidence,
            evidence,
            explanation: "Potential issue noted in the record".into(),
            recommendation: None,
            origin: FlagOrigin::Model,
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn evidence_quote_capped() {
        let long = "x".repeat(400);
        let ev = Evidence::new(&long, EvidenceSource::Note);
        assert_eq!(ev.quote.chars().count(), MAX_QUOTE_CHARS);
    }

    #[test]
    fn evidence_quote_trimmed() {
        let ev = Evidence::new("  INR 3.4  ", EvidenceSource::Labs);
        assert_eq!(ev.quote, "INR 3.4");
    }

    #[test]
    fn all_unknown_requires_evidence() {
        assert!(!flag(Severity::Low, 0.5, vec![]).all_evidence_unknown());
        assert!(flag(
            Severity::Low,
            0.5,
            vec![Evidence::new("a", EvidenceSource::Unknown)]
        )
        .all_evidence_unknown());
        assert!(!flag(
            Severity::Low,
            0.5,
            vec![
                Evidence::new("a", EvidenceSource::Unknown),
                Evidence::new("b", EvidenceSource::Note)
            ]
        )
        .all_evidence_unknown());
    }

    #[test]
    fn preview_is_short() {
        let mut f = flag(Severity::High, 0.9, vec![]);
        f.explanation = "y".repeat(200);
        assert_eq!(f.preview().len(), PREVIEW_CHARS);
    }

    #[test]
    fn origin_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FlagOrigin::InteractionScan).unwrap(),
            "\"interaction_scan\""
        );
    }
}
