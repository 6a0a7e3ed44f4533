use serde::{Deserialize, Serialize};

/// Terms that signal diagnostic, treatment or imaging intent.
const DISALLOWED_TERMS: &[&str] = &[
    "diagnose",
    "diagnosis",
    "cancer",
    "tumor",
    "fracture",
    "broken",
    "treatment",
    "prescribe",
    "dosage",
    "dose",
    "medication",
    "medicine",
    "change",
    "switch",
    "stop",
    "start",
    "interpret",
    "scan",
    "x-ray",
    "image",
    "what do i have",
    "am i sick",
];

/// Terms that make a question about the report itself.
const CLARIFICATION_TERMS: &[&str] = &["why", "explain", "flag"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Clarify,
    Disallowed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryClassification {
    pub allowed: bool,
    pub reason: String,
    pub category: QueryCategory,
}

/// Decide whether a chat turn may reach the model at all.
pub fn classify_query(text: &str) -> QueryClassification {
    let lower = text.to_lowercase();

    let disallowed = DISALLOWED_TERMS.iter().any(|t| lower.contains(t));
    let clarifying = CLARIFICATION_TERMS.iter().any(|t| lower.contains(t));

    if disallowed && !clarifying {
        return QueryClassification {
            allowed: false,
            reason: "Request involves diagnosis, treatment advice, or image interpretation."
                .to_string(),
            category: QueryCategory::Disallowed,
        };
    }

    QueryClassification {
        allowed: true,
        reason: "Safe clarification".to_string(),
        category: QueryCategory::Clarify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescribing_question_refused() {
        let c = classify_query("What medication should I prescribe?");
        assert!(!c.allowed);
        assert_eq!(c.category, QueryCategory::Disallowed);
    }

    #[test]
    fn flag_explanation_allowed() {
        let c = classify_query("Why was the medication flag raised?");
        assert!(c.allowed);
        assert_eq!(c.category, QueryCategory::Clarify);
    }

    #[test]
    fn imaging_refused() {
        assert!(!classify_query("Can you read this X-ray?").allowed);
    }

    #[test]
    fn phrase_terms_refused() {
        assert!(!classify_query("So what do I have, doctor?").allowed);
    }

    #[test]
    fn neutral_question_allowed() {
        assert!(classify_query("Which lab values were cited?").allowed);
    }

    #[test]
    fn explain_overrides_treatment_term() {
        assert!(classify_query("Explain the dose concern").allowed);
    }
}
