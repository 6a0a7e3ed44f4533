use std::collections::HashSet;

use super::GuardrailError;
use crate::models::{FlagOrigin, GuardrailRewrite, SafetyReport};

/// Imperative verbs that turn an advisory finding into an order.
pub const UNSAFE_VERBS: &[&str] = &["start", "stop", "discontinue", "order", "administer"];

/// Words that mark text as advisory.
pub const CAUTIOUS_WORDS: &[&str] = &[
    "may", "could", "consider", "possible", "potential", "review", "verify", "evaluate", "monitor",
];

/// Prefix forced onto explanations that carry no advisory wording.
pub const REVIEW_PREFIX: &str = "Review Item: ";

const REPLACEMENT: &str = "Review";

/// Lowercase with `.` and `,` removed.
fn normalize_token(word: &str) -> String {
    word.to_lowercase().replace(['.', ','], "")
}

/// Whitespace-delimited tokens, normalized.
fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(normalize_token).collect()
}

fn is_unsafe_verb(word: &str) -> bool {
    let token = normalize_token(word);
    UNSAFE_VERBS.contains(&token.as_str())
}

pub fn contains_unsafe_action_language(text: &str) -> bool {
    let tokens = tokens(text);
    UNSAFE_VERBS.iter().any(|v| tokens.contains(*v))
}

pub fn contains_cautious_language(text: &str) -> bool {
    let tokens = tokens(text);
    CAUTIOUS_WORDS.iter().any(|w| tokens.contains(*w))
}

/// Replace every whitespace-delimited token that is a directive verb with
/// "Review", keeping surrounding `.`/`,` and whitespace. Compounds such as
/// "non-stop" are single tokens and stay untouched.
pub fn sanitize_text(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for piece in text.split_inclusive(char::is_whitespace) {
        let word = piece.trim_end();
        if word.is_empty() || !is_unsafe_verb(word) {
            sanitized.push_str(piece);
            continue;
        }
        let core = word.trim_matches(['.', ',']);
        let start = word.len() - word.trim_start_matches(['.', ',']).len();
        sanitized.push_str(&word[..start]);
        sanitized.push_str(REPLACEMENT);
        sanitized.push_str(&word[start + core.len()..]);
        sanitized.push_str(&piece[word.len()..]);
    }
    sanitized
}

/// Enforce advisory tone on every flag and reject flags with no evidence.
///
/// Rewrites are recorded in metadata. Any flag without evidence fails the
/// whole report.
pub fn validate_report_guardrails(mut report: SafetyReport) -> Result<SafetyReport, GuardrailError> {
    let mut violations: Vec<String> = Vec::new();
    let mut rewrites: Vec<GuardrailRewrite> = Vec::new();

    let mut model_ordinal = 0usize;
    let mut scan_ordinal = 0usize;

    for flag in report.flags.iter_mut() {
        // Ordinals count flags of the same origin.
        let label = match flag.origin {
            FlagOrigin::Model => {
                model_ordinal += 1;
                format!("Flag {}", model_ordinal - 1)
            }
            FlagOrigin::InteractionScan => {
                scan_ordinal += 1;
                format!("Interaction flag {}", scan_ordinal - 1)
            }
        };

        if contains_unsafe_action_language(&flag.explanation) {
            flag.explanation = sanitize_text(&flag.explanation);
            rewrites.push(GuardrailRewrite {
                flag_preview: flag.preview(),
                field: "explanation".into(),
                action: "directive_verb_replaced".into(),
            });
        }

        if let Some(recommendation) = flag.recommendation.as_mut() {
            if contains_unsafe_action_language(recommendation) {
                *recommendation = sanitize_text(recommendation);
                rewrites.push(GuardrailRewrite {
                    flag_preview: flag.preview(),
                    field: "recommendation".into(),
                    action: "directive_verb_replaced".into(),
                });
            }
        }

        let combined = format!(
            "{} {}",
            flag.explanation,
            flag.recommendation.as_deref().unwrap_or("")
        );
        if !contains_cautious_language(&combined) {
            flag.explanation = format!("{REVIEW_PREFIX}{}", flag.explanation);
            rewrites.push(GuardrailRewrite {
                flag_preview: flag.preview(),
                field: "explanation".into(),
                action: "review_prefix_added".into(),
            });
        }

        if flag.evidence.is_empty() {
            violations.push(format!("{label} ({}) has no evidence.", flag.category));
        }
    }

    if !violations.is_empty() {
        tracing::warn!(
            violation_count = violations.len(),
            "Guardrail violations, report blocked"
        );
        return Err(GuardrailError::MissingEvidence { violations });
    }

    tracing::info!(rewrites = rewrites.len(), "Guardrails passed");
    report.metadata.guardrail_rewrites.extend(rewrites);
    Ok(report)
}
