use serde::{Deserialize, Serialize};

use crate::models::{FlagCategory, SafetyFlag, Severity};
use crate::pipeline::grounding::SourceTexts;

/// A labelled issue an audit is expected to find.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthItem {
    pub id: String,
    pub category: FlagCategory,
    pub severity: Severity,
    /// Lowercase terms; a flag matches if its explanation contains any. Empty
    /// means category alone decides.
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::High => 3.0,
        Severity::Medium => 2.0,
        Severity::Low => 1.0,
    }
}

/// (precision, recall, f1). Zero denominators give 0.0.
pub fn precision_recall_f1(tp: usize, fp: usize, fn_: usize) -> (f64, f64, f64) {
    let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}

/// Recall weighted HIGH 3, MEDIUM 2, LOW 1. Nothing to find counts as 1.0.
pub fn severity_weighted_recall(matched: &[&GroundTruthItem], all: &[GroundTruthItem]) -> f64 {
    if all.is_empty() {
        return 1.0;
    }
    let total: f64 = all.iter().map(|g| severity_weight(g.severity)).sum();
    let recovered: f64 = matched.iter().map(|g| severity_weight(g.severity)).sum();
    recovered / total
}

/// Recall over HIGH items only. No HIGH items counts as 1.0.
pub fn high_severity_recall(matched: &[&GroundTruthItem], all: &[GroundTruthItem]) -> f64 {
    let high_total = all.iter().filter(|g| g.severity == Severity::High).count();
    if high_total == 0 {
        return 1.0;
    }
    let high_found = matched
        .iter()
        .filter(|g| g.severity == Severity::High)
        .count();
    high_found as f64 / high_total as f64
}

/// A flag is grounded when it has evidence and every quote appears,
/// case-insensitively, somewhere in the combined sources.
pub fn flag_is_grounded(flag: &SafetyFlag, sources: &SourceTexts<'_>) -> bool {
    if flag.evidence.is_empty() {
        return false;
    }
    let combined = format!("{}\n{}\n{}", sources.note, sources.labs, sources.meds).to_lowercase();
    flag.evidence
        .iter()
        .all(|e| combined.contains(&e.quote.to_lowercase()))
}

/// Fraction of flags that are grounded. No flags counts as 1.0.
pub fn evidence_grounding_rate(flags: &[SafetyFlag], sources: &SourceTexts<'_>) -> f64 {
    if flags.is_empty() {
        return 1.0;
    }
    let grounded = flags.iter().filter(|f| flag_is_grounded(f, sources)).count();
    grounded as f64 / flags.len() as f64
}

fn flag_matches(flag: &SafetyFlag, item: &GroundTruthItem) -> bool {
    if flag.category != item.category {
        return false;
    }
    if item.keywords.is_empty() {
        return true;
    }
    let explanation = flag.explanation.to_lowercase();
    item.keywords
        .iter()
        .any(|k| explanation.contains(&k.to_lowercase()))
}

/// Scores for one labelled case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseScore {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub weighted_recall: f64,
    pub high_severity_recall: f64,
    pub grounding_rate: f64,
}

/// Greedy one-to-one matching of flags to labelled items, then all metrics.
pub fn score_case(
    flags: &[SafetyFlag],
    ground_truth: &[GroundTruthItem],
    sources: &SourceTexts<'_>,
) -> CaseScore {
    let mut used = vec![false; ground_truth.len()];
    let mut false_positives = 0;

    for flag in flags {
        let hit = ground_truth
            .iter()
            .enumerate()
            .find(|(i, item)| !used[*i] && flag_matches(flag, item));
        match hit {
            Some((i, _)) => used[i] = true,
            None => false_positives += 1,
        }
    }

    let matched: Vec<&GroundTruthItem> = ground_truth
        .iter()
        .zip(&used)
        .filter(|(_, u)| **u)
        .map(|(g, _)| g)
        .collect();

    let tp = matched.len();
    let fn_ = ground_truth.len() - tp;
    let (precision, recall, f1) = precision_recall_f1(tp, false_positives, fn_);

    CaseScore {
        true_positives: tp,
        false_positives,
        false_negatives: fn_,
        precision,
        recall,
        f1,
        weighted_recall: severity_weighted_recall(&matched, ground_truth),
        high_severity_recall: high_severity_recall(&matched, ground_truth),
        grounding_rate: evidence_grounding_rate(flags, sources),
    }
}
