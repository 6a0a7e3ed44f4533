use serde::{Deserialize, Serialize};

use super::normalize::{extract_medications, lines_mentioning};
use super::reference::{matches_side, InteractionRule, INTERACTION_RULES};
use crate::models::{Evidence, EvidenceSource, FlagCategory, FlagOrigin, SafetyFlag, Severity};

/// A matched pair of patient medications. `drug_a < drug_b` always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DDInteraction {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub mechanism: String,
    pub recommendation: String,
    /// Position of the matching row in the interaction table.
    pub rule_index: usize,
}

/// Confidence assigned to deterministic interaction flags.
pub mod interaction_confidence {
    pub const HIGH: f32 = 0.95;
    pub const MEDIUM: f32 = 0.85;
    pub const LOW: f32 = 0.70;
}

fn rule_matches(rule: &InteractionRule, a: &str, b: &str) -> bool {
    (matches_side(a, rule.side_a) && matches_side(b, rule.side_b))
        || (matches_side(b, rule.side_a) && matches_side(a, rule.side_b))
}

/// Check normalized drug names against the interaction table.
///
/// One result per unordered pair (first matching rule wins), sorted by
/// severity then table order. Fewer than two distinct drugs never match.
pub fn check_interactions(drugs: &[String]) -> Vec<DDInteraction> {
    let mut found: Vec<DDInteraction> = Vec::new();

    for (i, first) in drugs.iter().enumerate() {
        for second in &drugs[i + 1..] {
            if first == second {
                continue;
            }
            let (a, b) = if first < second {
                (first, second)
            } else {
                (second, first)
            };
            if found.iter().any(|d| &d.drug_a == a && &d.drug_b == b) {
                continue;
            }

            let hit = INTERACTION_RULES
                .iter()
                .enumerate()
                .find(|(_, rule)| rule_matches(rule, a, b));

            if let Some((rule_index, rule)) = hit {
                found.push(DDInteraction {
                    drug_a: a.clone(),
                    drug_b: b.clone(),
                    severity: rule.severity,
                    mechanism: rule.mechanism.to_string(),
                    recommendation: rule.recommendation.to_string(),
                    rule_index,
                });
            }
        }
    }

    found.sort_by(|x, y| {
        (x.severity.rank(), x.rule_index, &x.drug_a, &x.drug_b)
            .cmp(&(y.severity.rank(), y.rule_index, &y.drug_a, &y.drug_b))
    });
    found
}

/// Parse the medication text and check it, logging the scan summary.
pub fn run_ddi_scan(meds_text: &str) -> Vec<DDInteraction> {
    let drugs = extract_medications(meds_text);
    let found = check_interactions(&drugs);
    tracing::info!(
        medication_count = drugs.len(),
        interaction_count = found.len(),
        "DDI scan complete"
    );
    found
}

/// One-call convenience: parse text, then check interactions.
pub fn scan_medications(meds_text: &str) -> Vec<DDInteraction> {
    check_interactions(&extract_medications(meds_text))
}

/// Turn a detected interaction into a flag quoting the medication lines.
pub fn interaction_to_flag(interaction: &DDInteraction, meds_text: &str) -> SafetyFlag {
    let mut evidence: Vec<Evidence> = Vec::new();
    for drug in [&interaction.drug_a, &interaction.drug_b] {
        for line in lines_mentioning(meds_text, drug) {
            let item = Evidence::new(line, EvidenceSource::Meds);
            if !evidence.contains(&item) {
                evidence.push(item);
            }
        }
    }

    let confidence = match interaction.severity {
        Severity::High => interaction_confidence::HIGH,
        Severity::Medium => interaction_confidence::MEDIUM,
        Severity::Low => interaction_confidence::LOW,
    };

    SafetyFlag {
        category: FlagCategory::MedicationInteraction,
        severity: interaction.severity,
        confidence,
        evidence,
        explanation: format!(
            "Potential interaction between {} and {}: {}",
            interaction.drug_a, interaction.drug_b, interaction.mechanism
        ),
        recommendation: Some(interaction.recommendation.clone()),
        origin: FlagOrigin::InteractionScan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(found: &[DDInteraction]) -> Vec<(String, String)> {
        let mut p: Vec<_> = found
            .iter()
            .map(|d| (d.drug_a.clone(), d.drug_b.clone()))
            .collect();
        p.sort();
        p
    }

    #[test]
    fn fewer_than_two_drugs_never_match() {
        assert!(check_interactions(&[]).is_empty());
        assert!(check_interactions(&names(&["warfarin"])).is_empty());
    }

    #[test]
    fn duplicate_drug_is_not_a_pair() {
        assert!(check_interactions(&names(&["warfarin", "warfarin"])).is_empty());
    }

    #[test]
    fn warfarin_ibuprofen_is_high() {
        let found = scan_medications("Coumadin 5mg daily\nIbuprofen 600mg TID");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::High);
        assert_eq!(found[0].drug_a, "ibuprofen");
        assert_eq!(found[0].drug_b, "warfarin");
    }

    #[test]
    fn symmetric_under_permutation() {
        let forward = check_interactions(&names(&["warfarin", "ibuprofen", "sertraline", "tramadol"]));
        let reverse = check_interactions(&names(&["tramadol", "sertraline", "ibuprofen", "warfarin"]));
        assert_eq!(pairs(&forward), pairs(&reverse));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn first_matching_rule_wins() {
        // warfarin + fluconazole: the class rules do not match, the direct rule does.
        let found = check_interactions(&names(&["fluconazole", "warfarin"]));
        assert_eq!(found.len(), 1);
        assert!(found[0].mechanism.contains("CYP2C9"));
    }

    #[test]
    fn sorted_high_first() {
        let found = check_interactions(&names(&["atorvastatin", "clarithromycin", "warfarin", "naproxen"]));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].severity, Severity::High);
        assert_eq!(found[1].severity, Severity::Medium);
    }

    #[test]
    fn unknown_drugs_do_not_match() {
        assert!(check_interactions(&names(&["zorblax", "quuxamine"])).is_empty());
    }

    #[test]
    fn flag_quotes_meds_lines() {
        let meds = "Coumadin 5mg daily\nIbuprofen 600mg TID";
        let found = scan_medications(meds);
        let flag = interaction_to_flag(&found[0], meds);
        assert_eq!(flag.category, FlagCategory::MedicationInteraction);
        assert_eq!(flag.origin, FlagOrigin::InteractionScan);
        assert_eq!(flag.confidence, interaction_confidence::HIGH);
        assert_eq!(flag.evidence.len(), 2);
        for ev in &flag.evidence {
            assert_eq!(ev.source, EvidenceSource::Meds);
            assert!(meds.contains(&ev.quote));
        }
    }

    #[test]
    fn flag_dedupes_shared_line() {
        let meds = "warfarin, aspirin";
        let found = scan_medications(meds);
        let flag = interaction_to_flag(&found[0], meds);
        assert_eq!(flag.evidence.len(), 1);
    }
}
