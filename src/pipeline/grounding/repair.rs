use regex::RegexBuilder;

use super::highlight::highlight_numbers;
use super::similarity::{LevenshteinRatio, SimilarityStrategy};
use super::SourceTexts;
use crate::models::{Evidence, EvidenceRepair, EvidenceSource, GroundingOutcome, SafetyReport};

/// Verifies evidence quotes against the source documents and repairs the
/// ones the model misquoted or misattributed.
pub struct EvidenceGrounder {
    strategy: Box<dyn SimilarityStrategy>,
}

impl Default for EvidenceGrounder {
    fn default() -> Self {
        Self::new(Box::new(LevenshteinRatio::default()))
    }
}

impl EvidenceGrounder {
    pub fn new(strategy: Box<dyn SimilarityStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Ground a single evidence item.
    ///
    /// After this returns, `quote` is a substring of the text for `source`
    /// unless `source` is `Unknown`.
    pub fn ground_evidence(
        &self,
        evidence: &Evidence,
        sources: &SourceTexts<'_>,
    ) -> (Evidence, GroundingOutcome) {
        let quote = evidence.quote.trim();
        if quote.is_empty() {
            return (
                Evidence::new("", EvidenceSource::Unknown),
                GroundingOutcome::Unresolved,
            );
        }

        if let Some(text) = sources.get(evidence.source) {
            if text.contains(quote) {
                return (
                    Evidence::new(quote, evidence.source),
                    GroundingOutcome::Verified,
                );
            }
        }

        if let Some((found, source)) = find_case_insensitive(quote, evidence.source, sources) {
            return (Evidence::new(found, source), GroundingOutcome::Corrected);
        }

        if let Some((line, source, score)) = self.best_line(quote, sources) {
            return (
                Evidence::new(line, source),
                GroundingOutcome::FuzzyRecovered { score },
            );
        }

        (
            Evidence::new(quote, EvidenceSource::Unknown),
            GroundingOutcome::Unresolved,
        )
    }

    /// Best-scoring source line strictly above the threshold. Quotes contained
    /// in a line never get here; the case-insensitive step already took them.
    fn best_line<'a>(
        &self,
        quote: &str,
        sources: &SourceTexts<'a>,
    ) -> Option<(&'a str, EvidenceSource, f64)> {
        let mut best: Option<(&'a str, EvidenceSource, f64)> = None;

        for source in EvidenceSource::GROUNDABLE {
            let Some(text) = sources.get(source) else {
                continue;
            };
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let score = self.strategy.score(quote, line);
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((line, source, score));
                }
            }
        }

        best.filter(|(_, _, score)| *score > self.strategy.threshold())
    }

    /// Ground every evidence item of every flag, recording each non-trivial
    /// decision in the report metadata.
    pub fn ground_report(&self, mut report: SafetyReport, sources: &SourceTexts<'_>) -> SafetyReport {
        let mut repairs: Vec<EvidenceRepair> = Vec::new();

        for (flag_index, flag) in report.flags.iter_mut().enumerate() {
            for (evidence_index, evidence) in flag.evidence.iter_mut().enumerate() {
                let (mut grounded, outcome) = self.ground_evidence(evidence, sources);
                grounded.highlighted = Some(highlight_numbers(&grounded.quote));

                if outcome != GroundingOutcome::Verified {
                    tracing::debug!(
                        flag_index,
                        evidence_index,
                        claimed = %evidence.source,
                        resolved = %grounded.source,
                        outcome = ?outcome,
                        "Evidence repaired"
                    );
                    repairs.push(EvidenceRepair {
                        flag_index,
                        evidence_index,
                        claimed_source: evidence.source,
                        resolved_source: grounded.source,
                        outcome,
                    });
                }
                *evidence = grounded;
            }
        }

        let unresolved = repairs
            .iter()
            .filter(|r| r.outcome == GroundingOutcome::Unresolved)
            .count();
        tracing::info!(
            strategy = self.strategy.name(),
            repaired = repairs.len() - unresolved,
            unresolved,
            "Evidence grounding complete"
        );

        report.metadata.evidence_repairs.extend(repairs);
        report
    }
}

/// Case-insensitive exact search, claimed source first, then NOTE, LABS, MEDS.
/// Returns the exact-case slice of the source text.
fn find_case_insensitive<'a>(
    quote: &str,
    claimed: EvidenceSource,
    sources: &SourceTexts<'a>,
) -> Option<(&'a str, EvidenceSource)> {
    let pattern = RegexBuilder::new(&regex::escape(quote))
        .case_insensitive(true)
        .build()
        .ok()?;

    let order = std::iter::once(claimed)
        .chain(EvidenceSource::GROUNDABLE.into_iter().filter(move |s| *s != claimed));

    for source in order {
        let Some(text) = sources.get(source) else {
            continue;
        };
        if let Some(m) = pattern.find(text) {
            return Some((m.as_str(), source));
        }
    }
    None
}
