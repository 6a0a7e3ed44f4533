use std::collections::HashSet;

/// Similarity ratio above which a source line replaces an unmatched quote.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.85;

/// Pluggable line-level similarity used by fuzzy evidence recovery.
pub trait SimilarityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Similarity in [0, 1]; 1.0 means identical.
    fn score(&self, candidate: &str, line: &str) -> f64;

    /// A line is accepted only when its score is strictly above this.
    fn threshold(&self) -> f64;
}

/// `1 - levenshtein / max_len` over lowercased text (normalized edit distance).
#[derive(Debug, Clone, Copy)]
pub struct LevenshteinRatio {
    pub threshold: f64,
}

impl Default for LevenshteinRatio {
    fn default() -> Self {
        Self {
            threshold: FUZZY_MATCH_THRESHOLD,
        }
    }
}

impl SimilarityStrategy for LevenshteinRatio {
    fn name(&self) -> &'static str {
        "levenshtein_ratio"
    }

    fn score(&self, candidate: &str, line: &str) -> f64 {
        strsim::normalized_levenshtein(&candidate.to_lowercase(), &line.to_lowercase())
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Jaccard overlap of lowercase alphanumeric token sets.
#[derive(Debug, Clone, Copy)]
pub struct TokenJaccard {
    pub threshold: f64,
}

impl Default for TokenJaccard {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

fn token_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '.')
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl SimilarityStrategy for TokenJaccard {
    fn name(&self) -> &'static str {
        "token_jaccard"
    }

    fn score(&self, candidate: &str, line: &str) -> f64 {
        let a = token_set(candidate);
        let b = token_set(line);
        if a.is_empty() && b.is_empty() {
            return 0.0;
        }
        let shared = a.intersection(&b).count() as f64;
        let union = a.union(&b).count() as f64;
        shared / union
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_ratio_identical_is_one() {
        let s = LevenshteinRatio::default();
        assert!((s.score("INR 3.4", "inr 3.4") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn levenshtein_ratio_near_miss_passes() {
        let s = LevenshteinRatio::default();
        let score = s.score("Creatinine 1.7 mg/dl", "Creatinine: 1.7 mg/dL");
        assert!(score > s.threshold(), "score {score}");
    }

    #[test]
    fn levenshtein_ratio_unrelated_fails() {
        let s = LevenshteinRatio::default();
        assert!(s.score("Patient denies chest pain", "Potassium 5.9") < s.threshold());
    }

    #[test]
    fn jaccard_ignores_word_order() {
        let j = TokenJaccard::default();
        assert!((j.score("potassium 5.9 high", "High potassium 5.9") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_empty_is_zero() {
        assert_eq!(TokenJaccard::default().score("", ""), 0.0);
    }
}
