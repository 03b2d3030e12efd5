//! Relevance ranking
//!
//! The default ranker is lexical: Jaccard overlap of the distinct lowercase
//! whitespace-separated words of query and fact, scaled by a per-role
//! weight. Anything implementing [`RelevanceRanker`] can replace it.

use std::collections::{HashMap, HashSet};

use documinds_common::Role;

/// Scores how relevant a fact is to a query for a role
pub trait RelevanceRanker: Send + Sync {
    /// Must be deterministic and never negative
    fn score(&self, query: &str, fact: &str, role: &str) -> f64;
}

/// Per-role score multipliers
#[derive(Debug, Clone, PartialEq)]
pub struct RoleWeights {
    weights: HashMap<Role, f64>,
    default_weight: f64,
}

impl RoleWeights {
    /// Empty table; every role gets `default_weight`
    pub fn uniform(default_weight: f64) -> Self {
        Self {
            weights: HashMap::new(),
            default_weight,
        }
    }

    /// Set the weight of one role. Negative weights are clamped to zero.
    pub fn with_weight(mut self, role: impl Into<Role>, weight: f64) -> Self {
        self.weights.insert(role.into(), weight.max(0.0));
        self
    }

    pub fn weight_for(&self, role: &str) -> f64 {
        self.weights.get(role).copied().unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }
}

impl Default for RoleWeights {
    fn default() -> Self {
        Self::uniform(1.0)
            .with_weight(Role::EXTRACTOR, 1.2)
            .with_weight(Role::ANALYZER, 1.0)
            .with_weight(Role::SUMMARIZER, 0.8)
            .with_weight(Role::VALIDATOR, 1.1)
    }
}

/// Distinct lowercase words of a text
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// |A ∩ B| / |A ∪ B|, zero when both sets are empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Word-overlap ranker with role weighting
#[derive(Debug, Clone, Default)]
pub struct LexicalRanker {
    weights: RoleWeights,
}

impl LexicalRanker {
    pub fn new(weights: RoleWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RoleWeights {
        &self.weights
    }
}

impl RelevanceRanker for LexicalRanker {
    fn score(&self, query: &str, fact: &str, role: &str) -> f64 {
        let overlap = jaccard(&tokenize(query), &tokenize(fact));
        overlap * self.weights.weight_for(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_collapses_case_and_duplicates() {
        let words = tokenize("Revenue  revenue\tGROWTH\ngrowth");
        assert_eq!(words.len(), 2);
        assert!(words.contains("revenue"));
        assert!(words.contains("growth"));
    }

    #[test]
    fn test_jaccard_empty_sets() {
        assert_eq!(jaccard(&tokenize(""), &tokenize("   ")), 0.0);
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        let ranker = LexicalRanker::default();
        let score = ranker.score(
            "revenue growth Q3",
            "Employee satisfaction survey results",
            "analyzer",
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_role_weighting() {
        let ranker = LexicalRanker::default();
        // {a, b} vs {a, c}: 1 / 3
        let base = 1.0 / 3.0;
        assert!((ranker.score("a b", "a c", "analyzer") - base).abs() < 1e-12);
        assert!((ranker.score("a b", "a c", "extractor") - base * 1.2).abs() < 1e-12);
        assert!((ranker.score("a b", "a c", "summarizer") - base * 0.8).abs() < 1e-12);
        assert!((ranker.score("a b", "a c", "validator") - base * 1.1).abs() < 1e-12);
        assert!((ranker.score("a b", "a c", "translator") - base).abs() < 1e-12);
    }

    #[test]
    fn test_identical_text_scores_full_weight() {
        let ranker = LexicalRanker::default();
        let score = ranker.score("Invoice total", "invoice TOTAL", "extractor");
        assert!((score - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_custom_weights() {
        let ranker = LexicalRanker::new(RoleWeights::uniform(0.5).with_weight("auditor", 2.0));
        assert!((ranker.score("x", "x", "auditor") - 2.0).abs() < 1e-12);
        assert!((ranker.score("x", "x", "extractor") - 0.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(query in "[a-c ]{0,20}", fact in "[a-c ]{0,20}") {
            let ranker = LexicalRanker::default();
            let score = ranker.score(&query, &fact, "extractor");
            prop_assert!(score >= 0.0);
            prop_assert!(score <= 1.2 + 1e-12);
        }

        #[test]
        fn prop_score_is_symmetric(query in "[a-d ]{0,20}", fact in "[a-d ]{0,20}") {
            let ranker = LexicalRanker::default();
            prop_assert_eq!(
                ranker.score(&query, &fact, "validator"),
                ranker.score(&fact, &query, "validator")
            );
        }
    }
}
