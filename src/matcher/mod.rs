pub mod resolver;

pub use resolver::{resolve_titles, select_candidates, TRAILING_NOISE_MAX_CHARS};

use crate::catalog::CatalogEpisode;
use std::collections::HashSet;
use std::ops::Range;

/// Default acceptance threshold for fuzzy title matches
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

/// A catalog episode scored against part of an embedded title
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub episode: CatalogEpisode,
    pub score: f64,
    /// Byte range of the embedded title this candidate explains
    pub consumed_title_span: Range<usize>,
}

/// Fuzzy title scorer: token-sort ratio over normalized Levenshtein
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    stopwords: HashSet<String>,
    threshold: f64,
}

impl Default for TokenMatcher {
    fn default() -> Self {
        Self {
            stopwords: HashSet::new(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl TokenMatcher {
    pub fn new<I, S>(stopwords: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Lowercased alphanumeric tokens with stopwords removed
    pub fn tokens(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    /// Similarity of two free-text titles in [0, 1]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let mut left = self.tokens(a);
        let mut right = self.tokens(b);

        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        left.sort_unstable();
        right.sort_unstable();

        strsim::normalized_levenshtein(&left.join(" "), &right.join(" "))
    }

    pub fn score(&self, query: &str, episode: &CatalogEpisode) -> f64 {
        self.similarity(query, &episode.title)
    }

    pub fn is_match(&self, score: f64) -> bool {
        score >= self.threshold
    }

    /// Highest-scoring episode at or above threshold
    pub fn best_match<'a, I>(&self, query: &str, episodes: I) -> Option<MatchCandidate>
    where
        I: IntoIterator<Item = &'a CatalogEpisode>,
    {
        let mut best: Option<MatchCandidate> = None;

        for episode in episodes {
            let score = self.score(query, episode);
            if !self.is_match(score) {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MatchCandidate {
                    episode: episode.clone(),
                    score,
                    consumed_title_span: 0..query.len(),
                });
            }
        }

        best
    }
}

/// Lowercase and split on anything that is not alphanumeric
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TokenMatcher {
        TokenMatcher::new(["le", "sur", "the"], DEFAULT_MATCH_THRESHOLD)
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Abuela's Birthday!"), vec!["abuela", "s", "birthday"]);
        assert!(tokenize(" - ").is_empty());
    }

    #[test]
    fn test_identity_scores_one() {
        let m = matcher();
        assert_eq!(m.similarity("Cat Mail", "Cat Mail"), 1.0);
        assert!(m.is_match(m.similarity("Firefighters at School", "Firefighters at School")));
    }

    #[test]
    fn test_order_and_case_insensitive() {
        let m = matcher();
        assert_eq!(m.similarity("Cat Mail", "mail CAT"), 1.0);
        assert_eq!(
            m.similarity("treasure hunt castle", "Castle Treasure Hunt"),
            m.similarity("Castle Treasure Hunt", "treasure hunt castle")
        );
    }

    #[test]
    fn test_stopwords_ignored() {
        let m = matcher();
        let score = m.similarity("le sur mail", "Mail");
        assert!(score >= 0.85, "score was {}", score);
    }

    #[test]
    fn test_only_stopwords_scores_zero() {
        let m = matcher();
        assert_eq!(m.similarity("le sur", "le sur"), 0.0);
        assert_eq!(m.similarity("", "Mail"), 0.0);
    }

    #[test]
    fn test_unrelated_titles_below_threshold() {
        let m = matcher();
        assert!(!m.is_match(m.similarity("Cat Mail", "Firefighters at School")));
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(TokenMatcher::new(Vec::<String>::new(), 3.0).threshold(), 1.0);
    }

    #[test]
    fn test_best_match() {
        let m = matcher();
        let episodes = vec![
            CatalogEpisode::new(1, 1, "Abuela's Birthday"),
            CatalogEpisode::new(1, 2, "Cat Mail"),
        ];

        let best = m.best_match("cat mail", &episodes).unwrap();
        assert_eq!(best.episode.number, 2);
        assert_eq!(best.score, 1.0);

        assert!(m.best_match("Something Else Entirely", &episodes).is_none());
    }
}
