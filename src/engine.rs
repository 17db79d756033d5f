use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::catalog::{CatalogEpisode, EpisodeCatalog};
use crate::config::Config;
use crate::matcher::{select_candidates, tokenize, MatchCandidate, TokenMatcher};
use crate::parser::{extract_normalized, normalize_with_extensions, ExtractedMetadata, QualityTags};
use crate::rename::{format_name, FormatError, ResolvedRename};

static LEADING_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*").unwrap());

/// Alphanumeric characters a title needs before it is worth matching
const MIN_TITLE_CHARS: usize = 3;

/// Outcome of resolving one file against the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedRename),
    /// Neither a marker nor a usable title was found
    Ambiguous,
    /// Nothing in the catalog scored above threshold
    NoMatch,
}

/// Extraction, matching and formatting with configuration applied
#[derive(Debug, Clone, Default)]
pub struct Engine {
    tags: QualityTags,
    matcher: TokenMatcher,
    /// Recognized file extensions; empty means any short suffix
    extensions: Vec<String>,
}

impl Engine {
    pub fn new(tags: QualityTags, matcher: TokenMatcher) -> Self {
        Self {
            tags,
            matcher,
            extensions: Vec::new(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            QualityTags::new(config.quality_tags.as_slice()),
            TokenMatcher::new(&config.stopwords, config.threshold()),
        )
        .with_extensions(config.extensions())
    }

    pub fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    pub fn extract(&self, raw: &str) -> ExtractedMetadata {
        extract_normalized(&normalize_with_extensions(raw, &self.extensions), &self.tags)
    }

    pub fn format_name(&self, resolved: &ResolvedRename) -> Result<String, FormatError> {
        format_name(resolved)
    }

    /// Reconcile extracted metadata with the catalog.
    ///
    /// Trusted labels win when there is no title to contradict them. A title
    /// that disagrees with the labels is matched fuzzily, first within the
    /// labelled season and then across every season.
    pub fn resolve(&self, meta: &ExtractedMetadata, catalog: &EpisodeCatalog) -> Resolution {
        let title = meta
            .embedded_title
            .as_deref()
            .and_then(|t| usable_title(t, catalog.series_name()));

        if !meta.has_marker() && title.is_none() {
            return Resolution::Ambiguous;
        }

        let extension = meta.extension.clone().unwrap_or_default();
        let structural = structural_candidates(meta, catalog);

        if let Some(episodes) = &structural {
            let confirmed = match &title {
                None => true,
                Some(title) => {
                    let joined: Vec<&str> = episodes.iter().map(|e| e.title.as_str()).collect();
                    let score = self.matcher.similarity(title, &joined.join(" "));
                    debug!("Structural candidates score {:.2} against title", score);
                    self.matcher.is_match(score)
                }
            };

            if confirmed {
                return Resolution::Resolved(build_resolved(catalog, episodes, extension));
            }
        }

        if let Some(title) = &title {
            let fuzzy = self.fuzzy_candidates(title, meta.season, catalog);
            if !fuzzy.is_empty() {
                let episodes: Vec<CatalogEpisode> = fuzzy.into_iter().map(|c| c.episode).collect();
                return Resolution::Resolved(build_resolved(catalog, &episodes, extension));
            }
        }

        match structural {
            Some(episodes) => {
                debug!("No title match, falling back to labelled episodes");
                Resolution::Resolved(build_resolved(catalog, &episodes, extension))
            }
            None => Resolution::NoMatch,
        }
    }

    fn fuzzy_candidates(
        &self,
        title: &str,
        season: Option<u32>,
        catalog: &EpisodeCatalog,
    ) -> Vec<MatchCandidate> {
        if let Some(season) = season {
            let candidates =
                select_candidates(&self.matcher, title, catalog.episodes_for_season(season));
            if !candidates.is_empty() {
                return candidates;
            }
        }

        let mut best: Vec<MatchCandidate> = Vec::new();
        let mut best_total = 0.0;

        // Ascending seasons, only a strictly better total replaces
        for season in catalog.seasons() {
            let candidates =
                select_candidates(&self.matcher, title, catalog.episodes_for_season(season));
            let total: f64 = candidates.iter().map(|c| c.score).sum();
            if !candidates.is_empty() && total > best_total {
                debug!("Season {} explains title with total {:.2}", season, total);
                best_total = total;
                best = candidates;
            }
        }

        best
    }
}

/// Labelled episodes, when every labelled number exists in the catalog
fn structural_candidates(
    meta: &ExtractedMetadata,
    catalog: &EpisodeCatalog,
) -> Option<Vec<CatalogEpisode>> {
    let season = meta.season?;
    if meta.episode_numbers.is_empty() {
        return None;
    }

    meta.episode_numbers
        .iter()
        .map(|&n| catalog.episode_by_number(season, n).cloned())
        .collect()
}

/// Drop the series name and leading episode digits from a title
fn usable_title(title: &str, series_name: &str) -> Option<String> {
    let mut cleaned = title.to_string();

    let series_tokens = tokenize(series_name);
    if !series_tokens.is_empty() {
        let escaped: Vec<String> = series_tokens.iter().map(|t| regex::escape(t)).collect();
        if let Ok(series_regex) = Regex::new(&format!(r"(?i)\b{}\b", escaped.join(r"\W*"))) {
            cleaned = series_regex.replace_all(&cleaned, " ").to_string();
        }
    }

    let trimmed = cleaned.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '+'));
    let cleaned = LEADING_NUMBER_REGEX.replace(trimmed, "").trim().to_string();

    let alnum = cleaned.chars().filter(|c| c.is_alphanumeric()).count();
    if alnum >= MIN_TITLE_CHARS {
        Some(cleaned)
    } else {
        None
    }
}

fn build_resolved(
    catalog: &EpisodeCatalog,
    episodes: &[CatalogEpisode],
    extension: String,
) -> ResolvedRename {
    ResolvedRename {
        series: catalog.series_name().to_string(),
        season: episodes.first().map_or(0, |e| e.season),
        episode_numbers: episodes.iter().map(|e| e.number).collect(),
        titles: episodes.iter().map(|e| e.title.clone()).collect(),
        extension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::DEFAULT_MATCH_THRESHOLD;

    fn engine() -> Engine {
        Engine::new(
            QualityTags::new(&["1080p", "WEBRip", "x264"]),
            TokenMatcher::new(["a", "the", "le", "sur"], DEFAULT_MATCH_THRESHOLD),
        )
    }

    fn rosie() -> EpisodeCatalog {
        EpisodeCatalog::new(
            "Rosie's Rules",
            vec![
                CatalogEpisode::new(1, 1, "Abuela's Birthday"),
                CatalogEpisode::new(1, 2, "Cat Mail"),
                CatalogEpisode::new(1, 3, "The Big Snow Day"),
                CatalogEpisode::new(2, 1, "Pancake Party"),
                CatalogEpisode::new(2, 2, "Lost and Found"),
            ],
        )
    }

    fn resolve_name(raw: &str, catalog: &EpisodeCatalog) -> Option<String> {
        let engine = engine();
        match engine.resolve(&engine.extract(raw), catalog) {
            Resolution::Resolved(r) => Some(engine.format_name(&r).unwrap()),
            _ => None,
        }
    }

    #[test]
    fn test_fallback_title_resolves_two_episodes() {
        assert_eq!(
            resolve_name("Abuela_s Birthday_Cat Mail.mp4", &rosie()).as_deref(),
            Some("Rosie's Rules - S01E01E02 - Abuela's Birthday + Cat Mail.mp4")
        );
    }

    #[test]
    fn test_structural_without_title() {
        assert_eq!(
            resolve_name("rosies.rules.S02E01.1080p.mkv", &rosie()).as_deref(),
            Some("Rosie's Rules - S02E01 - Pancake Party.mkv")
        );
    }

    #[test]
    fn test_structural_confirmed_by_title() {
        assert_eq!(
            resolve_name("Rosie's Rules - S01E03 - The Big Snow Day.mkv", &rosie()).as_deref(),
            Some("Rosie's Rules - S01E03 - The Big Snow Day.mkv")
        );
    }

    #[test]
    fn test_title_overrides_wrong_labels() {
        assert_eq!(
            resolve_name("Rosie's Rules - S01E01 - Lost and Found.mkv", &rosie()).as_deref(),
            Some("Rosie's Rules - S02E02 - Lost and Found.mkv")
        );
    }

    #[test]
    fn test_title_within_labelled_season() {
        assert_eq!(
            resolve_name("Show.S01E09.Cat.Mail.mkv", &rosie()).as_deref(),
            Some("Rosie's Rules - S01E02 - Cat Mail.mkv")
        );
    }

    #[test]
    fn test_series_name_stripped_from_fallback_title() {
        assert_eq!(
            resolve_name("Rosies Rules 03 The Big Snow Day.avi", &rosie()).as_deref(),
            Some("Rosie's Rules - S01E03 - The Big Snow Day.avi")
        );
    }

    #[test]
    fn test_labels_kept_when_title_unmatched() {
        assert_eq!(
            resolve_name("Show.S01E02.Director's.Commentary.mkv", &rosie()).as_deref(),
            Some("Rosie's Rules - S01E02 - Cat Mail.mkv")
        );
    }

    #[test]
    fn test_ambiguous() {
        let engine = engine();
        let meta = engine.extract("1080p.x264.mkv");
        assert_eq!(engine.resolve(&meta, &rosie()), Resolution::Ambiguous);

        let meta = engine.extract("42.mkv");
        assert_eq!(engine.resolve(&meta, &rosie()), Resolution::Ambiguous);
    }

    #[test]
    fn test_no_match() {
        let engine = engine();
        let meta = engine.extract("Completely Unrelated Words.mkv");
        assert_eq!(engine.resolve(&meta, &rosie()), Resolution::NoMatch);

        let meta = engine.extract("Show.S05E01.mkv");
        assert_eq!(engine.resolve(&meta, &rosie()), Resolution::NoMatch);
    }

    #[test]
    fn test_usable_title() {
        assert_eq!(
            usable_title("Rosie's Rules 12 Cat Mail", "Rosie's Rules").as_deref(),
            Some("Cat Mail")
        );
        assert_eq!(usable_title("Rosie's Rules", "Rosie's Rules"), None);
        assert_eq!(usable_title("07 ab", "Show"), None);
    }

    #[test]
    fn test_configured_extensions_bound_the_title() {
        let engine = Engine::from_config(&Config::default());

        let meta = engine.extract("Show.S01E05.The.End");
        assert_eq!(meta.extension, None);
        assert_eq!(meta.embedded_title.as_deref(), Some("The End"));

        let meta = engine.extract("Show.S01E05.The.End.mkv");
        assert_eq!(meta.extension.as_deref(), Some("mkv"));
        assert_eq!(meta.embedded_title.as_deref(), Some("The End"));
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
