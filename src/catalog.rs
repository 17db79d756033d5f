use serde::{Deserialize, Serialize};

/// One episode as listed by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEpisode {
    pub season: u32,
    pub number: u32,
    pub title: String,
}

impl CatalogEpisode {
    pub fn new(season: u32, number: u32, title: impl Into<String>) -> Self {
        Self {
            season,
            number,
            title: title.into(),
        }
    }

    pub fn key(&self) -> (u32, u32) {
        (self.season, self.number)
    }
}

/// Every known episode of one series, ordered by (season, number).
///
/// Duplicate (season, number) pairs are collapsed on construction, keeping
/// the first title seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeCatalog {
    series_name: String,
    episodes: Vec<CatalogEpisode>,
}

impl EpisodeCatalog {
    pub fn new(series_name: impl Into<String>, mut episodes: Vec<CatalogEpisode>) -> Self {
        episodes.sort_by_key(CatalogEpisode::key);
        episodes.dedup_by_key(|e| e.key());

        Self {
            series_name: series_name.into(),
            episodes,
        }
    }

    pub fn series_name(&self) -> &str {
        &self.series_name
    }

    pub fn episodes(&self) -> &[CatalogEpisode] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Episodes of one season, in number order
    pub fn episodes_for_season(&self, season: u32) -> &[CatalogEpisode] {
        let start = self.episodes.partition_point(|e| e.season < season);
        let end = self.episodes.partition_point(|e| e.season <= season);
        &self.episodes[start..end]
    }

    pub fn episode_by_number(&self, season: u32, number: u32) -> Option<&CatalogEpisode> {
        self.episodes
            .binary_search_by_key(&(season, number), CatalogEpisode::key)
            .ok()
            .map(|i| &self.episodes[i])
    }

    /// Distinct season numbers, ascending
    pub fn seasons(&self) -> Vec<u32> {
        let mut seasons: Vec<u32> = self.episodes.iter().map(|e| e.season).collect();
        seasons.dedup();
        seasons
    }

    /// A copy holding only the given season
    pub fn restrict_to_season(&self, season: u32) -> Self {
        Self {
            series_name: self.series_name.clone(),
            episodes: self.episodes_for_season(season).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EpisodeCatalog {
        EpisodeCatalog::new(
            "Show",
            vec![
                CatalogEpisode::new(2, 1, "Second One"),
                CatalogEpisode::new(1, 2, "Beta"),
                CatalogEpisode::new(1, 1, "Alpha"),
                CatalogEpisode::new(1, 1, "Alpha Duplicate"),
                CatalogEpisode::new(0, 1, "Special"),
            ],
        )
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let catalog = catalog();
        let keys: Vec<_> = catalog.episodes().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec![(0, 1), (1, 1), (1, 2), (2, 1)]);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_episodes_for_season() {
        let catalog = catalog();
        let season: Vec<_> = catalog
            .episodes_for_season(1)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(season, vec!["Alpha", "Beta"]);
        assert!(catalog.episodes_for_season(7).is_empty());
    }

    #[test]
    fn test_episode_by_number() {
        let catalog = catalog();
        assert_eq!(catalog.episode_by_number(1, 2).map(|e| e.title.as_str()), Some("Beta"));
        assert!(catalog.episode_by_number(1, 3).is_none());
    }

    #[test]
    fn test_seasons() {
        assert_eq!(catalog().seasons(), vec![0, 1, 2]);
    }

    #[test]
    fn test_restrict_to_season() {
        let restricted = catalog().restrict_to_season(2);
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted.series_name(), "Show");
    }
}
