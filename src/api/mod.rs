mod client;
mod types;

pub use client::TvdbClient;
pub use types::{numeric_series_id, ApiConfig, ApiError, SeriesCandidate, DEFAULT_BASE_URL};

use crate::catalog::EpisodeCatalog;

/// Source of series and episode metadata.
///
/// TheTVDB is the production implementation; tests substitute an in-memory
/// catalog.
pub trait MetadataSource {
    /// Series matching a free-text query, best first
    fn search_series(&self, query: &str) -> Result<Vec<SeriesCandidate>, ApiError>;

    /// A single series by id ("12345" or "series-12345")
    fn fetch_series(&self, id: &str) -> Result<SeriesCandidate, ApiError>;

    /// Every aired episode, or only `season` when given
    fn fetch_episode_catalog(
        &self,
        series: &SeriesCandidate,
        season: Option<u32>,
    ) -> Result<EpisodeCatalog, ApiError>;
}
