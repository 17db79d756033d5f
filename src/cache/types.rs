use crate::catalog::{CatalogEpisode, EpisodeCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CACHE_VERSION: &str = "1.0";
pub const CACHE_FILE_NAME: &str = ".series-renamer-cache.json";

/// One series' episode list with its fetch time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub series_id: String,
    pub series_name: String,
    pub episodes: Vec<CatalogEpisode>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn from_catalog(series_id: &str, catalog: &EpisodeCatalog) -> Self {
        Self {
            series_id: series_id.to_string(),
            series_name: catalog.series_name().to_string(),
            episodes: catalog.episodes().to_vec(),
            fetched_at: Utc::now(),
        }
    }

    pub fn to_catalog(&self) -> EpisodeCatalog {
        EpisodeCatalog::new(self.series_name.clone(), self.episodes.clone())
    }

    pub fn is_expired(&self, expiry_days: u32) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_days() > expiry_days as i64
    }
}

/// The cache file structure (serialized to JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: String,
    pub entries: HashMap<String, CacheEntry>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            entries: HashMap::new(),
        }
    }
}

/// Configuration for the cache store
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub expiry_days: u32,
    pub cache_path: PathBuf,
}

impl CacheConfig {
    /// Cache file kept next to the episodes it describes
    pub fn for_target_dir(target: &Path, expiry_days: u32) -> Self {
        Self {
            expiry_days,
            cache_path: target.join(CACHE_FILE_NAME),
        }
    }
}

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file corrupted")]
    Corrupted,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn catalog() -> EpisodeCatalog {
        EpisodeCatalog::new(
            "Rosie's Rules",
            vec![
                CatalogEpisode::new(1, 2, "Cat Mail"),
                CatalogEpisode::new(1, 1, "Abuela's Birthday"),
            ],
        )
    }

    #[test]
    fn test_cache_entry_round_trip() {
        let entry = CacheEntry::from_catalog("412345", &catalog());

        assert_eq!(entry.series_id, "412345");
        assert_eq!(entry.series_name, "Rosie's Rules");
        assert_eq!(entry.to_catalog(), catalog());
    }

    #[test]
    fn test_cache_entry_expiration() {
        let mut entry = CacheEntry::from_catalog("1", &catalog());
        entry.fetched_at = Utc::now() - Duration::days(31);

        // 31 days old with 30 day expiry = expired
        assert!(entry.is_expired(30));
        assert!(!entry.is_expired(60));

        entry.fetched_at = Utc::now();
        assert!(!entry.is_expired(30));
    }

    #[test]
    fn test_cache_file_default() {
        let cache = CacheFile::default();

        assert_eq!(cache.version, CACHE_VERSION);
        assert!(cache.entries.is_empty());
    }

    #[test]
    fn test_cache_config_for_target_dir() {
        let config = CacheConfig::for_target_dir(Path::new("/tv/Show"), 30);

        assert_eq!(config.expiry_days, 30);
        assert_eq!(
            config.cache_path,
            PathBuf::from("/tv/Show/.series-renamer-cache.json")
        );
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::VersionMismatch {
            expected: "1.0".to_string(),
            found: "2.0".to_string(),
        };
        assert!(err.to_string().contains("1.0"));
        assert!(err.to_string().contains("2.0"));
    }
}
