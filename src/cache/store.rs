use super::types::{CacheConfig, CacheEntry, CacheError, CacheFile, CACHE_VERSION};
use crate::catalog::EpisodeCatalog;
use crate::json_file::write_atomic;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

/// Episode catalogs keyed by series id, persisted next to the episodes.
///
/// Unsaved changes are flushed on drop.
pub struct CacheStore {
    config: CacheConfig,
    data: CacheFile,
    dirty: bool,
}

fn read_cache_file(path: &Path) -> Result<CacheFile, CacheError> {
    let reader = BufReader::new(File::open(path)?);
    let file: CacheFile = serde_json::from_reader(reader).map_err(|_| CacheError::Corrupted)?;

    if file.version == CACHE_VERSION {
        Ok(file)
    } else {
        Err(CacheError::VersionMismatch {
            expected: CACHE_VERSION.to_string(),
            found: file.version,
        })
    }
}

impl CacheStore {
    /// Open the cache file, starting empty when it is missing or unusable
    pub fn load(config: CacheConfig) -> Self {
        let data = match read_cache_file(&config.cache_path) {
            Ok(file) => {
                info!(
                    "Cache {:?} holds {} series",
                    config.cache_path,
                    file.entries.len()
                );
                file
            }
            Err(CacheError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache at {:?}", config.cache_path);
                CacheFile::default()
            }
            Err(e) => {
                warn!("Ignoring cache {:?}: {}", config.cache_path, e);
                CacheFile::default()
            }
        };

        Self {
            config,
            data,
            dirty: false,
        }
    }

    /// Catalog for `series_id`, unless missing or older than the expiry
    pub fn get(&self, series_id: &str) -> Option<EpisodeCatalog> {
        let entry = self.data.entries.get(series_id)?;

        if entry.is_expired(self.config.expiry_days) {
            debug!(
                "Cached catalog for {} from {} has expired",
                series_id, entry.fetched_at
            );
            return None;
        }

        debug!("Cache hit for series {}", series_id);
        Some(entry.to_catalog())
    }

    pub fn insert(&mut self, series_id: &str, catalog: &EpisodeCatalog) {
        debug!("Caching {} episodes for series {}", catalog.len(), series_id);
        let entry = CacheEntry::from_catalog(series_id, catalog);
        self.data.entries.insert(series_id.to_string(), entry);
        self.dirty = true;
    }

    /// Drop expired catalogs, returning how many were removed
    pub fn prune_expired(&mut self) -> usize {
        let expiry_days = self.config.expiry_days;
        let stale: Vec<String> = self
            .data
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(expiry_days))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            self.data.entries.remove(id);
        }

        if !stale.is_empty() {
            info!("Pruned {} expired catalogs", stale.len());
            self.dirty = true;
        }
        stale.len()
    }

    /// Write the cache if anything changed since the last save
    pub fn save(&mut self) -> Result<(), CacheError> {
        if !self.dirty {
            return Ok(());
        }

        let path = &self.config.cache_path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        write_atomic::<_, CacheError>(path, &self.data)?;
        self.dirty = false;

        info!("Saved {} cached series to {:?}", self.data.entries.len(), path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}

impl Drop for CacheStore {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!("Could not save cache on exit: {}", e);
        }
    }
}
