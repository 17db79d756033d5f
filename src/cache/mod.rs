mod store;
mod types;

pub use store::CacheStore;
pub use types::{CacheConfig, CacheEntry, CacheError, CacheFile, CACHE_FILE_NAME, CACHE_VERSION};
