//! Memoization of dataset loads
//!
//! Input files are static, so loading them more than once per process is a
//! waste. A [`DatasetCache`] remembers every dataset that it loaded, keyed by
//! the pair of input paths, and hands out shared read-only copies.
//!
//! Lifecycle of a cache entry:
//!
//! - Created on the first successful load of a pair of paths. Failed loads
//!   are not remembered, so fixing an input file and trying again works.
//! - Held until the cache is dropped, which for the [`global()`] cache means
//!   until the process exits.
//! - Dropped early only through [`invalidate()`](DatasetCache::invalidate).

use super::{loader, Dataset};
use crate::error::DashboardError;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

/// Identity of a cached dataset
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct CacheKey {
    data_path: PathBuf,
    mapping_path: PathBuf,
}
//
impl CacheKey {
    fn new(data_path: &Path, mapping_path: &Path) -> Self {
        Self {
            data_path: data_path.to_owned(),
            mapping_path: mapping_path.to_owned(),
        }
    }
}

/// Memoized dataset loader
#[derive(Debug, Default)]
pub struct DatasetCache(Mutex<HashMap<CacheKey, Arc<Dataset>>>);
//
impl DatasetCache {
    /// Set up an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the dataset associated with a pair of input files, loading it if
    /// it is not in the cache yet
    pub async fn get_or_load(
        &self,
        data_path: &Path,
        mapping_path: &Path,
    ) -> Result<Arc<Dataset>, DashboardError> {
        let key = CacheKey::new(data_path, mapping_path);
        if let Some(dataset) = self.entries().get(&key) {
            log::debug!("Reusing cached dataset for {key:?}");
            return Ok(dataset.clone());
        }

        // The lock is not held while loading, so in the unlikely event of two
        // concurrent loads of the same files, the first one to finish wins.
        log::debug!("Cache miss for {key:?}, loading from disk");
        let dataset = Arc::new(loader::load(data_path, mapping_path).await?);
        let mut entries = self.entries();
        let dataset = entries.entry(key).or_insert(dataset).clone();
        log::debug!("Dataset cache now holds {} entries", entries.len());
        Ok(dataset)
    }

    /// Forget the dataset associated with a pair of input files, if any
    ///
    /// Returns truth that something was forgotten.
    pub fn invalidate(&self, data_path: &Path, mapping_path: &Path) -> bool {
        let key = CacheKey::new(data_path, mapping_path);
        let removed = self.entries().remove(&key).is_some();
        if removed {
            log::info!("Invalidated cached dataset for {key:?}");
        }
        removed
    }

    /// Number of cached datasets
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Truth that nothing is cached
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access the cache entries
    ///
    /// Entries are immutable once inserted, so a panic while the lock was
    /// held cannot have left them in an inconsistent state.
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Dataset>>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide dataset cache, created on first access
pub fn global() -> &'static DatasetCache {
    static CACHE: OnceLock<DatasetCache> = OnceLock::new();
    CACHE.get_or_init(DatasetCache::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data.csv");
        let mapping = dir.path().join("mapping.json");
        std::fs::write(&data, "language_code,subtopic,article_count\nen,Policy,3\n").unwrap();
        std::fs::write(&mapping, r#"{"Policy": {"en": ["policy"]}}"#).unwrap();
        (dir, data, mapping)
    }

    #[tokio::test]
    async fn repeated_loads_do_not_touch_the_disk() {
        let (_dir, data, mapping) = fixture();
        let cache = DatasetCache::new();
        let first = cache.get_or_load(&data, &mapping).await.unwrap();

        // Files are gone, but the cached copy is still served
        std::fs::remove_file(&data).unwrap();
        std::fs::remove_file(&mapping).unwrap();
        let second = cache.get_or_load(&data, &mapping).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_reload() {
        let (_dir, data, mapping) = fixture();
        let cache = DatasetCache::new();
        cache.get_or_load(&data, &mapping).await.unwrap();
        std::fs::remove_file(&data).unwrap();

        assert!(cache.invalidate(&data, &mapping));
        assert!(!cache.invalidate(&data, &mapping));
        let err = cache.get_or_load(&data, &mapping).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataNotFound { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn entries_are_keyed_by_both_paths() {
        let (dir, data, mapping) = fixture();
        let other_mapping = dir.path().join("other.json");
        std::fs::write(&other_mapping, "{}").unwrap();
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&data, &mapping).await.unwrap();
        let second = cache.get_or_load(&data, &other_mapping).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&data, &mapping));
        assert_eq!(cache.len(), 1);
        let third = cache.get_or_load(&data, &other_mapping).await.unwrap();
        assert!(Arc::ptr_eq(&second, &third));
    }
}
