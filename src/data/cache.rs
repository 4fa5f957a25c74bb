use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use super::loader::EncodingLoader;
use super::model::ResolvedDataset;

struct CacheEntry {
    /// Modification time observed when the entry was loaded.
    modified: Option<SystemTime>,
    dataset: Arc<ResolvedDataset>,
}

/// Memoizes loader results per file.
///
/// An entry stays valid while the file's modification time is unchanged;
/// a different mtime (or the file appearing/disappearing) triggers a reload.
pub struct DatasetCache {
    loader: EncodingLoader,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new(loader: EncodingLoader) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    /// Cached dataset for `path`, loading it if absent or stale.
    pub fn get(&mut self, path: &Path) -> Arc<ResolvedDataset> {
        let key = cache_key(path);
        let modified = modified_time(path);

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                return Arc::clone(&entry.dataset);
            }
            debug!("{} changed on disk, reloading", path.display());
        }

        let dataset = Arc::new(self.loader.load(path));
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                dataset: Arc::clone(&dataset),
            },
        );
        dataset
    }

    /// Whether the next [`get`](Self::get) would reload `path`.
    pub fn is_stale(&self, path: &Path) -> bool {
        match self.entries.get(&cache_key(path)) {
            Some(entry) => entry.modified != modified_time(path),
            None => true,
        }
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(&cache_key(path));
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "survey-lens-cache-{}-{name}.csv",
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn unchanged_file_returns_cached_dataset() {
        let path = temp_csv("unchanged", "부서\n영업\n");
        let mut cache = DatasetCache::new(EncodingLoader::default());

        let first = cache.get(&path);
        let second = cache.get(&path);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!cache.is_stale(&path));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn modified_file_is_reloaded() {
        let path = temp_csv("modified", "부서\n영업\n");
        let mut cache = DatasetCache::new(EncodingLoader::default());
        let epoch = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        set_mtime(&path, epoch);

        let first = cache.get(&path);
        assert_eq!(first.table.len(), 1);

        fs::write(&path, "부서\n영업\n개발\n").unwrap();
        set_mtime(&path, epoch + Duration::from_secs(60));
        assert!(cache.is_stale(&path));

        let second = cache.get(&path);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.table.len(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalidate_forces_reload() {
        let path = temp_csv("invalidate", "부서\n영업\n");
        let mut cache = DatasetCache::new(EncodingLoader::default());

        let first = cache.get(&path);
        cache.invalidate(&path);
        assert!(cache.is_stale(&path));
        let second = cache.get(&path);
        assert!(!Arc::ptr_eq(&first, &second));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_result_is_cached_too() {
        let path = Path::new("/nonexistent/survey-lens/missing.csv");
        let mut cache = DatasetCache::new(EncodingLoader::default());
        let first = cache.get(path);
        let second = cache.get(path);
        assert!(!first.is_usable());
        assert!(Arc::ptr_eq(&first, &second));
    }
}
