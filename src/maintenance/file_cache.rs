//! Maintenance file cache.
//!
//! Holds the last successfully read content of the maintenance file and
//! reloads it lazily, only when the on-disk modification time advances.
//! Disk I/O happens outside the lock; the write lock is taken only for the
//! compare-and-swap of the cached entry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use axum::body::Bytes;
use thiserror::Error;

/// Errors from stat-ing or reading the maintenance file.
#[derive(Debug, Error)]
pub enum FileCacheError {
    #[error("error accessing maintenance file {path:?}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("maintenance file {0:?} is not a regular file")]
    NotAFile(PathBuf),

    #[error("error reading maintenance file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("maintenance file is empty: {0:?}")]
    Empty(PathBuf),
}

/// Result of a successful [`FileCache::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file has not changed since the cached read.
    Unchanged,
    /// The file was read and the cache now holds `bytes` bytes.
    Reloaded { bytes: usize },
}

#[derive(Debug)]
struct CacheEntry {
    content: Bytes,
    modified: SystemTime,
}

/// Cached content of a maintenance file.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entry: RwLock<Option<CacheEntry>>,
}

impl FileCache {
    /// Open the file and perform the initial load. Fails if the file is
    /// missing, not a regular file, unreadable or empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FileCacheError> {
        let cache = Self {
            path: path.into(),
            entry: RwLock::new(None),
        };
        cache.load()?;
        Ok(cache)
    }

    /// Path of the cached file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the file if its modification time is newer than the cached one.
    ///
    /// On error the previously cached content is left in place.
    pub fn load(&self) -> Result<LoadOutcome, FileCacheError> {
        let metadata = fs::metadata(&self.path).map_err(|source| FileCacheError::Stat {
            path: self.path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(FileCacheError::NotAFile(self.path.clone()));
        }
        let modified = metadata.modified().map_err(|source| FileCacheError::Stat {
            path: self.path.clone(),
            source,
        })?;

        if !self.is_newer(modified) {
            return Ok(LoadOutcome::Unchanged);
        }

        let content = fs::read(&self.path).map_err(|source| FileCacheError::Read {
            path: self.path.clone(),
            source,
        })?;
        if content.is_empty() {
            return Err(FileCacheError::Empty(self.path.clone()));
        }

        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        // Another request may have swapped in the same or a newer read.
        if let Some(current) = entry.as_ref() {
            if modified <= current.modified {
                return Ok(LoadOutcome::Unchanged);
            }
        }
        let bytes = content.len();
        *entry = Some(CacheEntry {
            content: Bytes::from(content),
            modified,
        });

        Ok(LoadOutcome::Reloaded { bytes })
    }

    /// Currently cached content. Cloning `Bytes` is a reference count bump,
    /// so the lock is released before the caller writes anything.
    pub fn snapshot(&self) -> Option<Bytes> {
        self.entry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|entry| entry.content.clone())
    }

    /// Modification time of the cached content.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.entry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|entry| entry.modified)
    }

    fn is_newer(&self, modified: SystemTime) -> bool {
        match self.entry.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(current) => modified > current.modified,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::Arc;
    use std::time::Duration;

    fn write_with_mtime(path: &Path, content: &str, modified: SystemTime) {
        fs::write(path, content).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn test_open_loads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        fs::write(&path, "<html>down</html>").unwrap();

        let cache = FileCache::open(&path).unwrap();
        assert_eq!(cache.snapshot().unwrap(), "<html>down</html>");
        assert!(cache.last_modified().is_some());
    }

    #[test]
    fn test_open_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.html");
        assert!(matches!(FileCache::open(&missing), Err(FileCacheError::Stat { .. })));

        assert!(matches!(FileCache::open(dir.path()), Err(FileCacheError::NotAFile(_))));

        let empty = dir.path().join("empty.html");
        fs::write(&empty, "").unwrap();
        assert!(matches!(FileCache::open(&empty), Err(FileCacheError::Empty(_))));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        fs::write(&path, "<html>original</html>").unwrap();

        let cache = FileCache::open(&path).unwrap();
        let initial = cache.last_modified();

        assert_eq!(cache.load().unwrap(), LoadOutcome::Unchanged);
        assert_eq!(cache.load().unwrap(), LoadOutcome::Unchanged);
        assert_eq!(cache.last_modified(), initial);
    }

    #[test]
    fn test_reload_on_newer_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, "<html>before</html>", t0);

        let cache = FileCache::open(&path).unwrap();
        assert_eq!(cache.snapshot().unwrap(), "<html>before</html>");

        write_with_mtime(&path, "<html>after update</html>", t0 + Duration::from_secs(5));
        assert_eq!(cache.load().unwrap(), LoadOutcome::Reloaded { bytes: 25 });
        assert_eq!(cache.snapshot().unwrap(), "<html>after update</html>");
        assert_eq!(cache.last_modified(), Some(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_same_mtime_is_not_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, "<html>before</html>", t0);

        let cache = FileCache::open(&path).unwrap();
        write_with_mtime(&path, "<html>sneaky</html>", t0);

        assert_eq!(cache.load().unwrap(), LoadOutcome::Unchanged);
        assert_eq!(cache.snapshot().unwrap(), "<html>before</html>");
    }

    #[test]
    fn test_failed_reload_keeps_last_good() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, "<html>good</html>", t0);

        let cache = FileCache::open(&path).unwrap();

        write_with_mtime(&path, "", t0 + Duration::from_secs(5));
        assert!(matches!(cache.load(), Err(FileCacheError::Empty(_))));
        assert_eq!(cache.snapshot().unwrap(), "<html>good</html>");

        fs::remove_file(&path).unwrap();
        assert!(matches!(cache.load(), Err(FileCacheError::Stat { .. })));
        assert_eq!(cache.snapshot().unwrap(), "<html>good</html>");
        assert_eq!(cache.last_modified(), Some(t0));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance.html");
        let old = "a".repeat(4096);
        let new = "b".repeat(8192);
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, &old, t0);

        let cache = Arc::new(FileCache::open(&path).unwrap());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let (old, new) = (old.clone(), new.clone());
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = cache.snapshot().unwrap();
                        assert!(snapshot == old.as_bytes() || snapshot == new.as_bytes());
                    }
                })
            })
            .collect();

        write_with_mtime(&path, &new, t0 + Duration::from_secs(1));
        cache.load().unwrap();

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(cache.snapshot().unwrap(), new.as_bytes());
    }
}
