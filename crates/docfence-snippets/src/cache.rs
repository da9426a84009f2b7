//! Per-run cache of included source files.
//!
//! Readers take a cheap `Arc` snapshot of an immutable map and never wait on
//! file I/O. A miss serializes on the populate lock, re-checks the snapshot,
//! loads the file once and publishes a new snapshot with the entry added.
//! Files that fail to load are cached as missing too.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use sha2::{Digest, Sha256};

/// Loaded content of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Normalized path the file was loaded from.
    pub path: PathBuf,
    pub content: String,
    /// Hex SHA-256 of the content.
    pub identity: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: PathBuf, content: String) -> Self {
        let identity = content_hash(&content);
        Self {
            path,
            content,
            identity,
        }
    }
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

type Snapshot = HashMap<PathBuf, Option<Arc<SourceFile>>>;

/// Read-mostly source file cache shared by every document of one build run.
///
/// # Thread Safety
///
/// - `RwLock<Arc<..>>` holds the current snapshot, write-locked only to swap it
/// - `Mutex<()>` serializes populate so each path is loaded at most once
#[derive(Debug, Default)]
pub struct ContentCache {
    snapshot: RwLock<Arc<Snapshot>>,
    populate_lock: Mutex<()>,
}

impl ContentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a file, calling `loader` on the first request for its path.
    ///
    /// `loader` receives the normalized path and returns the content, or
    /// `None` when the file does not exist.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn get_or_load<F>(&self, path: &Path, loader: F) -> Option<Arc<SourceFile>>
    where
        F: FnOnce(&Path) -> Option<String>,
    {
        let key = normalize_path(path);
        if let Some(entry) = self.lookup(&key) {
            return entry;
        }

        let _guard = self.populate_lock.lock().unwrap();

        // Another thread may have loaded it while we waited.
        if let Some(entry) = self.lookup(&key) {
            return entry;
        }

        let entry = loader(&key).map(|content| Arc::new(SourceFile::new(key.clone(), content)));
        tracing::debug!(
            path = %key.display(),
            found = entry.is_some(),
            "Source file cached"
        );

        let mut next = Snapshot::clone(&self.current());
        next.insert(key, entry.clone());
        *self.snapshot.write().unwrap() = Arc::new(next);

        entry
    }

    /// Get a file from disk, reading it on the first request.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn get_or_read(&self, path: &Path) -> Option<Arc<SourceFile>> {
        self.get_or_load(path, |path| match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Source file not readable");
                None
            }
        })
    }

    /// Number of cached paths, missing files included.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().unwrap().clone()
    }

    fn lookup(&self, key: &Path) -> Option<Option<Arc<SourceFile>>> {
        self.current().get(key).cloned()
    }
}

/// Normalize a path lexically: drop `.` and fold `..` into its parent.
///
/// The filesystem is not consulted, so symlinks are not resolved.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rayon::prelude::*;

    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("docs/./snippets/../code/a.cs")),
            PathBuf::from("docs/code/a.cs")
        );
        assert_eq!(normalize_path(Path::new("../a.cs")), PathBuf::from("../a.cs"));
        assert_eq!(normalize_path(Path::new("/../a.cs")), PathBuf::from("/a.cs"));
    }

    #[test]
    fn test_loads_once_per_path() {
        let cache = ContentCache::new();
        let calls = AtomicUsize::new(0);
        let loader = |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some("x\n".to_owned())
        };

        let first = cache.get_or_load(Path::new("a/b.cs"), loader).unwrap();
        let second = cache.get_or_load(Path::new("a/./b.cs"), loader).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.path, PathBuf::from("a/b.cs"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_cached() {
        let cache = ContentCache::new();
        let calls = AtomicUsize::new(0);
        let loader = |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        };

        assert!(cache.get_or_load(Path::new("gone.cs"), loader).is_none());
        assert!(cache.get_or_load(Path::new("gone.cs"), loader).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_identity_is_content_hash() {
        let a = SourceFile::new(PathBuf::from("a"), "same".to_owned());
        let b = SourceFile::new(PathBuf::from("b"), "same".to_owned());
        let c = SourceFile::new(PathBuf::from("c"), "other".to_owned());
        assert_eq!(a.identity, b.identity);
        assert_ne!(a.identity, c.identity);
        assert_eq!(a.identity.len(), 64);
    }

    #[test]
    fn test_get_or_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Program.cs");
        fs::write(&path, "class Program {}\n").unwrap();

        let cache = ContentCache::new();
        let file = cache.get_or_read(&path).unwrap();
        assert_eq!(file.content, "class Program {}\n");
        assert!(cache.get_or_read(&dir.path().join("missing.cs")).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_readers_share_one_load() {
        let cache = ContentCache::new();
        let calls = AtomicUsize::new(0);

        let identities: Vec<String> = (0..64)
            .into_par_iter()
            .map(|_| {
                cache
                    .get_or_load(Path::new("shared.cs"), |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Some("shared\n".to_owned())
                    })
                    .unwrap()
                    .identity
                    .clone()
            })
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(identities.windows(2).all(|w| w[0] == w[1]));
    }
}
