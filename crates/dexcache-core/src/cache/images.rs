use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::fs::write_atomic;

/// Disk-backed cache of image bytes, one file per entry id.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "Failed to create image cache directory");
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn image_path(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{}.png", id))
    }

    pub fn save(&self, data: &[u8], id: i64) {
        match write_atomic(&self.image_path(id), data) {
            Ok(()) => debug!(id, bytes = data.len(), "Image cached"),
            Err(e) => warn!(id, error = %e, "Failed to cache image"),
        }
    }

    pub fn load(&self, id: i64) -> Option<Vec<u8>> {
        let path = self.image_path(id);
        if !path.exists() {
            return None;
        }
        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(id, error = %e, "Failed to read cached image");
                None
            }
        }
    }

    pub fn has(&self, id: i64) -> bool {
        self.image_path(id).is_file()
    }

    /// Remove every file in the cache directory, continuing past failures.
    /// Returns the number of files removed.
    pub fn clear(&self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to list image cache");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove cached image"),
            }
        }
        info!(removed, "Image cache cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_has() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("images"));

        assert!(!cache.has(7));
        assert!(cache.load(7).is_none());

        cache.save(&[0x89, b'P', b'N', b'G'], 7);
        assert!(cache.has(7));
        assert_eq!(cache.load(7), Some(vec![0x89, b'P', b'N', b'G']));
        assert!(cache.load(8).is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path());

        cache.save(b"old", 1);
        cache.save(b"new", 1);
        assert_eq!(cache.load(1).as_deref(), Some(&b"new"[..]));
    }

    #[test]
    fn test_clear_removes_all_files() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path());
        for id in 1..=5 {
            cache.save(b"img", id);
        }
        // Subdirectories are left alone
        fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(cache.clear(), 5);
        for id in 1..=5 {
            assert!(!cache.has(id));
        }
        assert!(dir.path().join("nested").is_dir());
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_clear_missing_dir_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("images"));
        fs::remove_dir_all(cache.dir()).unwrap();
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("images"));
        fs::remove_dir_all(cache.dir()).unwrap();

        cache.save(b"img", 3);
        assert!(!cache.has(3));
    }
}
