use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::fs::{read_json, write_json};
use super::CacheIoError;
use crate::models::{CatalogEntry, DetailedEntry};

/// Catalog list file name
const CATALOG_FILE: &str = "catalog.json";

/// Subdirectory holding one detail record per entry id
const DETAILS_DIR: &str = "details";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Disk-backed store for the catalog list and detail records.
///
/// Owns its directory exclusively. All writes are atomic replaces and
/// every failure is logged and swallowed.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let store = Self { dir: dir.into() };
        let details = store.details_dir();
        if let Err(e) = std::fs::create_dir_all(&details) {
            warn!(dir = %details.display(), error = %e, "Failed to create detail cache directory");
        }
        store
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn details_dir(&self) -> PathBuf {
        self.dir.join(DETAILS_DIR)
    }

    fn detail_path(&self, id: i64) -> PathBuf {
        self.details_dir().join(format!("{}.json", id))
    }

    fn read_catalog(&self) -> Result<Option<CachedData<Vec<CatalogEntry>>>, CacheIoError> {
        read_json(&self.catalog_path())
    }

    // ===== Catalog =====

    pub fn save_catalog(&self, entries: &[CatalogEntry]) {
        match write_json(&self.catalog_path(), &CachedData::new(entries)) {
            Ok(()) => debug!(count = entries.len(), "Catalog cached"),
            Err(e) => warn!(error = %e, "Failed to save catalog"),
        }
    }

    /// `None` when nothing is cached or the file cannot be decoded.
    /// An empty list is returned as `Some(vec![])`.
    pub fn load_catalog(&self) -> Option<Vec<CatalogEntry>> {
        match self.read_catalog() {
            Ok(cached) => cached.map(|c| c.data),
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                None
            }
        }
    }

    /// Human readable age of the cached catalog, if any.
    pub fn catalog_age(&self) -> Option<String> {
        match self.read_catalog() {
            Ok(cached) => cached.map(|c| c.age_display()),
            Err(e) => {
                debug!(error = %e, "Failed to load catalog for age display");
                None
            }
        }
    }

    // ===== Detail records =====

    pub fn save_detail(&self, entry: &DetailedEntry) {
        match write_json(&self.detail_path(entry.id), entry) {
            Ok(()) => debug!(id = entry.id, "Detail cached"),
            Err(e) => warn!(id = entry.id, error = %e, "Failed to save detail"),
        }
    }

    pub fn load_detail(&self, id: i64) -> Option<DetailedEntry> {
        match read_json(&self.detail_path(id)) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(id, error = %e, "Failed to load detail");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
