//! Read-through/write-through access to the remote catalog.
//!
//! `CatalogService` pairs a `CatalogGateway` with a `RecordStore`: catalog
//! and detail reads consult the store first, and every successful remote
//! fetch is written back. Classification groups and images are never cached
//! here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{CatalogGateway, RemoteFetchError};
use crate::cache::RecordStore;
use crate::models::{CatalogEntry, DetailedEntry, WireEntry};

/// Gender group id for female entries on the remote API.
pub const FEMALE_GROUP_ID: u32 = 1;

/// Gender group id for male entries on the remote API.
pub const MALE_GROUP_ID: u32 = 2;

pub struct CatalogService {
    gateway: Arc<dyn CatalogGateway>,
    records: RecordStore,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn CatalogGateway>, records: RecordStore) -> Self {
        Self { gateway, records }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Map wire records to entries, dropping those without a parsable id.
    fn to_entries(wire: Vec<WireEntry>) -> Vec<CatalogEntry> {
        wire.into_iter()
            .filter_map(|w| {
                let entry = w.to_entry();
                if entry.is_none() {
                    warn!(name = %w.name, url = %w.url, "Dropping record without numeric id");
                }
                entry
            })
            .collect()
    }

    /// Return the persisted catalog if it is non-empty, otherwise refresh.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, RemoteFetchError> {
        match self.records.load_catalog() {
            Some(cached) if !cached.is_empty() => {
                debug!(count = cached.len(), "Catalog served from cache");
                Ok(cached)
            }
            _ => self.refresh_catalog().await,
        }
    }

    /// Fetch the catalog from the remote service and persist it.
    pub async fn refresh_catalog(&self) -> Result<Vec<CatalogEntry>, RemoteFetchError> {
        let wire = self.gateway.fetch_catalog_page().await?;
        let entries = Self::to_entries(wire);
        self.records.save_catalog(&entries);
        info!(count = entries.len(), "Catalog refreshed");
        Ok(entries)
    }

    /// Fetch the members of one classification group. Always live.
    pub async fn fetch_classification(&self, group_id: u32) -> Result<Vec<CatalogEntry>, RemoteFetchError> {
        let wire = self.gateway.fetch_classification_group(group_id).await?;
        let entries = Self::to_entries(wire);
        debug!(group_id, count = entries.len(), "Classification group fetched");
        Ok(entries)
    }

    /// Resolve detail fields for `entry`, preferring a detail-complete
    /// persisted record over the network.
    pub async fn fetch_detail(&self, entry: &CatalogEntry) -> Result<DetailedEntry, RemoteFetchError> {
        if let Some(cached) = self.records.load_detail(entry.id) {
            if cached.is_detail_complete() {
                debug!(id = entry.id, "Detail served from cache");
                return Ok(cached);
            }
        }

        let detail = self.gateway.fetch_detail_record(&entry.detail_url).await?;
        let detailed = detail.merge_into(entry);
        self.records.save_detail(&detailed);
        debug!(id = entry.id, "Detail fetched");
        Ok(detailed)
    }

    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError> {
        self.gateway.fetch_bytes(url).await
    }
}

// ============================================================================
// Tests
// ============================================================================
