use async_trait::async_trait;

use super::RemoteFetchError;
use crate::models::{WireDetail, WireEntry};

/// Network access to the remote catalog.
///
/// Implementations perform one request per call and never cache; caching is
/// layered on top by `CatalogService` and `BrowseSession`.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the catalog listing.
    async fn fetch_catalog_page(&self) -> Result<Vec<WireEntry>, RemoteFetchError>;

    /// Fetch the members of one classification (gender) group.
    async fn fetch_classification_group(&self, group_id: u32) -> Result<Vec<WireEntry>, RemoteFetchError>;

    /// Fetch the detail record at `url`.
    async fn fetch_detail_record(&self, url: &str) -> Result<WireDetail, RemoteFetchError>;

    /// Fetch raw bytes at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError>;
}
