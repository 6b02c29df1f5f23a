//! API client for the public PokeAPI REST service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CatalogGateway, RemoteFetchError};
use crate::config::Config;
use crate::models::wire::{CatalogPageResponse, GenderResponse};
use crate::models::{WireDetail, WireEntry};

/// Default base URL for the API
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Number of entries requested for the catalog listing.
pub const DEFAULT_CATALOG_LIMIT: u32 = 100;

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for PokeAPI.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
    catalog_limit: u32,
}

impl PokeApiClient {
    pub fn new(
        base_url: impl Into<String>,
        catalog_limit: u32,
        timeout: Duration,
    ) -> Result<Self, RemoteFetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self::parse_url(&base_url)?;

        Ok(Self {
            client,
            base_url,
            catalog_limit,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteFetchError> {
        Self::new(
            config.api_base_url(),
            config.catalog_limit(),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn catalog_url(&self) -> String {
        format!("{}/pokemon?limit={}", self.base_url, self.catalog_limit)
    }

    fn gender_url(&self, group_id: u32) -> String {
        format!("{}/gender/{}/", self.base_url, group_id)
    }

    fn parse_url(url: &str) -> Result<Url, RemoteFetchError> {
        Url::parse(url).map_err(|e| RemoteFetchError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteFetchError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteFetchError::from_status(status, &body))
        }
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, RemoteFetchError> {
        let url = Self::parse_url(url)?;
        debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        Self::check_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteFetchError> {
        let response = self.send(url).await?;
        let text = response.text().await?;
        Self::decode(url, &text)
    }

    fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, RemoteFetchError> {
        let value = serde_json::from_str(text).inspect_err(|e| {
            let preview: String = text.chars().take(200).collect();
            debug!(url, error = %e, body = %preview, "Failed to decode response");
        })?;
        Ok(value)
    }
}

#[async_trait]
impl CatalogGateway for PokeApiClient {
    async fn fetch_catalog_page(&self) -> Result<Vec<WireEntry>, RemoteFetchError> {
        let page: CatalogPageResponse = self.get(&self.catalog_url()).await?;
        debug!(count = page.results.len(), "Catalog page fetched");
        Ok(page.results)
    }

    async fn fetch_classification_group(&self, group_id: u32) -> Result<Vec<WireEntry>, RemoteFetchError> {
        let response: GenderResponse = self.get(&self.gender_url(group_id)).await?;
        Ok(response
            .pokemon_species_details
            .into_iter()
            .map(|detail| detail.pokemon_species)
            .collect())
    }

    async fn fetch_detail_record(&self, url: &str) -> Result<WireDetail, RemoteFetchError> {
        self.get(url).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError> {
        let response = self.send(url).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
