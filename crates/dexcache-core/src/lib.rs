//! Core library for dexcache.
//!
//! This crate contains the data orchestration layer that sits between a
//! presentation layer and the public PokeAPI catalog:
//!
//! - `api`: the `CatalogGateway` trait and the `reqwest`-backed `PokeApiClient`
//! - `cache`: disk caches for catalog/detail records and image blobs
//! - `service`: `CatalogService`, read-through/write-through over the gateway
//! - `session`: `BrowseSession`, the owner of browse state and selection
//! - `models`: domain types shared by all of the above

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod service;
pub mod session;

pub use api::{CatalogGateway, PokeApiClient, RemoteFetchError};
pub use cache::{ImageCache, RecordStore};
pub use config::Config;
pub use models::{CatalogEntry, ClassificationSet, DetailedEntry, FilterMode};
pub use service::CatalogService;
pub use session::{BrowseSession, ImageSource, SessionEvent};
