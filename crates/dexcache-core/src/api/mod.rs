//! Remote catalog access.
//!
//! This module provides the `CatalogGateway` trait consumed by the service
//! layer and `PokeApiClient`, its implementation over the public PokeAPI
//! REST endpoints.

pub mod client;
pub mod error;
pub mod gateway;
#[cfg(test)]
pub mod mock;

pub use client::PokeApiClient;
pub use error::RemoteFetchError;
pub use gateway::CatalogGateway;
