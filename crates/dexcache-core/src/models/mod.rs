//! Data models for catalog entities.
//!
//! - `CatalogEntry`: one browsable item, optionally carrying detail fields
//! - `ClassificationSet`, `FilterMode`: gender partition of the catalog
//! - `wire`: response shapes returned by the remote API

pub mod entry;
pub mod filter;
pub mod wire;

pub use entry::{id_from_url, CatalogEntry, DetailedEntry};
pub use filter::{ClassificationSet, FilterMode};
pub use wire::{WireDetail, WireEntry};
