//! Local disk caches.
//!
//! - `RecordStore`: the catalog list and per-entry detail records as JSON
//! - `ImageCache`: raw image bytes, one file per entry id
//!
//! Both caches are best-effort: failures are logged and absorbed, so a
//! broken cache only costs a network round trip. Neither cache evicts.

pub mod error;
mod fs;
pub mod images;
pub mod records;

pub use error::CacheIoError;
pub use images::ImageCache;
pub use records::{CachedData, RecordStore};
