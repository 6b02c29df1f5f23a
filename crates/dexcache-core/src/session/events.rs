use std::fmt;

use crate::models::FilterMode;

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Memory,
    Disk,
    Network,
}

/// Which remote operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOperation {
    Catalog,
    Detail,
    Image,
}

impl fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchOperation::Catalog => "catalog",
            FetchOperation::Detail => "detail",
            FetchOperation::Image => "image",
        };
        f.write_str(name)
    }
}

/// State-change notifications broadcast to presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Catalog and classification were (re)published
    CatalogLoaded { count: usize },
    /// The filtered view was recomputed
    FilterApplied { mode: FilterMode, count: usize },
    /// Selection slot changed; `generation` is the new fencing token
    SelectionChanged { id: Option<i64>, generation: u64 },
    /// Detail fields were merged for an entry
    DetailApplied { id: i64 },
    ImageResolved { id: i64, source: ImageSource },
    DownloadStateChanged(bool),
    /// A remote fetch failed; state was left unchanged
    FetchFailed { operation: FetchOperation, message: String },
}
