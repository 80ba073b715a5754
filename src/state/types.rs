//! State types for a paginated list
//!
//! `PaginationState` is the single record owned by the engine. It is never
//! mutated after being published: every transition builds a new value.

use serde::Serialize;
use std::fmt;

/// Snapshot of a paginated list and the operation currently running on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationState<T> {
    /// All loaded items, in fetch order (concatenation of `pages`)
    pub items: Vec<T>,
    /// Per-fetch chunks, in fetch order
    pub pages: Vec<Vec<T>>,
    /// Last successfully fetched page index (page mode only)
    pub current_page: u32,
    /// Continuation token for the next fetch (cursor mode only)
    pub cursor: Option<String>,
    /// Whether a further load-more is meaningful
    pub has_more: bool,
    /// Initial load in flight
    pub is_loading: bool,
    /// Load-more in flight
    pub is_loading_more: bool,
    /// Refresh in flight
    pub is_refreshing: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
    /// Caller supplied total count hint, passed through untouched
    pub total_items: Option<u64>,
}

impl<T> PaginationState<T> {
    /// Create the canonical empty record
    pub fn new(initial_page: u32, total_items: Option<u64>) -> Self {
        Self {
            items: Vec::new(),
            pages: Vec::new(),
            current_page: initial_page,
            cursor: None,
            has_more: true,
            is_loading: false,
            is_loading_more: false,
            is_refreshing: false,
            error: None,
            total_items,
        }
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of chunks fetched so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// `has_more && !is_loading_more && !is_loading`
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading_more && !self.is_loading
    }

    /// Check if any kind of operation is marked as running
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more || self.is_refreshing
    }

    /// Check if the last operation failed
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check the `items`/`pages` consistency invariant
    pub fn is_consistent(&self) -> bool {
        self.items.len() == self.pages.iter().map(Vec::len).sum::<usize>()
    }
}

/// The kind of operation the engine is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// First fetch, shows the full-screen loading state
    Initial,
    /// Append the next chunk
    LoadMore,
    /// Re-run the first fetch while existing items stay visible
    Refresh,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("initial load"),
            Self::LoadMore => f.write_str("load more"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}
