//! Pure state transitions
//!
//! Every function takes the current record by reference (or a freshly built
//! one by value) and returns the next record. Nothing here performs I/O.

use super::types::{OperationKind, PaginationState};
use crate::pagination::Continuation;

/// Construction-time record; `is_loading` mirrors whether an initial load
/// will be triggered automatically.
pub fn initial_state<T>(
    initial_page: u32,
    total_items: Option<u64>,
    auto_load: bool,
) -> PaginationState<T> {
    PaginationState {
        is_loading: auto_load,
        ..PaginationState::new(initial_page, total_items)
    }
}

/// Mark an operation of `kind` as started
///
/// Exactly one loading flag is set afterwards: a starting operation owns the
/// flags of whatever it superseded.
pub fn begin<T: Clone>(current: &PaginationState<T>, kind: OperationKind) -> PaginationState<T> {
    PaginationState {
        is_loading: kind == OperationKind::Initial,
        is_loading_more: kind == OperationKind::LoadMore,
        is_refreshing: kind == OperationKind::Refresh,
        error: None,
        ..current.clone()
    }
}

/// Initial load or refresh succeeded: the fresh record replaces everything
pub fn reduce_initial_success<T>(
    fresh: PaginationState<T>,
    kind: OperationKind,
) -> PaginationState<T> {
    debug_assert_ne!(kind, OperationKind::LoadMore);
    PaginationState {
        is_loading: false,
        is_loading_more: false,
        is_refreshing: false,
        error: None,
        ..fresh
    }
}

/// Initial load or refresh failed: previously loaded content is kept
pub fn reduce_initial_failure<T: Clone>(
    current: &PaginationState<T>,
    message: impl Into<String>,
    kind: OperationKind,
) -> PaginationState<T> {
    let mut next = current.clone();
    match kind {
        OperationKind::Initial => next.is_loading = false,
        OperationKind::Refresh => next.is_refreshing = false,
        OperationKind::LoadMore => next.is_loading_more = false,
    }
    next.error = Some(message.into());
    next
}

/// Load-more succeeded: append the chunk and advance the position
pub fn reduce_load_more_success<T: Clone>(
    current: &PaginationState<T>,
    chunk: Vec<T>,
    continuation: Continuation,
    has_more: bool,
) -> PaginationState<T> {
    let mut next = current.clone();
    next.items.extend(chunk.iter().cloned());
    next.pages.push(chunk);
    match continuation {
        Continuation::Page(page) => next.current_page = page,
        Continuation::Cursor(cursor) => next.cursor = cursor,
    }
    next.has_more = has_more;
    next.is_loading_more = false;
    next.error = None;
    next
}

/// Load-more failed: items, pages and `has_more` are untouched
pub fn reduce_load_more_failure<T: Clone>(
    current: &PaginationState<T>,
    message: impl Into<String>,
) -> PaginationState<T> {
    PaginationState {
        is_loading_more: false,
        error: Some(message.into()),
        ..current.clone()
    }
}

/// Canonical empty record, nothing in flight
pub fn reduce_reset<T>(initial_page: u32, total_items: Option<u64>) -> PaginationState<T> {
    PaginationState::new(initial_page, total_items)
}

/// The task that owned the in-flight slot went away without resolving
pub fn reduce_abandoned<T: Clone>(current: &PaginationState<T>) -> PaginationState<T> {
    PaginationState {
        is_loading: false,
        is_loading_more: false,
        is_refreshing: false,
        ..current.clone()
    }
}
