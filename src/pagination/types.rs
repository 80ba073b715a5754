//! Pagination types and traits
//!
//! Defines the data source contracts and the shapes exchanged between the
//! resolver, the reducer and the engine.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Response of a cursor-based fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// Items of this chunk
    pub items: Vec<T>,
    /// Token for the following chunk, if any
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether the source reports more data
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// Create a chunk that continues at `next_cursor`
    pub fn new(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(next_cursor.into()),
            has_more: true,
        }
    }

    /// Create the final chunk
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Where the next fetch continues from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Page index that was just fetched
    Page(u32),
    /// Cursor for the next fetch (`None` when the source is exhausted)
    Cursor(Option<String>),
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "page {page}"),
            Self::Cursor(Some(cursor)) => write!(f, "cursor {cursor}"),
            Self::Cursor(None) => f.write_str("end of cursor"),
        }
    }
}

/// Result of a load-more fetch, ready to be folded into the state
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMoreChunk<T> {
    /// The new chunk
    pub items: Vec<T>,
    /// Updated page index or cursor
    pub continuation: Continuation,
    /// Recomputed `has_more`
    pub has_more: bool,
}

/// A source addressed by sequential page index
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch page `page` holding up to `page_size` items
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<T>>;
}

/// A source addressed by opaque continuation token
#[async_trait]
pub trait CursorSource<T>: Send + Sync {
    /// Fetch the chunk after `cursor` (`None` for the first chunk)
    async fn fetch_cursor(&self, cursor: Option<String>, page_size: u32)
        -> Result<CursorPage<T>>;
}

// ============================================================================
// Closure Adapters
// ============================================================================

/// Page source backed by a closure, see [`page_fn`]
#[derive(Clone)]
pub struct PageFn<F> {
    f: F,
}

/// Wrap `Fn(page, page_size) -> Future<Output = Result<Vec<T>, E>>` as a [`PageSource`]
///
/// Any error type convertible into [`Error`] is accepted, including
/// `anyhow::Error` and plain strings.
pub fn page_fn<F, Fut>(f: F) -> PageFn<F>
where
    F: Fn(u32, u32) -> Fut,
{
    PageFn { f }
}

#[async_trait]
impl<T, F, Fut, E> PageSource<T> for PageFn<F>
where
    T: Send + 'static,
    F: Fn(u32, u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Vec<T>, E>> + Send + 'static,
    E: Into<Error> + 'static,
{
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<T>> {
        (self.f)(page, page_size).await.map_err(Into::into)
    }
}

impl<F> fmt::Debug for PageFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFn").finish_non_exhaustive()
    }
}

/// Cursor source backed by a closure, see [`cursor_fn`]
#[derive(Clone)]
pub struct CursorFn<F> {
    f: F,
}

/// Wrap `Fn(cursor, page_size) -> Future<Output = Result<CursorPage<T>, E>>` as a [`CursorSource`]
pub fn cursor_fn<F, Fut>(f: F) -> CursorFn<F>
where
    F: Fn(Option<String>, u32) -> Fut,
{
    CursorFn { f }
}

#[async_trait]
impl<T, F, Fut, E> CursorSource<T> for CursorFn<F>
where
    T: Send + 'static,
    F: Fn(Option<String>, u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<CursorPage<T>, E>> + Send + 'static,
    E: Into<Error> + 'static,
{
    async fn fetch_cursor(
        &self,
        cursor: Option<String>,
        page_size: u32,
    ) -> Result<CursorPage<T>> {
        (self.f)(cursor, page_size).await.map_err(Into::into)
    }
}

impl<F> fmt::Debug for CursorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorFn").finish_non_exhaustive()
    }
}
