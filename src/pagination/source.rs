//! Data source resolution
//!
//! `DataSource` fixes the pagination mode once, at construction, and exposes
//! the two fetch contracts the engine needs regardless of that mode.

use super::types::{Continuation, CursorSource, LoadMoreChunk, PageSource};
use crate::error::{Error, Result};
use crate::state::PaginationState;
use crate::types::{OptionStringExt, PaginationMode};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A page-based or cursor-based data source
pub enum DataSource<T> {
    /// Sequential integer pages
    Page(Arc<dyn PageSource<T>>),
    /// Opaque continuation tokens
    Cursor(Arc<dyn CursorSource<T>>),
}

impl<T> DataSource<T> {
    /// Wrap a page source
    pub fn page(source: impl PageSource<T> + 'static) -> Self {
        Self::Page(Arc::new(source))
    }

    /// Wrap a cursor source
    pub fn cursor(source: impl CursorSource<T> + 'static) -> Self {
        Self::Cursor(Arc::new(source))
    }

    /// The mode this source was built with
    pub fn mode(&self) -> PaginationMode {
        match self {
            Self::Page(_) => PaginationMode::Page,
            Self::Cursor(_) => PaginationMode::Cursor,
        }
    }

    /// Check if this is a cursor-based source
    pub fn is_cursor_mode(&self) -> bool {
        self.mode().is_cursor()
    }
}

impl<T: Clone + Send + 'static> DataSource<T> {
    /// Fetch the first chunk and build a fresh state from it
    ///
    /// Page mode starts at `initial_page`; cursor mode starts without a
    /// cursor and keeps `current_page` at 0.
    pub async fn load_initial(
        &self,
        initial_page: u32,
        page_size: u32,
        total_items: Option<u64>,
    ) -> Result<PaginationState<T>> {
        let mut state = PaginationState::new(initial_page, total_items);

        let items = match self {
            Self::Page(source) => {
                debug!("Fetching page {initial_page} (size {page_size})");
                let items = source.fetch_page(initial_page, page_size).await?;
                state.has_more = items.len() >= page_size as usize;
                items
            }
            Self::Cursor(source) => {
                debug!("Fetching first cursor chunk (size {page_size})");
                let response = source.fetch_cursor(None, page_size).await?;
                let cursor = response.next_cursor.none_if_empty();
                state.current_page = 0;
                state.has_more = response.has_more && cursor.is_some();
                state.cursor = cursor;
                response.items
            }
        };

        state.items = items.clone();
        state.pages = vec![items];
        Ok(state)
    }

    /// Fetch the chunk following `state`
    ///
    /// Fails with [`Error::NoCursor`] in cursor mode when the state has no
    /// cursor; the engine checks this before calling.
    pub async fn load_more(
        &self,
        state: &PaginationState<T>,
        page_size: u32,
    ) -> Result<LoadMoreChunk<T>> {
        match self {
            Self::Page(source) => {
                let next_page = state
                    .current_page
                    .checked_add(1)
                    .ok_or_else(|| Error::Other("Page index overflow".to_string()))?;
                debug!("Fetching page {next_page} (size {page_size})");
                let items = source.fetch_page(next_page, page_size).await?;
                let has_more = items.len() >= page_size as usize;
                Ok(LoadMoreChunk {
                    items,
                    continuation: Continuation::Page(next_page),
                    has_more,
                })
            }
            Self::Cursor(source) => {
                let cursor = state.cursor.clone().ok_or(Error::NoCursor)?;
                debug!("Fetching cursor chunk after {cursor} (size {page_size})");
                let response = source.fetch_cursor(Some(cursor), page_size).await?;
                let next_cursor = response.next_cursor.none_if_empty();
                let has_more = response.has_more && next_cursor.is_some();
                Ok(LoadMoreChunk {
                    items: response.items,
                    continuation: Continuation::Cursor(next_cursor),
                    has_more,
                })
            }
        }
    }
}

impl<T> Clone for DataSource<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Page(source) => Self::Page(Arc::clone(source)),
            Self::Cursor(source) => Self::Cursor(Arc::clone(source)),
        }
    }
}

impl<T> fmt::Debug for DataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataSource").field(&self.mode()).finish()
    }
}
