//! Engine builder
//!
//! Collects options and exactly one data source, and refuses to build
//! anything ambiguous.

use super::{ErrorCallback, PaginationEngine};
use crate::config::EngineOptions;
use crate::error::{Error, Result};
use crate::pagination::{
    cursor_fn, page_fn, CursorPage, CursorSource, DataSource, PageSource,
};
use crate::state::OperationKind;
use crate::types::{BackoffType, PaginationMode};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`PaginationEngine`]
pub struct PaginationEngineBuilder<T> {
    options: EngineOptions,
    page_source: Option<Arc<dyn PageSource<T>>>,
    cursor_source: Option<Arc<dyn CursorSource<T>>>,
    on_error: Option<ErrorCallback>,
}

impl<T> PaginationEngineBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a builder with default options and no source
    pub fn new() -> Self {
        Self {
            options: EngineOptions::default(),
            page_source: None,
            cursor_source: None,
            on_error: None,
        }
    }

    /// Replace all options at once
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.options.page_size = page_size;
        self
    }

    /// Set the first page index (page mode only)
    #[must_use]
    pub fn initial_page(mut self, page: u32) -> Self {
        self.options.initial_page = page;
        self
    }

    /// Enable or disable the automatic initial load on attach
    #[must_use]
    pub fn auto_load(mut self, auto_load: bool) -> Self {
        self.options.auto_load = auto_load;
        self
    }

    /// Set the total count hint
    #[must_use]
    pub fn total_items(mut self, total: u64) -> Self {
        self.options.total_items = Some(total);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.options.max_retries = retries;
        self
    }

    /// Set the delay before the first retry
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay_ms = delay.as_millis() as u64;
        self.options.max_retry_delay_ms = self
            .options
            .max_retry_delay_ms
            .max(self.options.retry_delay_ms);
        self
    }

    /// Set backoff type
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffType) -> Self {
        self.options.backoff = backoff;
        self
    }

    /// Declare the expected pagination mode
    #[must_use]
    pub fn pagination_mode(mut self, mode: PaginationMode) -> Self {
        self.options.pagination_mode = Some(mode);
        self
    }

    /// Use a page-based source
    #[must_use]
    pub fn page_source(mut self, source: impl PageSource<T> + 'static) -> Self {
        self.page_source = Some(Arc::new(source));
        self
    }

    /// Use a cursor-based source
    #[must_use]
    pub fn cursor_source(mut self, source: impl CursorSource<T> + 'static) -> Self {
        self.cursor_source = Some(Arc::new(source));
        self
    }

    /// Use an already resolved source
    #[must_use]
    pub fn source(self, source: DataSource<T>) -> Self {
        match source {
            DataSource::Page(source) => Self {
                page_source: Some(source),
                ..self
            },
            DataSource::Cursor(source) => Self {
                cursor_source: Some(source),
                ..self
            },
        }
    }

    /// Use `fetch(page, page_size)` as a page-based source
    #[must_use]
    pub fn fetch_data<F, Fut, E>(self, fetch: F) -> Self
    where
        F: Fn(u32, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<T>, E>> + Send + 'static,
        E: Into<Error> + 'static,
    {
        self.page_source(page_fn(fetch))
    }

    /// Use `fetch(cursor, page_size)` as a cursor-based source
    #[must_use]
    pub fn fetch_cursor<F, Fut, E>(self, fetch: F) -> Self
    where
        F: Fn(Option<String>, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<CursorPage<T>, E>> + Send + 'static,
        E: Into<Error> + 'static,
    {
        self.cursor_source(cursor_fn(fetch))
    }

    /// Called when an operation that still owns the state fails for good
    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error, OperationKind) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Validate and build the engine
    pub fn build(self) -> Result<PaginationEngine<T>> {
        self.options.validate()?;

        let source = match (self.page_source, self.cursor_source) {
            (Some(source), None) => DataSource::Page(source),
            (None, Some(source)) => DataSource::Cursor(source),
            (None, None) => {
                return Err(Error::config(
                    "No data source configured: supply fetch_data or fetch_cursor",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Both a page source and a cursor source were supplied; pagination mode is ambiguous",
                ))
            }
        };

        if let Some(mode) = self.options.pagination_mode {
            if mode != source.mode() {
                return Err(Error::config(format!(
                    "pagination_mode is '{mode}' but a {} source was supplied",
                    source.mode()
                )));
            }
        }

        Ok(PaginationEngine::from_parts(
            source,
            self.options,
            self.on_error,
        ))
    }
}

impl<T> Default for PaginationEngineBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PaginationEngineBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationEngineBuilder")
            .field("options", &self.options)
            .field("has_page_source", &self.page_source.is_some())
            .field("has_cursor_source", &self.cursor_source.is_some())
            .field("has_error_callback", &self.on_error.is_some())
            .finish()
    }
}
