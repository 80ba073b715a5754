//! In-memory data source for the simulator

use crate::error::{Error, Result};
use crate::pagination::{CursorPage, CursorSource, DataSource, PageSource};
use crate::types::PaginationMode;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serves the numbers `0..total`, optionally slow and flaky
///
/// In cursor mode the cursor is the decimal offset of the next item.
#[derive(Debug)]
pub struct SyntheticSource {
    total: u32,
    latency: Duration,
    failures_left: AtomicU32,
}

impl SyntheticSource {
    /// Create a source holding `total` items
    pub fn new(total: u32) -> Self {
        Self {
            total,
            latency: Duration::ZERO,
            failures_left: AtomicU32::new(0),
        }
    }

    /// Delay every fetch
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the first `count` fetches
    #[must_use]
    pub fn with_failures(self, count: u32) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Wrap into a data source of the given mode
    pub fn into_source(self, mode: PaginationMode) -> DataSource<u32> {
        let source = Arc::new(self);
        match mode {
            PaginationMode::Page => DataSource::Page(source),
            PaginationMode::Cursor => DataSource::Cursor(source),
        }
    }

    async fn fetch(&self, offset: u32, page_size: u32) -> Result<Vec<u32>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            debug!("Synthetic failure at offset {offset}");
            return Err(Error::fetch(format!("simulated failure at offset {offset}")));
        }

        let end = offset.saturating_add(page_size).min(self.total);
        Ok((offset.min(end)..end).collect())
    }
}

#[async_trait]
impl PageSource<u32> for SyntheticSource {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<u32>> {
        self.fetch(page.saturating_mul(page_size), page_size).await
    }
}

#[async_trait]
impl CursorSource<u32> for SyntheticSource {
    async fn fetch_cursor(&self, cursor: Option<String>, page_size: u32) -> Result<CursorPage<u32>> {
        let offset = match cursor {
            Some(cursor) => cursor
                .parse::<u32>()
                .map_err(|e| Error::fetch(format!("invalid cursor '{cursor}': {e}")))?,
            None => 0,
        };

        let items = self.fetch(offset, page_size).await?;
        let next = offset + items.len() as u32;
        if next < self.total {
            Ok(CursorPage::new(items, next.to_string()))
        } else {
            Ok(CursorPage::last(items))
        }
    }
}
