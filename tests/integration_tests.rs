//! Integration tests through the public API
//!
//! Tests the full flow: options → source → engine → state snapshots

use async_trait::async_trait;
use futures::StreamExt;
use pagewise::cli::SyntheticSource;
use pagewise::{
    load_options, CursorPage, CursorSource, DataSource, EngineOptions, Error, OperationOutcome,
    PageSource, PaginationEngine, PaginationMode, PaginationState, RetryPolicy, SkipReason,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// Sources
// ============================================================================

/// Remote list of user names, served with a fixed latency
struct UserDirectory {
    names: Vec<String>,
    latency: Duration,
    requests: AtomicU32,
}

impl UserDirectory {
    fn new(count: usize, latency_ms: u64) -> Self {
        Self {
            names: (0..count).map(|i| format!("user-{i:03}")).collect(),
            latency: Duration::from_millis(latency_ms),
            requests: AtomicU32::new(0),
        }
    }

    fn slice(&self, offset: usize, page_size: u32) -> Vec<String> {
        self.names
            .iter()
            .skip(offset)
            .take(page_size as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PageSource<String> for UserDirectory {
    async fn fetch_page(&self, page: u32, page_size: u32) -> pagewise::Result<Vec<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        sleep(self.latency).await;
        Ok(self.slice((page * page_size) as usize, page_size))
    }
}

#[async_trait]
impl CursorSource<String> for UserDirectory {
    async fn fetch_cursor(
        &self,
        cursor: Option<String>,
        page_size: u32,
    ) -> pagewise::Result<CursorPage<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        sleep(self.latency).await;

        // The cursor is the last name already delivered
        let offset = match cursor {
            Some(last) => self
                .names
                .iter()
                .position(|name| *name == last)
                .map(|i| i + 1)
                .ok_or_else(|| Error::fetch(format!("unknown cursor {last}")))?,
            None => 0,
        };
        let items = self.slice(offset, page_size);
        match items.last() {
            Some(last) if offset + items.len() < self.names.len() => {
                let cursor = last.clone();
                Ok(CursorPage::new(items, cursor))
            }
            _ => Ok(CursorPage::last(items)),
        }
    }
}

fn options(page_size: u32) -> EngineOptions {
    EngineOptions {
        page_size,
        auto_load: false,
        retry_delay_ms: 100,
        ..Default::default()
    }
}

// ============================================================================
// End-to-end Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_page_source_end_to_end() {
    let directory = Arc::new(UserDirectory::new(45, 20));
    let engine = assert_ok!(PaginationEngine::with_source(
        DataSource::Page(directory.clone()),
        options(20),
    ));
    engine.attach();

    let snapshots: Vec<Arc<PaginationState<String>>> = engine.pages().collect().await;

    assert_eq!(
        snapshots.iter().map(|s| s.len()).collect::<Vec<_>>(),
        vec![20, 40, 45]
    );
    let last = engine.state();
    assert_eq!(last.items.first().map(String::as_str), Some("user-000"));
    assert_eq!(last.items.last().map(String::as_str), Some("user-044"));
    assert!(last.is_consistent());
    assert_eq!(directory.requests.load(Ordering::SeqCst), 3);

    assert_eq!(
        engine.load_more().await,
        OperationOutcome::Skipped(SkipReason::NoMoreData)
    );
    assert_eq!(directory.requests.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cursor_source_end_to_end() {
    let directory = Arc::new(UserDirectory::new(15, 20));
    let engine = assert_ok!(PaginationEngine::with_source(
        DataSource::Cursor(directory.clone()),
        options(10),
    ));
    assert_eq!(engine.mode(), PaginationMode::Cursor);
    engine.attach();

    assert!(engine.load_initial().await.is_applied());
    assert_eq!(engine.state().cursor.as_deref(), Some("user-009"));

    assert!(engine.load_more().await.is_applied());
    let state = engine.state();
    assert_eq!(state.len(), 15);
    assert!(!state.has_more);
    assert!(state.cursor.is_none());

    assert!(engine.load_more().await.is_skipped());
    assert_eq!(directory.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_synthetic_source_recovers_within_retry_budget() {
    let source = SyntheticSource::new(30).with_failures(3).into_source(PaginationMode::Page);
    let engine = assert_ok!(PaginationEngine::with_source(source, options(10)));
    engine.attach();

    let start = Instant::now();
    assert_eq!(engine.load_initial().await, OperationOutcome::Applied);

    // Three retries at 100ms, 200ms and 400ms
    assert!(start.elapsed() >= Duration::from_millis(700));
    assert_eq!(engine.state().len(), 10);
    assert!(engine.state().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_synthetic_source_exhausts_retry_budget() {
    let source = SyntheticSource::new(30).with_failures(4).into_source(PaginationMode::Cursor);
    let engine = assert_ok!(PaginationEngine::with_source(source, options(10)));
    engine.attach();

    let outcome = engine.load_initial().await;

    assert_eq!(
        outcome,
        OperationOutcome::failed("simulated failure at offset 0")
    );
    let state = engine.state();
    assert!(state.is_empty());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("simulated failure at offset 0"));

    // The failure budget is spent, so a refresh succeeds
    assert!(engine.refresh().await.is_applied());
    assert!(engine.state().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_wins_over_slow_initial_load() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let engine = assert_ok!(PaginationEngine::builder()
        .options(options(5))
        .fetch_data(move |_page, _size| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let (latency, value) = if call == 0 { (1000, 1u32) } else { (10, 2) };
                sleep(Duration::from_millis(latency)).await;
                Ok::<_, Error>(vec![value; 5])
            }
        })
        .build());
    engine.attach();
    let mut updates = engine.subscribe();

    let (initial, refresh) = tokio::join!(engine.load_initial(), async {
        sleep(Duration::from_millis(5)).await;
        engine.refresh().await
    });

    assert!(initial.is_discarded());
    assert!(refresh.is_applied());
    assert_eq!(engine.items(), vec![2; 5]);
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().items, vec![2; 5]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_detached_owner_never_sees_late_result() {
    let source = SyntheticSource::new(30)
        .with_latency(Duration::from_millis(200))
        .into_source(PaginationMode::Page);
    let engine = assert_ok!(PaginationEngine::with_source(
        source,
        EngineOptions {
            auto_load: true,
            ..options(10)
        },
    ));

    let handle = engine.attach().expect("auto load spawned");
    sleep(Duration::from_millis(50)).await;
    engine.detach();

    assert!(assert_ok!(handle.await).is_discarded());
    assert!(engine.state().is_empty());
    assert!(!engine.state().is_busy());
}

#[tokio::test]
async fn test_engine_from_options_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "page_size: 7\nauto_load: false\npagination_mode: cursor\nmax_retries: 0\n",
    )
    .unwrap();

    let options = assert_ok!(load_options(&path));
    assert_eq!(options.retry_policy(), RetryPolicy::new(0, Duration::from_millis(1000)));

    // Declared mode must match the supplied source
    let mismatch = PaginationEngine::with_source(
        SyntheticSource::new(20).into_source(PaginationMode::Page),
        options.clone(),
    );
    assert_err!(mismatch);

    let engine = assert_ok!(PaginationEngine::with_source(
        SyntheticSource::new(20).into_source(PaginationMode::Cursor),
        options,
    ));
    engine.attach();
    let sizes: Vec<usize> = engine.pages().map(|s| s.len()).collect().await;
    assert_eq!(sizes, vec![7, 14, 20]);
}
