//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::state::PaginationState;
use crate::types::PaginationMode;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_case::test_case;

/// Page source over a fixed list of numbers
struct NumberSource {
    total: u32,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl NumberSource {
    fn new(total: u32) -> Self {
        Self {
            total,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageSource<u32> for NumberSource {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<u32>> {
        self.calls.lock().unwrap().push((page, page_size));
        let start = page * page_size;
        let end = (start + page_size).min(self.total);
        Ok((start..end).collect())
    }
}

// ============================================================================
// Mode Tests
// ============================================================================

#[test]
fn test_mode_resolution() {
    let source: DataSource<u32> = DataSource::page(NumberSource::new(10));
    assert_eq!(source.mode(), PaginationMode::Page);
    assert!(!source.is_cursor_mode());

    let source: DataSource<u32> =
        DataSource::cursor(cursor_fn(|_cursor, _size| async {
            Ok::<_, Error>(CursorPage::last(Vec::<u32>::new()))
        }));
    assert_eq!(source.mode(), PaginationMode::Cursor);
    assert!(source.is_cursor_mode());
    assert!(source.clone().is_cursor_mode());
}

#[test]
fn test_continuation_display() {
    assert_eq!(Continuation::Page(3).to_string(), "page 3");
    assert_eq!(
        Continuation::Cursor(Some("abc".to_string())).to_string(),
        "cursor abc"
    );
    assert_eq!(Continuation::Cursor(None).to_string(), "end of cursor");
}

// ============================================================================
// Page Mode Tests
// ============================================================================

#[test_case(20, 20, true ; "full page has more")]
#[test_case(5, 20, false ; "short page is last")]
#[test_case(0, 20, false ; "empty page is last")]
#[tokio::test]
async fn test_page_has_more_derivation(total: u32, page_size: u32, expected: bool) {
    let source = DataSource::page(NumberSource::new(total));
    let state = source.load_initial(0, page_size, None).await.unwrap();

    assert_eq!(state.has_more, expected);
    assert_eq!(state.len(), total.min(page_size) as usize);
    assert!(state.is_consistent());
}

#[tokio::test]
async fn test_page_load_initial_uses_initial_page() {
    let inner = Arc::new(NumberSource::new(100));
    let source = DataSource::Page(inner.clone());

    let state = source.load_initial(2, 10, Some(100)).await.unwrap();

    assert_eq!(state.current_page, 2);
    assert_eq!(state.items, (20..30).collect::<Vec<_>>());
    assert_eq!(state.total_items, Some(100));
    assert!(state.cursor.is_none());
    assert_eq!(*inner.calls.lock().unwrap(), vec![(2, 10)]);
}

#[tokio::test]
async fn test_page_load_more_fetches_next_page() {
    let inner = Arc::new(NumberSource::new(25));
    let source = DataSource::Page(inner.clone());
    let state = source.load_initial(0, 10, None).await.unwrap();

    let chunk = source.load_more(&state, 10).await.unwrap();
    assert_eq!(chunk.items, (10..20).collect::<Vec<_>>());
    assert_eq!(chunk.continuation, Continuation::Page(1));
    assert!(chunk.has_more);

    let mut next = state.clone();
    next.current_page = 1;
    let chunk = source.load_more(&next, 10).await.unwrap();
    assert_eq!(chunk.items.len(), 5);
    assert!(!chunk.has_more);
    assert_eq!(*inner.calls.lock().unwrap(), vec![(0, 10), (1, 10), (2, 10)]);
}

// ============================================================================
// Cursor Mode Tests
// ============================================================================

#[tokio::test]
async fn test_cursor_load_initial_takes_cursor_from_response() {
    let source = DataSource::cursor(cursor_fn(|cursor: Option<String>, size| async move {
        assert!(cursor.is_none());
        Ok::<_, Error>(CursorPage::new((0..size).collect::<Vec<u32>>(), "c1"))
    }));

    let state = source.load_initial(7, 10, None).await.unwrap();
    assert_eq!(state.len(), 10);
    assert_eq!(state.cursor.as_deref(), Some("c1"));
    assert!(state.has_more);
    assert_eq!(state.current_page, 0);
}

#[test_case(Some("next"), true, true ; "cursor and more")]
#[test_case(None, true, false ; "more without cursor")]
#[test_case(Some(""), true, false ; "empty cursor")]
#[test_case(Some("next"), false, false ; "cursor but no more")]
#[tokio::test]
async fn test_cursor_has_more_derivation(next: Option<&str>, more: bool, expected: bool) {
    let next = next.map(str::to_string);
    let source = DataSource::cursor(cursor_fn(move |_cursor, _size| {
        let next = next.clone();
        async move {
            Ok::<_, Error>(CursorPage {
                items: vec![1u32],
                next_cursor: next,
                has_more: more,
            })
        }
    }));

    let state = source.load_initial(0, 10, None).await.unwrap();
    assert_eq!(state.has_more, expected);
}

#[tokio::test]
async fn test_cursor_load_more_without_cursor_fails_fast() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let source = DataSource::cursor(cursor_fn(move |_cursor, _size| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, Error>(CursorPage::last(vec![1u32])) }
    }));

    let state: PaginationState<u32> = PaginationState::new(0, None);
    let err = source.load_more(&state, 10).await.unwrap_err();

    assert!(matches!(err, Error::NoCursor));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cursor_load_more_passes_cursor() {
    let source = DataSource::cursor(cursor_fn(|cursor: Option<String>, _size| async move {
        assert_eq!(cursor.as_deref(), Some("c1"));
        Ok::<_, Error>(CursorPage::last(vec![10u32, 11]))
    }));

    let mut state = PaginationState::new(0, None);
    state.cursor = Some("c1".to_string());
    let chunk = source.load_more(&state, 10).await.unwrap();

    assert_eq!(chunk.items, vec![10, 11]);
    assert_eq!(chunk.continuation, Continuation::Cursor(None));
    assert!(!chunk.has_more);
}

// ============================================================================
// Adapter Tests
// ============================================================================

#[tokio::test]
async fn test_page_fn_normalizes_errors() {
    let source = page_fn(|_page, _size| async { Err::<Vec<u32>, _>(anyhow::anyhow!("refused")) });
    let err = source.fetch_page(0, 10).await.unwrap_err();
    assert!(matches!(err, Error::Anyhow(_)));
    assert_eq!(err.to_string(), "refused");

    let source = page_fn(|_page, _size| async { Err::<Vec<u32>, _>("bad gateway") });
    let err = source.fetch_page(0, 10).await.unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));
    assert_eq!(err.to_string(), "bad gateway");
}
