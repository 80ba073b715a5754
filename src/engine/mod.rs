//! Pagination engine module
//!
//! The single owner of a paginated list's state.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationEngine` - Serializes fetches and applies their results
//! - `PaginationEngineBuilder` - Validated construction from options and a source
//! - `OperationOutcome` - What happened to each requested operation
//!
//! Every operation captures a generation number when it starts. Its result is
//! applied only if that generation is still the live one and the engine is
//! still attached, so "last operation started wins" regardless of which fetch
//! resolves first.

mod builder;
mod types;

pub use builder::PaginationEngineBuilder;
pub use types::{DiscardReason, EngineStats, OperationOutcome, SkipReason};

use crate::config::EngineOptions;
use crate::error::Error;
use crate::pagination::DataSource;
use crate::retry::RetryPolicy;
use crate::state::reducer;
use crate::state::{OperationKind, PaginationState};
use crate::types::PaginationMode;
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Callback invoked when a current operation fails for good
pub type ErrorCallback = Arc<dyn Fn(&Error, OperationKind) + Send + Sync>;

/// Paginated list engine
///
/// Cloning is cheap and every clone drives the same list.
pub struct PaginationEngine<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    source: DataSource<T>,
    options: EngineOptions,
    retry: RetryPolicy,
    control: Mutex<Control>,
    state: watch::Sender<Arc<PaginationState<T>>>,
    on_error: Option<ErrorCallback>,
}

/// Ownership bookkeeping, guarded by a single mutex
#[derive(Debug, Default)]
struct Control {
    generation: u64,
    in_flight: Option<Ticket>,
    attached: bool,
    /// An automatic initial load has actually started
    auto_loaded: bool,
    /// An automatic initial load was spawned but has not decided yet
    auto_load_pending: bool,
    stats: EngineStats,
}

/// Identifies one started operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    kind: OperationKind,
}

impl<T> Clone for PaginationEngine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PaginationEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a builder
    pub fn builder() -> PaginationEngineBuilder<T> {
        PaginationEngineBuilder::new()
    }

    /// Create an engine over an already resolved source
    pub fn with_source(source: DataSource<T>, options: EngineOptions) -> crate::Result<Self> {
        Self::builder().options(options).source(source).build()
    }

    pub(crate) fn from_parts(
        source: DataSource<T>,
        options: EngineOptions,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        let initial = reducer::initial_state(
            options.initial_page,
            options.total_items,
            options.auto_load,
        );
        let (state, _) = watch::channel(Arc::new(initial));

        debug!(
            "Created {} engine (page size {}, auto load {})",
            source.mode(),
            options.page_size,
            options.auto_load
        );

        Self {
            inner: Arc::new(Inner {
                retry: options.retry_policy(),
                source,
                options,
                control: Mutex::new(Control::default()),
                state,
                on_error,
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Mark the owner as live
    ///
    /// With `auto_load`, attach spawns the initial load and returns its
    /// handle, until one automatic load has actually started. A load skipped
    /// because the owner detached first is spawned again by the next attach.
    /// Must be called from within a Tokio runtime when `auto_load` is set.
    pub fn attach(&self) -> Option<JoinHandle<OperationOutcome>> {
        let should_load = {
            let mut control = self.inner.lock_control();
            control.attached = true;
            let load = self.inner.options.auto_load
                && !control.auto_loaded
                && !control.auto_load_pending;
            if load {
                control.auto_load_pending = true;
            }
            load
        };

        debug!("Engine attached");
        if !should_load {
            return None;
        }

        let engine = self.clone();
        Some(tokio::spawn(async move {
            engine.run_initial(OperationKind::Initial, true).await
        }))
    }

    /// Tear the owner down
    ///
    /// Every result resolving after this call is discarded, and no loading
    /// flag survives it, including the one set for a pending automatic load.
    pub fn detach(&self) {
        let inner = &*self.inner;
        let mut control = inner.lock_control();
        control.attached = false;
        control.generation += 1;
        if let Some(ticket) = control.in_flight.take() {
            debug!("Detached while {} was in flight", ticket.kind);
        } else {
            debug!("Engine detached");
        }
        if inner.snapshot().is_busy() {
            inner.replace_state(reducer::reduce_abandoned);
        }
    }

    /// Check if the owner is live
    pub fn is_attached(&self) -> bool {
        self.inner.lock_control().attached
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Fetch the first page or cursor chunk, replacing the list
    ///
    /// Skipped while another initial load is running; supersedes a running
    /// refresh or load-more.
    pub async fn load_initial(&self) -> OperationOutcome {
        self.run_initial(OperationKind::Initial, false).await
    }

    /// Re-run the first fetch while the current items stay visible
    ///
    /// Skipped while another refresh is running; supersedes a running initial
    /// load or load-more.
    pub async fn refresh(&self) -> OperationOutcome {
        self.run_initial(OperationKind::Refresh, false).await
    }

    /// Append the next chunk
    ///
    /// Silently skipped while anything is in flight, when the source is
    /// exhausted, or in cursor mode without a cursor.
    pub async fn load_more(&self) -> OperationOutcome {
        let inner = &*self.inner;

        let started = {
            let mut control = inner.lock_control();
            let current = inner.snapshot();
            match self.load_more_gate(&control, &current) {
                Some(reason) => Err(reason),
                None => Ok((inner.start(&mut control, OperationKind::LoadMore), current)),
            }
        };

        let (ticket, current) = match started {
            Ok(started) => started,
            Err(reason) => return inner.skip(OperationKind::LoadMore, reason),
        };

        let guard = InFlightGuard { inner, ticket };
        let source = &inner.source;
        let page_size = inner.options.page_size;
        let snapshot: &PaginationState<T> = &current;

        let result = inner
            .retry
            .execute_while(
                move || source.load_more(snapshot, page_size),
                || inner.is_current(ticket),
            )
            .await;

        match result {
            Ok(chunk) => {
                let appended = chunk.items.len();
                let outcome = guard.settle(
                    move |state| {
                        reducer::reduce_load_more_success(
                            state,
                            chunk.items,
                            chunk.continuation,
                            chunk.has_more,
                        )
                    },
                    None,
                );
                if outcome.is_applied() {
                    debug!("Appended {appended} items");
                }
                outcome
            }
            Err(err) => {
                let message = err.to_string();
                let failure = message.clone();
                let outcome = guard.settle(
                    move |state| reducer::reduce_load_more_failure(state, failure),
                    Some(message),
                );
                inner.report(&err, ticket.kind, &outcome);
                outcome
            }
        }
    }

    /// Stream of state snapshots, one per applied chunk
    ///
    /// Runs the initial load if nothing is loaded yet, then load-more until the
    /// source is exhausted. A failed operation yields its state and ends the
    /// stream; a skipped or discarded one ends it silently.
    pub fn pages(&self) -> BoxStream<'static, Arc<PaginationState<T>>> {
        stream::unfold(Some(self.clone()), |engine| async move {
            let engine = engine?;
            let outcome = if engine.state().page_count() == 0 {
                engine.load_initial().await
            } else {
                engine.load_more().await
            };

            match outcome {
                OperationOutcome::Applied => {
                    let state = engine.state();
                    let next = state.has_more.then_some(engine);
                    Some((state, next))
                }
                OperationOutcome::Failed { .. } => Some((engine.state(), None)),
                OperationOutcome::Skipped(_) | OperationOutcome::Discarded(_) => None,
            }
        })
        .boxed()
    }

    /// Drop everything and return to the canonical empty state
    ///
    /// Any in-flight operation loses the right to apply its result.
    pub fn reset(&self) {
        let inner = &*self.inner;
        let mut control = inner.lock_control();
        control.generation += 1;
        if let Some(ticket) = control.in_flight.take() {
            debug!("Reset superseded in-flight {}", ticket.kind);
        }
        inner.replace_state(|_| {
            reducer::reduce_reset(inner.options.initial_page, inner.options.total_items)
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current state snapshot
    pub fn state(&self) -> Arc<PaginationState<T>> {
        self.inner.snapshot()
    }

    /// Currently loaded items
    pub fn items(&self) -> Vec<T> {
        self.inner.snapshot().items.clone()
    }

    /// `has_more && !is_loading_more && !is_loading`
    pub fn can_load_more(&self) -> bool {
        self.inner.snapshot().can_load_more()
    }

    /// Receive every state replacement
    pub fn subscribe(&self) -> watch::Receiver<Arc<PaginationState<T>>> {
        self.inner.state.subscribe()
    }

    /// Pagination mode fixed at construction
    pub fn mode(&self) -> PaginationMode {
        self.inner.source.mode()
    }

    /// Options the engine was built with
    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Operation counters
    pub fn stats(&self) -> EngineStats {
        self.inner.lock_control().stats
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn run_initial(&self, kind: OperationKind, auto: bool) -> OperationOutcome {
        let inner = &*self.inner;

        let started = {
            let mut control = inner.lock_control();
            if auto {
                control.auto_load_pending = false;
            }
            if !control.attached {
                Err(SkipReason::Detached)
            } else if control.in_flight.is_some_and(|t| t.kind == kind) {
                Err(SkipReason::InFlight)
            } else {
                if let Some(previous) = control.in_flight {
                    debug!("{kind} supersedes in-flight {}", previous.kind);
                }
                if kind == OperationKind::Initial {
                    control.auto_loaded = true;
                }
                Ok(inner.start(&mut control, kind))
            }
        };

        let ticket = match started {
            Ok(ticket) => ticket,
            Err(reason) => return inner.skip(kind, reason),
        };

        let guard = InFlightGuard { inner, ticket };
        let source = &inner.source;
        let options = &inner.options;

        let result = inner
            .retry
            .execute_while(
                move || {
                    source.load_initial(options.initial_page, options.page_size, options.total_items)
                },
                || inner.is_current(ticket),
            )
            .await;

        match result {
            Ok(fresh) => {
                let loaded = fresh.len();
                let outcome =
                    guard.settle(move |_| reducer::reduce_initial_success(fresh, kind), None);
                if outcome.is_applied() {
                    debug!("{kind} loaded {loaded} items");
                }
                outcome
            }
            Err(err) => {
                let message = err.to_string();
                let failure = message.clone();
                let outcome = guard.settle(
                    move |state| reducer::reduce_initial_failure(state, failure, kind),
                    Some(message),
                );
                inner.report(&err, kind, &outcome);
                outcome
            }
        }
    }

    fn load_more_gate(
        &self,
        control: &Control,
        current: &PaginationState<T>,
    ) -> Option<SkipReason> {
        if !control.attached {
            Some(SkipReason::Detached)
        } else if control.in_flight.is_some() || current.is_loading || current.is_loading_more {
            Some(SkipReason::InFlight)
        } else if !current.has_more {
            Some(SkipReason::NoMoreData)
        } else if current.page_count() == 0 {
            Some(SkipReason::NotLoaded)
        } else if self.inner.source.is_cursor_mode() && current.cursor.is_none() {
            Some(SkipReason::NoCursor)
        } else {
            None
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Arc<PaginationState<T>> {
        Arc::clone(&self.state.borrow())
    }

    /// Publish a new record. Callers hold the control lock.
    fn replace_state(&self, f: impl FnOnce(&PaginationState<T>) -> PaginationState<T>) {
        let next = {
            let current = self.state.borrow();
            f(&current)
        };
        debug_assert!(next.is_consistent());
        self.state.send_replace(Arc::new(next));
    }

    /// Take ownership of the state for a new operation
    fn start(&self, control: &mut Control, kind: OperationKind) -> Ticket {
        control.generation += 1;
        let ticket = Ticket {
            generation: control.generation,
            kind,
        };
        control.in_flight = Some(ticket);
        control.stats.started += 1;
        self.replace_state(|state| reducer::begin(state, kind));
        debug!("Started {kind} (generation {})", ticket.generation);
        ticket
    }

    fn skip(&self, kind: OperationKind, reason: SkipReason) -> OperationOutcome {
        debug!("Skipped {kind}: {reason}");
        let outcome = OperationOutcome::Skipped(reason);
        self.lock_control().stats.record(&outcome);
        outcome
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        let control = self.lock_control();
        control.attached && control.generation == ticket.generation
    }

    fn report(&self, err: &Error, kind: OperationKind, outcome: &OperationOutcome) {
        if !outcome.is_failed() {
            return;
        }
        warn!("{kind} failed: {err}");
        if let Some(callback) = &self.on_error {
            callback(err, kind);
        }
    }
}

/// Owns the in-flight slot of one operation
///
/// Dropping it without settling (the operation's future was cancelled)
/// releases the slot and clears the loading flags, if it is still current.
struct InFlightGuard<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: &'a Inner<T>,
    ticket: Ticket,
}

impl<T> InFlightGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Apply a result if this operation still owns the state
    fn settle(
        self,
        apply: impl FnOnce(&PaginationState<T>) -> PaginationState<T>,
        failed: Option<String>,
    ) -> OperationOutcome {
        let mut control = self.inner.lock_control();
        let outcome = if !control.attached {
            OperationOutcome::Discarded(DiscardReason::Detached)
        } else if control.generation != self.ticket.generation {
            OperationOutcome::Discarded(DiscardReason::Superseded)
        } else {
            control.in_flight = None;
            self.inner.replace_state(apply);
            match failed {
                Some(message) => OperationOutcome::failed(message),
                None => OperationOutcome::Applied,
            }
        };

        if let OperationOutcome::Discarded(reason) = &outcome {
            debug!(
                "Discarded {} result (generation {}): {reason}",
                self.ticket.kind, self.ticket.generation
            );
        }
        control.stats.record(&outcome);
        outcome
    }
}

impl<T> Drop for InFlightGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let mut control = self.inner.lock_control();
        if control.in_flight == Some(self.ticket) {
            debug!("{} abandoned before completion", self.ticket.kind);
            control.in_flight = None;
            control.stats.discarded += 1;
            self.inner.replace_state(reducer::reduce_abandoned);
        }
    }
}

impl<T> fmt::Debug for PaginationEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("source", &self.inner.source)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
