// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # pagewise
//!
//! A UI-agnostic engine for loading paginated data from a remote source.
//!
//! ## Features
//!
//! - **Two pagination modes**: page-number or opaque cursor, fixed at construction
//! - **Bounded retry**: exponential, linear or constant backoff around every fetch
//! - **Immutable state**: every transition publishes a new snapshot
//! - **Stale-result discard**: the last operation started wins, whichever fetch
//!   resolves first
//! - **Attach / detach**: results resolving after the owner is gone are dropped
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewise::{PaginationEngine, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let engine = PaginationEngine::builder()
//!         .page_size(20)
//!         .auto_load(false)
//!         .fetch_data(|page, size| async move { api::list(page, size).await })
//!         .build()?;
//!
//!     engine.attach();
//!     engine.load_initial().await;
//!     while engine.can_load_more() {
//!         engine.load_more().await;
//!     }
//!     println!("{} items", engine.state().len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PaginationEngine                           │
//! │  attach()  load_initial()  refresh()  load_more()  reset()      │
//! │  generation tokens · in-flight slot · state: watch<Arc<State>>  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴───────┬──────────────────────────┐
//! │  Pagination   │      Retry           │       State              │
//! ├───────────────┼──────────────────────┼──────────────────────────┤
//! │ DataSource    │ RetryPolicy          │ PaginationState          │
//! │ PageSource    │ Constant / Linear    │ reducer (pure functions) │
//! │ CursorSource  │ Exponential, capped  │                          │
//! └───────────────┴──────────────────────┴──────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Engine options and option files
pub mod config;

/// Data sources and mode resolution
pub mod pagination;

/// Bounded retry with backoff
pub mod retry;

/// Pagination state and its pure transitions
pub mod state;

/// Concurrency-controlled pagination engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_options, EngineOptions};
pub use engine::{
    DiscardReason, EngineStats, OperationOutcome, PaginationEngine, PaginationEngineBuilder,
    SkipReason,
};
pub use pagination::{CursorPage, CursorSource, DataSource, PageSource};
pub use retry::RetryPolicy;
pub use state::{OperationKind, PaginationState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
