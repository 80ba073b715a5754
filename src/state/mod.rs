//! State module
//!
//! The paginated list record and the pure transitions applied to it.
//!
//! # Overview
//!
//! The state module provides:
//! - `PaginationState` - Items, chunks, position and in-flight flags
//! - `OperationKind` - Which kind of operation a transition belongs to
//! - `reducer` - Pure functions from `(state, outcome)` to the next state

pub mod reducer;
mod types;

pub use types::{OperationKind, PaginationState};
