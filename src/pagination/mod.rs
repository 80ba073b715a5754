//! Pagination module
//!
//! Supports: page-number sources and cursor sources
//!
//! # Overview
//!
//! The pagination module resolves a data source into one of two fixed modes
//! and offers a uniform pair of operations on top of it: fetch the first chunk
//! (`load_initial`) and fetch the chunk after a given state (`load_more`).

mod source;
mod types;

pub use source::DataSource;
pub use types::{
    cursor_fn, page_fn, Continuation, CursorFn, CursorPage, CursorSource, LoadMoreChunk, PageFn,
    PageSource,
};

#[cfg(test)]
mod tests;
