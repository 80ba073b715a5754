//! CLI module
//!
//! Command-line interface for exercising the engine.
//!
//! # Commands
//!
//! - `simulate` - Page through a synthetic source and print every snapshot
//! - `options` - Print resolved engine options

mod commands;
mod runner;
mod synthetic;

pub use commands::{Cli, Commands, ModeArg, OutputFormat};
pub use runner::Runner;
pub use synthetic::SyntheticSource;
