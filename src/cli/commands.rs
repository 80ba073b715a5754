//! CLI commands and argument parsing

use crate::types::PaginationMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pagewise CLI
#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Engine options file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub options: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a synthetic source and print each state snapshot
    Simulate {
        /// Pagination mode of the synthetic source
        #[arg(short, long, value_enum, default_value = "page")]
        mode: ModeArg,

        /// Number of items the source holds
        #[arg(short, long, default_value = "100")]
        total: u32,

        /// Items per fetch (overrides the options file)
        #[arg(short, long)]
        page_size: Option<u32>,

        /// Fail this many fetches before succeeding
        #[arg(long, default_value = "0")]
        fail_first: u32,

        /// Simulated latency per fetch, in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,
    },

    /// Print resolved engine options
    Options,
}

/// Pagination mode argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Page-number pagination
    Page,
    /// Opaque cursor pagination
    Cursor,
}

impl From<ModeArg> for PaginationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Page => Self::Page,
            ModeArg::Cursor => Self::Cursor,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
