//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ModeArg, OutputFormat};
use crate::cli::synthetic::SyntheticSource;
use crate::config::{load_options, EngineOptions};
use crate::engine::PaginationEngine;
use crate::error::Result;
use crate::types::PaginationMode;
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Simulate {
                mode,
                total,
                page_size,
                fail_first,
                latency_ms,
            } => {
                self.simulate(*mode, *total, *page_size, *fail_first, *latency_ms)
                    .await
            }
            Commands::Options => self.show_options(),
        }
    }

    /// Options from `--options`, or the defaults
    fn load_options(&self) -> Result<EngineOptions> {
        match &self.cli.options {
            Some(path) => load_options(path),
            None => Ok(EngineOptions::default()),
        }
    }

    /// Drive an engine over a synthetic source until it is exhausted
    async fn simulate(
        &self,
        mode: ModeArg,
        total: u32,
        page_size: Option<u32>,
        fail_first: u32,
        latency_ms: u64,
    ) -> Result<()> {
        let mut options = self.load_options()?;
        if let Some(page_size) = page_size {
            options.page_size = page_size;
        }

        let mode = PaginationMode::from(mode);
        let source = SyntheticSource::new(total)
            .with_latency(Duration::from_millis(latency_ms))
            .with_failures(fail_first)
            .into_source(mode);
        let engine = PaginationEngine::with_source(source, options)?;

        info!("Simulating {mode} pagination over {total} items");
        let start = Instant::now();

        if let Some(handle) = engine.attach() {
            let outcome = handle
                .await
                .map_err(|e| crate::Error::Other(format!("auto load task failed: {e}")))?;
            self.output_message(&json!({
                "type": "STATE",
                "outcome": outcome.to_string(),
                "state": *engine.state(),
            }));
        }

        let mut pages = engine.pages();
        while let Some(state) = pages.next().await {
            self.output_message(&json!({
                "type": "STATE",
                "state": *state,
            }));
        }
        engine.detach();

        let state = engine.state();
        let stats = engine.stats();
        self.output_message(&json!({
            "type": "SUMMARY",
            "mode": mode,
            "items": state.len(),
            "pages": state.page_count(),
            "has_more": state.has_more,
            "error": state.error,
            "stats": {
                "started": stats.started,
                "applied": stats.applied,
                "failed": stats.failed,
                "discarded": stats.discarded,
                "skipped": stats.skipped,
            },
            "duration_ms": start.elapsed().as_millis() as u64,
        }));

        Ok(())
    }

    /// Print the resolved options
    fn show_options(&self) -> Result<()> {
        let options = self.load_options()?;
        self.output_message(&json!({
            "type": "OPTIONS",
            "options": serde_json::to_value(&options)?,
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
