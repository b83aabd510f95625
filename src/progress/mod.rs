//! Batch progress reporting.
//!
//! Prints one header per target as the batch advances and a closing
//! summary. Target-level failures are reported here and the batch carries on.

use std::io::{self, Write};

use colored::Colorize;

use crate::models::TargetDescriptor;
use crate::targets::EntryError;

/// Counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Writes batch progress to stderr.
pub struct BatchProgress {
    total: usize,
    enabled: bool,
}

impl BatchProgress {
    pub fn new(total: usize, enabled: bool) -> Self {
        Self { total, enabled }
    }

    /// Announce the target about to run.
    pub fn start(&self, index: usize, target: &TargetDescriptor) {
        self.emit(format!(
            "\n{} Running analysis for: {target}",
            format!("[{index}/{}]", self.total).cyan().bold(),
        ));
    }

    /// Report an element that could not be turned into a target.
    pub fn invalid_entry(&self, index: usize, err: &EntryError) {
        self.emit(format!(
            "\n{} {}",
            format!("[{index}/{}]", self.total).cyan().bold(),
            format!("Target #{index}: {err}").red(),
        ));
    }

    /// Report a target whose analysis could not be completed.
    pub fn failed(&self, index: usize, err: &dyn std::fmt::Display) {
        self.emit(format!(
            "  {} {}",
            "✖".red().bold(),
            format!("Analysis failed for target #{index}: {err}").red(),
        ));
    }

    pub fn finish(&self, summary: &BatchSummary) {
        let line = format!(
            "Batch complete: {} target(s), {} succeeded, {} failed",
            summary.total, summary.succeeded, summary.failed
        );
        let styled = if summary.failed == 0 {
            line.green().to_string()
        } else {
            line.yellow().to_string()
        };
        self.emit(format!("\n{styled}"));
    }

    fn emit(&self, line: String) {
        if !self.enabled {
            return;
        }
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "{line}");
        let _ = handle.flush();
    }
}
