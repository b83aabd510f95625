//! Per-target and batch execution.
//!
//! A target run resolves the descriptor, invokes the tool (under coverage
//! when enabled), writes the log, renders the coverage report, then
//! optionally dumps findings and opens the report. Batches repeat this
//! sequentially in file order; one target's failure never stops the rest.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analysis::{self, AnalysisError, Analyzer};
use crate::browser;
use crate::config::{Config, PathsConfig};
use crate::constants::COVERAGE_INDEX;
use crate::models::{AnalysisReport, TargetDescriptor};
use crate::output::ConsoleFormat;
use crate::output::archive::{self, ArchiveError};
use crate::output::log;
use crate::progress::{BatchProgress, BatchSummary};
use crate::targets::{BatchEntry, ResolveError, resolve};

/// Errors that abort a single target.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// `python -m coverage run` failed before producing any data, so the
    /// tool most likely never ran.
    #[error("coverage run failed ({status}) without recording data; is coverage installed for this interpreter? {stderr}")]
    CoverageRun { status: String, stderr: String },
}

/// Display switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub verbose: bool,
    pub console_dump: bool,
    pub open_coverage: bool,
    pub format: ConsoleFormat,
    /// Print artifact locations and batch progress.
    pub announce: bool,
}

/// Artifacts produced for one target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub report: AnalysisReport,
    pub log_path: PathBuf,
    /// `None` when coverage is disabled or was skipped.
    pub coverage_dir: Option<PathBuf>,
}

impl TargetOutcome {
    /// Entry point of the HTML coverage report, if one was produced.
    pub fn coverage_index(&self) -> Option<PathBuf> {
        self.coverage_dir.as_ref().map(|d| d.join(COVERAGE_INDEX))
    }
}

/// Drives analysis runs with a fixed configuration.
pub struct Runner {
    analyzer: Analyzer,
    paths: PathsConfig,
    coverage: bool,
    coverage_title: String,
    options: RunOptions,
}

impl Runner {
    /// `root` anchors relative artifact paths from the config.
    pub fn new(config: &Config, root: &Path, options: RunOptions) -> Self {
        Self {
            analyzer: Analyzer::new(config, options.verbose),
            paths: config.paths.resolved(root),
            coverage: config.tool.coverage,
            coverage_title: config.report.coverage_title.clone(),
            options,
        }
    }

    /// Resolved artifact locations.
    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    /// Analyse one target and archive its artifacts.
    pub async fn run_target(&self, descriptor: &TargetDescriptor) -> Result<TargetOutcome, RunError> {
        let target = resolve(descriptor)?;
        let name = target.display_name();
        let timestamp = archive::timestamp();

        let coverage_dir = if self.coverage {
            Some(archive::coverage_dir(&self.paths.coverage_dir, &name, &timestamp)?)
        } else {
            None
        };
        let data_file = coverage_dir.as_deref().map(analysis::coverage_data_path);

        let report = self.analyzer.analyze(&target, data_file.as_deref()).await?;
        if let Some(data) = data_file.as_deref() {
            check_coverage_run(&report, data)?;
        }

        let log_path = log::write_log(&report, &self.paths.logs_dir, &timestamp)?;
        self.announce(format!("Analysis results logged to: {}", log_path.display()));

        let coverage_dir = match (coverage_dir, data_file) {
            (Some(dir), Some(data)) => {
                let produced = self.produce_coverage(&report, &data, &dir).await;
                remove_data_file(&data);
                produced?
            }
            _ => None,
        };

        if let Some(dump) = self.console_dump(&report) {
            print!("{dump}");
        }

        let outcome = TargetOutcome {
            report,
            log_path,
            coverage_dir,
        };

        if let Err(warning) = self.open_report(&outcome) {
            eprintln!("Warning: {warning}");
        }

        Ok(outcome)
    }

    /// Run every entry in order, isolating failures.
    pub async fn run_batch(&self, entries: Vec<BatchEntry>) -> BatchSummary {
        let progress = BatchProgress::new(entries.len(), self.options.announce);
        let mut summary = BatchSummary {
            total: entries.len(),
            ..BatchSummary::default()
        };

        for entry in entries {
            let descriptor = match entry.target {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    tracing::warn!(index = entry.index, error = %err, "invalid batch entry");
                    progress.invalid_entry(entry.index, &err);
                    summary.failed += 1;
                    continue;
                }
            };

            progress.start(entry.index, &descriptor);
            match self.run_target(&descriptor).await {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    tracing::warn!(index = entry.index, error = %err, "target failed");
                    progress.failed(entry.index, &err);
                    summary.failed += 1;
                }
            }
        }

        progress.finish(&summary);
        summary
    }

    async fn produce_coverage(
        &self,
        report: &AnalysisReport,
        data_file: &Path,
        dir: &Path,
    ) -> Result<Option<PathBuf>, RunError> {
        if report.timed_out {
            eprintln!("Warning: coverage skipped for {}: analysis timed out", report.target.display_name());
            return Ok(None);
        }
        if !data_file.exists() {
            eprintln!(
                "Warning: coverage skipped for {}: no coverage data was recorded",
                report.target.display_name()
            );
            return Ok(None);
        }

        self.analyzer
            .render_coverage(&report.target, data_file, dir, &self.coverage_title)
            .await?;
        self.announce(format!(
            "Coverage report written to: {}. Open {COVERAGE_INDEX} in a browser to see the results.",
            dir.display()
        ));
        Ok(Some(dir.to_path_buf()))
    }

    /// Rendered findings when `--console-dump` is on.
    fn console_dump(&self, report: &AnalysisReport) -> Option<String> {
        self.options
            .console_dump
            .then(|| self.options.format.render(report))
    }

    /// Open the coverage report when asked to. `Ok(None)` when not requested.
    fn open_report(&self, outcome: &TargetOutcome) -> Result<Option<PathBuf>, String> {
        if !self.options.open_coverage {
            return Ok(None);
        }
        let index = outcome
            .coverage_index()
            .ok_or_else(|| "no coverage report to open".to_string())?;
        browser::open(&index).map_err(|e| e.to_string())?;
        Ok(Some(index))
    }

    fn announce(&self, line: String) {
        if self.options.announce {
            println!("{line}");
        }
    }
}

/// A non-zero exit with no data file means the coverage wrapper itself
/// failed, not the analysis.
fn check_coverage_run(report: &AnalysisReport, data_file: &Path) -> Result<(), RunError> {
    if report.timed_out || data_file.exists() || report.exit_code == Some(0) {
        return Ok(());
    }
    let status = match report.exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated".to_string(),
    };
    Err(RunError::CoverageRun {
        status,
        stderr: report.stderr.trim().to_string(),
    })
}

fn remove_data_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "could not remove coverage data");
        }
    }
}
