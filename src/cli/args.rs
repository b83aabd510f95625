//! Clap argument types and invocation-mode validation.

use clap::Parser;
use clap::error::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crossrun::config::Config;
use crossrun::models::{InvocationMode, Selector, TargetDescriptor};
use crossrun::output::ConsoleFormat;
use crossrun::runner::RunOptions;

/// Run CrossHair analysis on a function, class, or module.
#[derive(Parser, Debug)]
#[command(name = "crossrun", version = crossrun::constants::VERSION)]
pub struct Cli {
    /// Path to the Python file containing the function, class, or module to analyse.
    pub file: Option<PathBuf>,

    /// Name of the function to analyse.
    #[arg(long, short = 'f', visible_alias = "func", value_name = "NAME", conflicts_with = "class")]
    pub function: Option<String>,

    /// Name of the class to analyse.
    #[arg(long, short = 'c', value_name = "NAME")]
    pub class: Option<String>,

    /// Run batch analysis from the batch file (default: targets.json).
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// Batch file to read instead of the configured one.
    #[arg(long, value_name = "PATH", requires = "batch")]
    pub batch_file: Option<PathBuf>,

    /// Enable verbose tool output and debug diagnostics.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Print analysis results to the console in addition to logging.
    #[arg(long, default_value_t = false)]
    pub console_dump: bool,

    /// Console dump format.
    #[arg(long, default_value = "terminal")]
    pub format: ConsoleFormat,

    /// Open the generated coverage HTML report in the default browser.
    #[arg(long, default_value_t = false, conflicts_with = "no_coverage")]
    pub open_coverage: bool,

    /// Skip coverage measurement and the HTML report.
    #[arg(long, default_value_t = false)]
    pub no_coverage: bool,

    /// Python interpreter with crosshair and coverage installed.
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Wall-clock limit per analysis, in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

/// Argument combinations clap cannot express on its own.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModeError {
    #[error("when using --batch, do not provide a file path or function/class")]
    BatchWithTarget,

    #[error("a file path is required unless --batch is given")]
    MissingFile,

    #[error("--function and --class are mutually exclusive")]
    ConflictingSelectors,
}

impl ModeError {
    /// The clap error kind to report this as, so it exits like any other
    /// usage error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModeError::MissingFile => ErrorKind::MissingRequiredArgument,
            ModeError::BatchWithTarget | ModeError::ConflictingSelectors => {
                ErrorKind::ArgumentConflict
            }
        }
    }
}

impl Cli {
    /// Decide between single-target and batch mode.
    ///
    /// `default_batch_file` is used when `--batch` is given without
    /// `--batch-file`.
    pub fn validate_mode(&self, default_batch_file: &Path) -> Result<InvocationMode, ModeError> {
        if self.batch {
            if self.file.is_some() || self.function.is_some() || self.class.is_some() {
                return Err(ModeError::BatchWithTarget);
            }
            let path = self
                .batch_file
                .clone()
                .unwrap_or_else(|| default_batch_file.to_path_buf());
            return Ok(InvocationMode::Batch(path));
        }

        let Some(ref file) = self.file else {
            return Err(ModeError::MissingFile);
        };
        let selector = Selector::from_parts(self.function.clone(), self.class.clone())
            .ok_or(ModeError::ConflictingSelectors)?;
        Ok(InvocationMode::Single(TargetDescriptor::new(file.clone(), selector)))
    }

    /// Apply CLI flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref python) = self.python {
            config.tool.python = python.clone();
        }
        if let Some(secs) = self.timeout {
            config.analysis.timeout = secs;
        }
        if self.no_coverage {
            config.tool.coverage = false;
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            console_dump: self.console_dump,
            open_coverage: self.open_coverage,
            format: self.format,
            announce: true,
        }
    }
}
