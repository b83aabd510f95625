//! Invocation of the external analysis tool.
//!
//! Each target gets one `python -m crosshair check` process, optionally
//! wrapped in `python -m coverage run`. Output is captured in full; the
//! process is killed once the configured wall-clock limit passes.

pub mod command;
pub mod parser;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::config::{AnalysisConfig, Config};
use crate::models::{AnalysisReport, ResolvedTarget};

/// How long to wait for pipes to close after killing a timed-out process.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Errors raised by the harness itself while running the tool.
///
/// Failures reported *by* the tool are not errors here; they end up in
/// the [`AnalysisReport`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("i/o error while running the analysis tool: {0}")]
    Io(#[from] std::io::Error),

    #[error("coverage report failed ({status}): {stderr}")]
    CoverageReport { status: String, stderr: String },
}

/// Runs the analysis tool for resolved targets.
#[derive(Debug, Clone)]
pub struct Analyzer {
    python: String,
    analysis: AnalysisConfig,
    verbose: bool,
}

/// Raw result of one child process.
struct Captured {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    success: bool,
    timed_out: bool,
}

impl Analyzer {
    pub fn new(config: &Config, verbose: bool) -> Self {
        Self {
            python: config.tool.python.clone(),
            analysis: config.analysis.clone(),
            verbose,
        }
    }

    /// Run the tool against `target`.
    ///
    /// When `coverage_data` is given the run is measured and coverage data
    /// is written to that file.
    pub async fn analyze(
        &self,
        target: &ResolvedTarget,
        coverage_data: Option<&Path>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let tool_args = command::check_args(target, &self.analysis, self.verbose);
        let args = match coverage_data {
            Some(data_file) => command::coverage_run_args(data_file, &target.source, tool_args),
            None => tool_args,
        };

        tracing::info!(
            target = %target.qualified_name(),
            coverage = coverage_data.is_some(),
            "running analysis"
        );

        let started = Instant::now();
        let captured = self
            .run(&args, &target.import_root, self.analysis.timeout())
            .await?;
        let elapsed = started.elapsed();

        if captured.timed_out {
            tracing::warn!(
                target = %target.qualified_name(),
                secs = self.analysis.timeout,
                "analysis timed out; process killed"
            );
        }

        let (results, findings) = parser::parse_output(&captured.stdout);
        Ok(AnalysisReport {
            target: target.clone(),
            results,
            findings,
            stderr: captured.stderr,
            exit_code: captured.exit_code,
            timed_out: captured.timed_out,
            elapsed,
        })
    }

    /// Turn a coverage data file into an HTML report under `output_dir`.
    pub async fn render_coverage(
        &self,
        target: &ResolvedTarget,
        data_file: &Path,
        output_dir: &Path,
        title: &str,
    ) -> Result<(), AnalysisError> {
        let args = command::coverage_html_args(data_file, output_dir, title);
        let captured = self
            .run(&args, &target.import_root, self.analysis.timeout())
            .await?;

        if captured.timed_out || !captured.success {
            let status = match captured.exit_code {
                _ if captured.timed_out => "timed out".to_string(),
                Some(code) => format!("exit code {code}"),
                None => "terminated".to_string(),
            };
            let stderr = if captured.stderr.trim().is_empty() {
                captured.stdout.trim().to_string()
            } else {
                captured.stderr.trim().to_string()
            };
            return Err(AnalysisError::CoverageReport { status, stderr });
        }
        Ok(())
    }

    async fn run(
        &self,
        args: &[String],
        import_root: &Path,
        limit: Duration,
    ) -> Result<Captured, AnalysisError> {
        let mut cmd = Command::new(&self.python);
        cmd.args(args)
            .current_dir(import_root)
            .env(
                "PYTHONPATH",
                command::python_path(import_root, std::env::var_os("PYTHONPATH")),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program = %self.python, args = ?args, "spawning");

        let mut child = cmd.spawn().map_err(|e| AnalysisError::Spawn {
            program: self.python.clone(),
            source: e,
        })?;

        let stdout_task = spawn_reader(child.stdout.take());
        let stderr_task = spawn_reader(child.stderr.take());

        let (status, timed_out) = match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => (Some(status?), false),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::debug!(error = %e, "kill after timeout failed");
                }
                (None, true)
            }
        };

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;

        Ok(Captured {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.and_then(|s| s.code()),
            success: status.is_some_and(|s| s.success()),
            timed_out,
        })
    }
}

fn spawn_reader<R>(reader: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            let _ = r.read_to_end(&mut buf).await;
        }
        buf
    })
}

async fn drain(task: JoinHandle<Vec<u8>>) -> Vec<u8> {
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(buf)) => buf,
        _ => Vec::new(),
    }
}

/// Hidden coverage data file kept next to the report directory.
pub fn coverage_data_path(report_dir: &Path) -> PathBuf {
    let name = report_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "coverage".to_string());
    report_dir.with_file_name(format!(".{name}.data"))
}
