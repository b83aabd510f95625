//! Plain-text log files, one per analysis run.

use std::path::{Path, PathBuf};

use crate::constants::LOG_HEADER;
use crate::models::AnalysisReport;
use crate::output::ReportRenderer;
use crate::output::archive::{self, ArchiveError};

/// Renders the log file body.
///
/// The first line names the target; each result line follows verbatim,
/// or `No results.` when the tool printed nothing.
pub struct LogRenderer;

impl ReportRenderer for LogRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        let mut out = format!("{LOG_HEADER} {}:\n", report.target.display_name());

        if report.results.is_empty() {
            out.push_str("No results.\n");
        } else {
            for line in &report.results {
                out.push_str(line);
                out.push('\n');
            }
        }

        let stderr = report.stderr.trim_end();
        if !stderr.is_empty() {
            out.push_str("\n[stderr]\n");
            out.push_str(stderr);
            out.push('\n');
        }

        if report.timed_out {
            out.push_str(&format!(
                "\nAnalysis timed out after {}s; results are partial.\n",
                report.elapsed.as_secs()
            ));
        }

        out
    }
}

/// Write the log for `report` under `logs_dir` and return its path.
pub fn write_log(
    report: &AnalysisReport,
    logs_dir: &Path,
    timestamp: &str,
) -> Result<PathBuf, ArchiveError> {
    let path = archive::log_path(logs_dir, &report.target.display_name(), timestamp)?;
    std::fs::write(&path, LogRenderer.render(report)).map_err(|e| ArchiveError::Write {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), lines = report.results.len(), "log written");
    Ok(path)
}
