//! Outcome of one tool invocation.

use std::time::Duration;

use super::finding::{Finding, Summary};
use super::target::ResolvedTarget;

/// Everything captured from one run of the analysis tool.
///
/// The tool's exit status is recorded as-is; the harness never treats a
/// non-zero status as its own failure.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub target: ResolvedTarget,
    /// Non-empty stdout lines, in output order.
    pub results: Vec<String>,
    /// The subset of `results` that parsed as located messages.
    pub findings: Vec<Finding>,
    pub stderr: String,
    /// `None` when the process was killed or terminated by a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl AnalysisReport {
    pub fn summary(&self) -> Summary {
        Summary::from_findings(&self.findings)
    }
}
