//! Located messages from CrossHair's output and their tallies.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Severity CrossHair prints after `file:line:`.
///
/// Ordered so that sorting puts the most serious messages last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Confirmations and notes, mostly seen with `--report_all`.
    Info,
    /// The analysis could not conclude or hit a problem.
    Warning,
    /// A counterexample: some condition was violated.
    Error,
}

/// One `file:line: severity: message` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Path exactly as CrossHair printed it.
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
}

/// Per-severity counts for a single report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings.iter().map(|f| f.severity).collect()
    }

    fn count(&mut self, severity: Severity) {
        self.total += 1;
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.info += 1,
        }
    }
}

impl FromIterator<Severity> for Summary {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut summary = Summary::default();
        iter.into_iter().for_each(|s| summary.count(s));
        summary
    }
}
