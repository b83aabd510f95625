//! Shared types used across all modules.
//!
//! Target descriptors, analysis options, findings and per-run reports
//! live here so other modules import from one place rather than reaching
//! into each other's internals.

pub mod finding;
pub mod report;
pub mod target;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use finding::{Finding, Severity};
pub use report::AnalysisReport;
pub use target::{ResolvedTarget, Selector, TargetDescriptor};

/// The resolved invocation mode for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationMode {
    /// Analyse a single target given on the command line.
    Single(TargetDescriptor),
    /// Analyse every target listed in a batch file.
    Batch(PathBuf),
}

/// Contract styles the external tool can check.
///
/// Display and parse forms match the tool's `--analysis_kind` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum AnalysisKind {
    #[serde(rename = "asserts")]
    #[strum(serialize = "asserts")]
    Asserts,
    #[serde(rename = "icontract")]
    #[strum(serialize = "icontract")]
    Icontract,
    #[serde(rename = "deal")]
    #[strum(serialize = "deal")]
    Deal,
    #[serde(rename = "PEP316")]
    #[strum(serialize = "PEP316")]
    Pep316,
    #[serde(rename = "hypothesis")]
    #[strum(serialize = "hypothesis")]
    Hypothesis,
}
