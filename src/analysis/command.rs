//! Argument construction for the analysis and coverage tools.
//!
//! Kept separate from process handling so the exact command lines can be
//! asserted in tests.

use std::ffi::OsString;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::constants::{COVERAGE_MODULE, TOOL_MODULE};
use crate::models::ResolvedTarget;

/// Arguments for `python -m crosshair check <target> ...`.
pub fn check_args(target: &ResolvedTarget, analysis: &AnalysisConfig, verbose: bool) -> Vec<String> {
    let kinds: Vec<String> = analysis
        .analysis_kind
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut args = vec![
        "-m".to_string(),
        TOOL_MODULE.to_string(),
        "check".to_string(),
        target.qualified_name(),
    ];
    if !kinds.is_empty() {
        args.push(format!("--analysis_kind={}", kinds.join(",")));
    }
    args.push(format!("--per_condition_timeout={}", analysis.per_condition_timeout));
    args.push(format!("--per_path_timeout={}", analysis.per_path_timeout));
    args.push(format!(
        "--max_uninteresting_iterations={}",
        analysis.max_uninteresting_iterations
    ));
    if analysis.report_all {
        args.push("--report_all".to_string());
    }
    if verbose {
        args.push("--report_verbose".to_string());
    }
    args
}

/// Wrap tool arguments in `python -m coverage run`, measuring only the
/// target's source file.
pub fn coverage_run_args(data_file: &Path, source: &Path, tool_args: Vec<String>) -> Vec<String> {
    let mut args = vec![
        "-m".to_string(),
        COVERAGE_MODULE.to_string(),
        "run".to_string(),
        format!("--data-file={}", data_file.display()),
        format!("--include={}", source.display()),
    ];
    args.extend(tool_args);
    args
}

/// Arguments for `python -m coverage html`.
pub fn coverage_html_args(data_file: &Path, output_dir: &Path, title: &str) -> Vec<String> {
    vec![
        "-m".to_string(),
        COVERAGE_MODULE.to_string(),
        "html".to_string(),
        format!("--data-file={}", data_file.display()),
        "-d".to_string(),
        output_dir.display().to_string(),
        format!("--title={title}"),
    ]
}

/// `PYTHONPATH` with `import_root` placed first.
pub fn python_path(import_root: &Path, existing: Option<OsString>) -> OsString {
    let mut entries = vec![import_root.to_path_buf()];
    if let Some(existing) = existing {
        entries.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(entries).unwrap_or_else(|_| import_root.as_os_str().to_os_string())
}
