//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and artifact naming so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "crossrun";

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.crossrun.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".crossrun.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "crossrun";

/// Python module name of the external analysis tool.
pub const TOOL_MODULE: &str = "crosshair";

/// Python module name of the coverage measurement tool.
pub const COVERAGE_MODULE: &str = "coverage";

/// Header line prefix written at the top of every log file.
pub const LOG_HEADER: &str = "CrossHair Analysis Results for";

/// Filename prefix for log files (`log_<name>_<timestamp>.txt`).
pub const LOG_PREFIX: &str = "log";

/// Directory prefix for coverage reports (`coverage_<name>_<timestamp>/`).
pub const COVERAGE_PREFIX: &str = "coverage";

/// Entry point of an HTML coverage report.
pub const COVERAGE_INDEX: &str = "index.html";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PYTHON: &str = "CROSSRUN_PYTHON";
pub const ENV_TIMEOUT: &str = "CROSSRUN_TIMEOUT";
pub const ENV_COVERAGE: &str = "CROSSRUN_COVERAGE";
pub const ENV_LOGS_DIR: &str = "CROSSRUN_LOGS_DIR";
pub const ENV_COVERAGE_DIR: &str = "CROSSRUN_COVERAGE_DIR";
pub const ENV_BATCH_FILE: &str = "CROSSRUN_BATCH_FILE";
