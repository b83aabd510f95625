//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.crossrun.toml` in the working directory
//! 4. `~/.config/crossrun/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::AnalysisKind;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub tool: ToolConfig,
    pub paths: PathsConfig,
    pub report: ReportConfig,
}

/// Options forwarded to the analysis tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub analysis_kind: Vec<AnalysisKind>,
    /// Seconds the tool may spend on each condition.
    pub per_condition_timeout: f64,
    /// Seconds the tool may spend on each execution path.
    pub per_path_timeout: f64,
    /// Wall-clock seconds for a whole invocation, enforced by the harness.
    pub timeout: u64,
    pub max_uninteresting_iterations: u64,
    /// Report confirmations as well as counterexamples.
    pub report_all: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_kind: vec![AnalysisKind::Asserts, AnalysisKind::Icontract],
            per_condition_timeout: 60.0,
            per_path_timeout: 100.0,
            timeout: 120,
            max_uninteresting_iterations: 10_000,
            report_all: true,
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// How the tool is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Python interpreter that has the tool (and coverage) installed.
    pub python: String,
    /// Measure coverage and produce an HTML report per run.
    pub coverage: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            coverage: true,
        }
    }
}

/// Where inputs and artifacts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub logs_dir: PathBuf,
    pub coverage_dir: PathBuf,
    pub batch_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            coverage_dir: PathBuf::from("coverage"),
            batch_file: PathBuf::from("targets.json"),
        }
    }
}

impl PathsConfig {
    /// Resolve relative paths against `root`.
    pub fn resolved(&self, root: &Path) -> Self {
        let abs = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };
        Self {
            logs_dir: abs(&self.logs_dir),
            coverage_dir: abs(&self.coverage_dir),
            batch_file: abs(&self.batch_file),
        }
    }
}

/// Coverage report presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub coverage_title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            coverage_title: "CrossHair Coverage".to_string(),
        }
    }
}

/// One config file as written. Only keys present in the file are `Some`,
/// so a layer can set a value back to its built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    analysis: AnalysisLayer,
    tool: ToolLayer,
    paths: PathsLayer,
    report: ReportLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalysisLayer {
    analysis_kind: Option<Vec<AnalysisKind>>,
    per_condition_timeout: Option<f64>,
    per_path_timeout: Option<f64>,
    timeout: Option<u64>,
    max_uninteresting_iterations: Option<u64>,
    report_all: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolLayer {
    python: Option<String>,
    coverage: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PathsLayer {
    logs_dir: Option<PathBuf>,
    coverage_dir: Option<PathBuf>,
    batch_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportLayer {
    coverage_title: Option<String>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, project-local config, then applies
    /// environment variable overrides.
    pub fn load(project_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let files: Vec<PathBuf> = [
            Self::global_config_path(),
            project_root.map(|root| root.join(constants::CONFIG_FILENAME)),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self::layered(&files, env)
    }

    /// Apply each existing file in `files` in order, later files winning,
    /// then the environment.
    fn layered(files: &[PathBuf], env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        for path in files.iter().filter(|p| p.exists()) {
            tracing::debug!(path = %path.display(), "loading config layer");
            config.merge(Self::load_file(path)?);
        }
        config.apply_env_vars(env);
        Ok(config)
    }

    /// Read one config file as a layer.
    fn load_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Overwrite every field the layer sets.
    fn merge(&mut self, layer: ConfigLayer) {
        let analysis = &mut self.analysis;
        set(&mut analysis.analysis_kind, layer.analysis.analysis_kind);
        set(&mut analysis.per_condition_timeout, layer.analysis.per_condition_timeout);
        set(&mut analysis.per_path_timeout, layer.analysis.per_path_timeout);
        set(&mut analysis.timeout, layer.analysis.timeout);
        set(
            &mut analysis.max_uninteresting_iterations,
            layer.analysis.max_uninteresting_iterations,
        );
        set(&mut analysis.report_all, layer.analysis.report_all);

        set(&mut self.tool.python, layer.tool.python);
        set(&mut self.tool.coverage, layer.tool.coverage);

        set(&mut self.paths.logs_dir, layer.paths.logs_dir);
        set(&mut self.paths.coverage_dir, layer.paths.coverage_dir);
        set(&mut self.paths.batch_file, layer.paths.batch_file);

        set(&mut self.report.coverage_title, layer.report.coverage_title);
    }

    /// Apply `CROSSRUN_*` overrides. Values that fail to parse are reported
    /// and skipped.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(python) = env.get(constants::ENV_PYTHON) {
            self.tool.python = python;
        }
        match env.parsed::<u64>(constants::ENV_TIMEOUT) {
            Some(Ok(secs)) if secs > 0 => self.analysis.timeout = secs,
            Some(Ok(_)) => invalid_env(constants::ENV_TIMEOUT, "0"),
            Some(Err(raw)) => invalid_env(constants::ENV_TIMEOUT, &raw),
            None => {}
        }
        match env.flag(constants::ENV_COVERAGE) {
            Some(Ok(enabled)) => self.tool.coverage = enabled,
            Some(Err(raw)) => invalid_env(constants::ENV_COVERAGE, &raw),
            None => {}
        }
        if let Some(dir) = env.path(constants::ENV_LOGS_DIR) {
            self.paths.logs_dir = dir;
        }
        if let Some(dir) = env.path(constants::ENV_COVERAGE_DIR) {
            self.paths.coverage_dir = dir;
        }
        if let Some(file) = env.path(constants::ENV_BATCH_FILE) {
            self.paths.batch_file = file;
        }
    }
}

fn invalid_env(name: &str, raw: &str) {
    eprintln!("Warning: ignoring invalid {name} value: {raw}");
}
