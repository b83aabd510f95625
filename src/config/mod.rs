//! Configuration loading and layering.
//!
//! Handles `.crossrun.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{AnalysisConfig, Config, ConfigError, PathsConfig, ReportConfig, ToolConfig};
