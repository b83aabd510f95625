//! crossrun — batch harness for CrossHair analysis (library crate).
//!
//! Re-exports public modules for integration tests and the binary.

pub mod analysis;
pub mod browser;
pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod output;
pub mod progress;
pub mod runner;
pub mod targets;
