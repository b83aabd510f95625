//! CLI argument parsing and diagnostics setup.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use crossrun::constants::APP_NAME;
use tracing_subscriber::EnvFilter;

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        format!("{APP_NAME}=debug")
    } else {
        "warn".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
