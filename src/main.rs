//! crossrun — batch harness for CrossHair analysis.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};

use cli::args::Cli;
use crossrun::config::Config;
use crossrun::env::Env;
use crossrun::models::InvocationMode;
use crossrun::runner::Runner;
use crossrun::targets;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    let root = std::env::current_dir().context("could not determine working directory")?;

    // Load config with layering, then let CLI flags win
    let mut config =
        Config::load(Some(&root), &Env::real()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    let runner = Runner::new(&config, &root, cli.run_options());
    // Same exit status and format as clap's own usage errors
    let mode = cli
        .validate_mode(&runner.paths().batch_file)
        .unwrap_or_else(|e| Cli::command().error(e.kind(), e).exit());

    match mode {
        InvocationMode::Single(target) => {
            runner
                .run_target(&target)
                .await
                .with_context(|| format!("analysis failed for {}", target.file.display()))?;
        }
        InvocationMode::Batch(path) => {
            let entries = targets::load_batch(&path).context("error loading batch file")?;
            if entries.is_empty() {
                eprintln!("No targets in {}.", path.display());
                return Ok(());
            }

            let summary = runner.run_batch(entries).await;
            if summary.failed > 0 {
                bail!(
                    "{} of {} target(s) could not be analysed",
                    summary.failed,
                    summary.total,
                );
            }
        }
    }

    Ok(())
}
