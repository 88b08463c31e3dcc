use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod modules;
mod utils;

use config::RunConfig;
use modules::creds::pool::{self, Sweep};
use modules::creds::stats::{self, RunContext};
use modules::transports;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = cli::Cli::parse();

    // Everything below can still fail before a single attempt is sent
    let cfg = RunConfig::from_cli(&cli_args)?;
    init_tracing(cfg.verbose);
    let usernames = utils::load_lines(&cfg.usernames_path)
        .context("Could not load usernames")?;
    let passwords = utils::load_lines(&cfg.passwords_path)
        .context("Could not load passwords")?;
    let attempter = transports::build(&cfg)?;

    let total = (usernames.len() as u64) * (passwords.len() as u64);
    println!(
        "{}",
        format!(
            "[*] {} usernames × {} passwords = {} attempts, {} worker(s)",
            usernames.len(),
            passwords.len(),
            total,
            cfg.workers
        )
        .cyan()
    );
    debug!(mode = ?cfg.mode, target = %cfg.target, markers = ?cfg.markers.as_slice(), "starting sweep");

    let ctx = Arc::new(RunContext::new(total));
    let sweep = Arc::new(Sweep {
        attempter,
        markers: cfg.markers.clone(),
        usernames,
        passwords,
    });

    let reporter = stats::spawn_reporter(Arc::clone(&ctx), cfg.interval);
    let report = pool::run_pool(Arc::clone(&ctx), sweep, cfg.workers).await;
    stats::finish_reporter(reporter, &ctx, cfg.interval).await;
    debug!(attempted = report.attempted, successes = report.successes, "sweep finished");

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,authsweep=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
