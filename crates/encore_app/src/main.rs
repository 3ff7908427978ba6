//! `encore`: tour countdowns and singer statistics from the dashboard backend.

mod platform;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine_logging::engine_info;

use platform::config::{load_config, Overrides};
use platform::logging::{self, LogDestination};

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Tour countdowns and singer song statistics", long_about = None)]
struct Cli {
    /// RON config file (defaults to ./encore.ron when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://raspberrypi.local:8000
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log at debug level and mirror the log to the terminal
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show upcoming tour dates with countdowns
    Tours {
        /// Keep redrawing the countdowns every second
        #[arg(long)]
        watch: bool,
    },
    /// Search a singer and load the index of their hot songs
    Search {
        /// Singer name
        name: String,

        /// Maximum number of song index requests in flight
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(LogDestination::for_cli(cli.verbose), cli.verbose);

    let limit = match &cli.command {
        Command::Search { limit, .. } => *limit,
        Command::Tours { .. } => None,
    };
    let config = load_config(
        cli.config.as_deref(),
        Overrides {
            base_url: cli.base_url,
            concurrency_limit: limit,
        },
    )
    .context("loading configuration")?;
    engine_info!(
        "backend {} with concurrency limit {}",
        config.api.base_url,
        config.concurrency_limit
    );

    match cli.command {
        Command::Tours { watch } => platform::run_tours(config, watch),
        Command::Search { name, .. } => platform::run_search(config, &name),
    }
}
