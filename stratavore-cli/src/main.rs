use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::Context;

#[derive(Parser)]
#[command(name = "stratavore", about = "Agent fleet, job backlog and time tracking")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the record files (overrides config)
    #[arg(long, global = true, env = "STRATAVORE_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage agents
    Agent(commands::agent::AgentArgs),
    /// Inspect and edit the job backlog
    Jobs(commands::jobs::JobsArgs),
    /// Track time spent on jobs
    Time(commands::time::TimeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::load(cli.data_dir)?;

    match cli.command {
        Commands::Agent(args) => commands::agent::run(args, ctx).await,
        Commands::Jobs(args) => commands::jobs::run(args, ctx).await,
        Commands::Time(args) => commands::time::run(args, ctx).await,
    }
}
