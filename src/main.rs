use clap::{Parser, Subcommand};
use git_status_cache::commands::*;
use git_status_cache::core::{
    config::StatusConfig,
    error::{Result, StatusCacheError},
    print_error,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-status-cache")]
#[command(about = "Watched, coalesced git status for file managers")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the status of every changed path, with directory rollups
    Status {
        /// Any path inside the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Include ignored files
        #[arg(long)]
        ignored: bool,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a summary line whenever the repository's status changes
    Watch {
        /// Any path inside the repository
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Add paths to the index
    Stage {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove paths from the index
    Unstage {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli).await {
        match &e {
            StatusCacheError::NotARepository { .. } => print_error("Not in a git repository"),
            StatusCacheError::GitCommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                print_error(stderr.trim())
            }
            _ => print_error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => StatusConfig::from_file(path)?,
        None => StatusConfig::load_or_default()?,
    };

    match cli.command {
        Commands::Status {
            path,
            ignored,
            json,
        } => {
            config.include_ignored |= ignored;
            execute_status(config, &path, json).await
        }
        Commands::Watch { path } => execute_watch(config, &path).await,
        Commands::Stage { paths } => execute_stage(config, paths).await,
        Commands::Unstage { paths } => execute_unstage(config, paths).await,
    }
}
