//! Stratus CLI - run site reconciliation steps from the command line.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stratus_provider::{ConfigError, StratusConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Sync site files to object storage and wait for CDN deployments")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./stratus.toml)
    #[arg(short, long, global = true, env = "STRATUS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload changed files from a manifest to a bucket
    Sync {
        /// Target bucket
        #[arg(short, long)]
        bucket: String,

        /// JSON manifest describing the desired files
        #[arg(short, long)]
        manifest: PathBuf,

        /// JSON manifest from the previous sync
        #[arg(short, long)]
        previous: Option<PathBuf>,

        /// Bucket the previous manifest was synced to (defaults to --bucket)
        #[arg(long, requires = "previous")]
        previous_bucket: Option<String>,
    },

    /// Wait for a distribution to finish deploying
    Wait {
        /// Distribution to poll
        #[arg(short, long)]
        distribution_id: String,

        /// Change identifier being waited on
        #[arg(short, long, default_value = "")]
        etag: String,

        /// Skip waiting and report done immediately
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let result: Result<(), anyhow::Error> = match load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Sync {
                bucket,
                manifest,
                previous,
                previous_bucket,
            } => {
                let args = commands::sync::SyncArgs {
                    bucket,
                    manifest,
                    previous,
                    previous_bucket,
                };
                commands::sync::run(&config, args).await.map_err(Into::into)
            }
            Commands::Wait {
                distribution_id,
                etag,
                no_wait,
            } => {
                let args = commands::wait::WaitArgs {
                    distribution_id,
                    etag,
                    wait: !no_wait,
                };
                commands::wait::run(&config, args).await.map_err(Into::into)
            }
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<StratusConfig, ConfigError> {
    match path {
        Some(path) => StratusConfig::from_file(path),
        None => StratusConfig::load(),
    }
}
