//! CLI module for Inkwell
//!
//! - `serve`: start the HTTP server (default)
//! - `config`: print the resolved configuration with credentials redacted

use crate::server::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Inkwell workflow orchestration server
#[derive(Parser, Debug)]
#[command(name = "inkwell")]
#[command(about = "AI workflow orchestration server")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file, layered above config/local
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Print the resolved configuration
    Config,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting Inkwell v{}", env!("CARGO_PKG_VERSION"));
            crate::server::run(config).await
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(())
        }
    }
}
