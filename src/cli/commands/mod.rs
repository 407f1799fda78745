//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod migrate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "docman-migrate")]
#[command(about = "Migrate DocMan lawsuit categories and documents into the valor lawsuit tables")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check for the verbose flag before the full parse, so logging can be set up first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Clear the valor lawsuit tables and migrate every DocMan lawsuit into them
    Run {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Read the source but keep all writes in memory
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Run { yes, dry_run } => migrate::cmd_run(&settings, yes, dry_run).await,
        Commands::Config => config_cmd::cmd_config_show(&settings, &config),
    }
}
