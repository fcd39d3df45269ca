// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! linkmap CLI
//!
//! Command-line interface and HTTP gateway for the linkmap mapping store.

use clap::{Parser, Subcommand};

mod commands;
mod gateway;
mod metrics;

/// linkmap - map keyword/src/creative triples to short codes and back
#[derive(Parser)]
#[command(name = "linkmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults apply when the default file is absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the storage data directory
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Listen port (overrides gateway.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve (or create) the code for a triple
    Resolve {
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long)]
        src: Option<String>,

        #[arg(long)]
        creative: Option<String>,

        /// Force a new code and record the old one in history
        #[arg(short, long)]
        refresh: bool,
    },

    /// Look up the triple behind a code
    Lookup {
        code: String,
    },

    /// List every mapping in the table
    List,

    /// Show the refresh history
    History,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let load = || commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref());

    // Dispatch to command handlers
    match &cli.command {
        Commands::Serve { port } => commands::serve::execute(load()?, *port).await,
        Commands::Resolve {
            keyword,
            src,
            creative,
            refresh,
        } => {
            commands::resolve::execute(
                load()?,
                keyword.as_deref(),
                src.as_deref(),
                creative.as_deref(),
                *refresh,
            )
            .await
        }
        Commands::Lookup { code } => commands::lookup::execute(load()?, code).await,
        Commands::List => commands::list::execute(load()?).await,
        Commands::History => commands::history::execute(load()?).await,
        Commands::Validate { file } => commands::validate::execute(file).await,
    }
}
