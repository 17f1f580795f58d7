// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Standup - quality-gated daily work updates with generated follow-ups.
//!
//! This is the binary entry point for the Standup service.

mod analyze;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use standup_config::StandupConfig;
use standup_core::StandupError;

/// Standup - quality-gated daily work updates with generated follow-ups.
#[derive(Parser, Debug)]
#[command(name = "standup", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of the standard config locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP service and the pending-record reconciler.
    Serve,
    /// Score a work description against the owner's history. No questions are generated.
    Analyze {
        /// Owner whose recent history is used for the repetition check.
        #[arg(long)]
        user: String,
        /// Work description to score.
        text: String,
    },
    /// Validate configuration and print the effective values.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => standup_config::load_and_validate_path(path),
        None => standup_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            standup_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Analyze { user, text }) => analyze::run_analyze(config, &user, &text).await,
        Some(Commands::CheckConfig) => check_config(&config),
        None => {
            println!("standup: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn check_config(config: &StandupConfig) -> Result<(), StandupError> {
    let rendered = render_config(config)?;
    eprintln!("standup: configuration is valid");
    println!("{rendered}");
    Ok(())
}

fn render_config(config: &StandupConfig) -> Result<String, StandupError> {
    toml::to_string_pretty(config)
        .map_err(|e| StandupError::Config(format!("failed to render configuration: {e}")))
}
