//! Folio - A Markdown blog server with live updates.

mod actor;
mod article;
mod cli;
mod config;
mod core;
mod delivery;
mod embed;
mod logger;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::FolioConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = FolioConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::List { pretty } => cli::list::list(&config, *pretty, &mut std::io::stdout().lock()),
        Commands::Show { slug, json } => {
            cli::list::show(&config, slug, *json, &mut std::io::stdout().lock())
        }
    }
}
