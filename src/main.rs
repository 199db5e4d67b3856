//! zapp - a local development server with on-the-fly rendering and live reload.

mod actor;
mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod logger;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::ServeConfig;

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
    logger::set_verbose(cli.verbose);

    let config = Arc::new(ServeConfig::load(&cli)?);
    debug!("config"; "{:?}", config.serve);

    cli::serve::bind_server(config)?.run()
}
