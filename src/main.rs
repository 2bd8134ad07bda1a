//! Atelier - front-end asset pipeline with a live-reload dev server.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{Config, init_config};
use core::Mode;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let args = cli.build_args();
    logger::set_verbose(args.verbose);
    let mode = Mode::from_flag(args.production);

    let mut config = Config::load(&cli.config)?;
    apply_cli_overrides(&mut config, cli);
    let config = init_config(config);

    match &cli.command {
        None | Some(Commands::Dev { .. }) => {
            pipeline::build(mode, &config)?;
            serve::serve(config)
        }
        Some(Commands::Build { .. }) => pipeline::build(mode, &config),
        Some(Commands::Run { category, .. }) => {
            pipeline::run_single(category.to_category(), mode, &config).map(|_| ())
        }
    }
}

/// Fold serve overrides from the command line into the loaded config.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(Commands::Dev {
        interface, port, ..
    }) = &cli.command
    {
        if let Some(interface) = interface {
            config.serve.interface = *interface;
        }
        if let Some(port) = port {
            config.serve.port = *port;
        }
    }
}
