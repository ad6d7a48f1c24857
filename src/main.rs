mod cli;
mod commands;
mod config;
mod error;
mod hardware;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{handle_category_command, handle_snapshot_command};
use config::{Config, Settings};
use error::AppError;
use hardware::SystemProbe;
use output::{output_document, print_error};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = dispatch(&cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: &Cli) -> Result<(), AppError> {
    let command = cli.command.unwrap_or(Commands::Snapshot);
    if command == Commands::PrintDefaultConfig {
        return output_document(Config::example_yaml().trim_end());
    }

    let config = Config::load(cli.overrides.config.as_deref())?;
    let settings = Settings::resolve(config, &cli.overrides)?;
    let probe = SystemProbe::new(settings.probe.clone());

    match command.category() {
        Some(category) => handle_category_command(&probe, category, settings.format),
        None => handle_snapshot_command(&probe, &settings),
    }
}

/// Diagnostics go to stderr so stdout carries only the document.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
