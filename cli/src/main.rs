//! Main entry point for verdiff CLI

use clap::Parser;

mod cli;
mod commands;
mod output;

use cli::Cli;
use commands::execute_command;

fn main() {
    // Load environment variables from .env file if present
    if std::path::Path::new(".env").exists() {
        if let Err(e) = dotenv::dotenv() {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();

    // Initialize logging, RUST_LOG still takes precedence
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = execute_command(cli.command, cli.store.as_deref()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
