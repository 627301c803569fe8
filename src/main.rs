//! Main entry point for dbdiff CLI

use clap::Parser;
use dbdiff::cli::Cli;
use dbdiff::commands::execute_command;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Failures share stdout with the report
    if let Err(e) = execute_command(&cli) {
        println!("Error: {}", e);
        std::process::exit(1);
    }
}
