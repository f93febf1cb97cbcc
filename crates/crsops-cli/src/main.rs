//! crsops - command-line client for remotely generated coordinate operations
//!
//! Fetches transform code from a code service, builds a coordinate
//! operation from it and transforms points given on the command line or stdin.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::{io, process};
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Logging settings live in the config file, so it is loaded first
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, &config) {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: error::Error) -> ! {
    eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(
        cli.output,
        cli.use_color() && config.output.color,
        cli.quiet,
        config.output.progress,
    );

    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Transform(args) => handlers::handle_transform(args, config, &mut output),
        Commands::Fetch(args) => handlers::handle_fetch(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut io::stdout()),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.merge_with_settings(&config.logging, verbosity);
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["crsops", "config", "path"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["crsops", "-vv", "config", "path"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["crsops", "--quiet", "config", "path"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbosity_level(), 0);
    }
}
