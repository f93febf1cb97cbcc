//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crsops_core::{AreaOfInterest, FormatTag, OperationHints};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// crsops - coordinate operations generated by a remote code service
///
/// Asks the service for the code of an operation between two reference
/// systems, runs it in an embedded JavaScript or Python interpreter and
/// prints the transformed coordinates.
#[derive(Parser, Debug)]
#[command(
    name = "crsops",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CRSOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an operation and transform points with it
    Transform(TransformArgs),

    /// Print the operation source generated by the service
    Fetch(FetchArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Reference systems and service options shared by `transform` and `fetch`
#[derive(Args, Debug, Clone)]
pub struct OperationArgs {
    /// Source reference system as WKT, or @path to read it from a file
    #[arg(short, long, value_name = "WKT")]
    pub source: String,

    /// Number of coordinates per source point
    #[arg(long, value_name = "N")]
    pub source_dim: usize,

    /// Target reference system as WKT, or @path to read it from a file
    #[arg(short, long, value_name = "WKT")]
    pub target: String,

    /// Number of coordinates per target point
    #[arg(long, value_name = "N")]
    pub target_dim: usize,

    /// Dialect to request (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<Dialect>,

    /// Code service URL, overriding the configuration
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Request timeout in seconds, overriding the configuration
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Force longitude-first axis order on the source system
    #[arg(long)]
    pub source_lon_first: bool,

    /// Force longitude-first axis order on the target system
    #[arg(long)]
    pub target_lon_first: bool,

    /// Area of interest as west,south,east,north in degrees
    #[arg(long, value_name = "W,S,E,N", value_parser = parse_area, allow_hyphen_values = true)]
    pub aoi: Option<AreaOfInterest>,

    /// Epoch the operation must be valid for (RFC 3339)
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    pub time: Option<DateTime<Utc>>,
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    #[command(flatten)]
    pub operation: OperationArgs,

    /// Point to transform as comma-separated coordinates; repeatable.
    /// Points are read from stdin, one per line, when none is given.
    #[arg(short, long = "point", value_name = "COORDS", allow_hyphen_values = true)]
    pub points: Vec<String>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub operation: OperationArgs,

    /// Write the source to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Print the configuration file locations that are searched
    Path,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Code service URL to store in the new file
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Operation source dialects
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    /// text/javascript, run by QuickJS
    Javascript,
    /// text/x-python, run by CPython
    Python,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl OperationArgs {
    /// Selection hints given on the command line
    pub fn hints(&self) -> OperationHints {
        let mut hints = OperationHints::default()
            .with_longitude_first(self.source_lon_first, self.target_lon_first);
        if let Some(area) = self.aoi {
            hints = hints.with_area_of_interest(area);
        }
        if let Some(time) = self.time {
            hints = hints.with_time(time);
        }
        hints
    }
}

impl From<Dialect> for FormatTag {
    fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Javascript => FormatTag::JavaScript,
            Dialect::Python => FormatTag::Python,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

fn parse_area(value: &str) -> Result<AreaOfInterest, String> {
    let bounds = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid bound: {}", e))?;

    match bounds.as_slice() {
        &[west, south, east, north] => Ok(AreaOfInterest::new(west, south, east, north)),
        _ => Err(format!("expected 4 bounds, got {}", bounds.len())),
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}
