//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs, OutputFormat};
use crate::config::{Config, ConfigBuilder};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::PathBuf;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Path => handle_config_path(output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    let mut builder = ConfigBuilder::new();
    if let Some(url) = args.service_url {
        builder = builder.service_url(url);
    }
    builder.build().save(&path)?;

    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to set the code service URL and defaults.")
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as JSON: {}", e)))?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| Error::config(format!("Failed to serialize as YAML: {}", e)))?,
    };

    if content.ends_with('\n') {
        output.write(&content)
    } else {
        output.writeln(&content)
    }
}

#[derive(Debug, Serialize)]
struct ConfigLocation {
    path: PathBuf,
    exists: bool,
}

/// Handle config path subcommand
fn handle_config_path(output: &mut OutputWriter) -> Result<()> {
    let locations: Vec<ConfigLocation> = Config::default_config_paths()
        .into_iter()
        .map(|path| ConfigLocation {
            exists: path.exists(),
            path,
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&locations);
    }

    output.section("Configuration Sources")?;
    for location in &locations {
        let marker = if location.exists { "✓" } else { "✗" };
        output.writeln(&format!("{} {}", marker, location.path.display()))?;
    }
    Ok(())
}
