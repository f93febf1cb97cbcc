//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use crsops_core::{FormatTag, HttpClientConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the code service URL
pub const ENV_SERVICE_URL: &str = "CRSOPS_SERVICE_URL";
/// Environment variable overriding the default dialect
pub const ENV_FORMAT: &str = "CRSOPS_FORMAT";
/// Environment variable overriding the request timeout, in seconds
pub const ENV_TIMEOUT: &str = "CRSOPS_TIMEOUT";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the transform code service
    pub service_url: Option<String>,

    /// Dialect requested when `--format` is not given
    pub default_format: FormatTag,

    /// Request timeout; unset waits for the service indefinitely
    pub timeout_secs: Option<u64>,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Whether to validate TLS certificates
    pub validate_tls: bool,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration stored in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,

    /// Per-module levels, e.g. `crsops_core: debug`
    pub modules: Option<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: None,
            default_format: FormatTag::default(),
            timeout_secs: None,
            user_agent: None,
            validate_tls: true,
            output: OutputConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        // Logging is not initialized yet
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load from a specific file or the default locations, then apply the environment
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = file {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Self::from_file(path)?
        } else {
            Self::load()?
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Configuration file paths checked in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".crsops.yaml"), PathBuf::from(".crsops.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let crsops_dir = config_dir.join("crsops");
            paths.push(crsops_dir.join("config.yaml"));
            paths.push(crsops_dir.join("config.json"));
        }

        paths
    }

    /// Default location for `config init`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crsops").join("config.yaml"))
    }

    /// Apply `CRSOPS_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service_url = Some(url);
        }

        if let Some(format) = lookup(ENV_FORMAT) {
            self.default_format = parse_format(&format).ok_or_else(|| {
                Error::config(format!("{} has unknown format '{}'", ENV_FORMAT, format))
            })?;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            let seconds = timeout.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT, timeout))
            })?;
            self.timeout_secs = Some(seconds);
        }

        Ok(())
    }

    /// Service URL, failing with a hint when none is configured
    pub fn service_url(&self) -> Result<&str> {
        self.service_url.as_deref().ok_or_else(|| {
            Error::config(format!(
                "no code service URL; pass --service-url, set {} or add service_url to the config file",
                ENV_SERVICE_URL
            ))
        })
    }

    /// HTTP client settings derived from this configuration
    pub fn http_config(&self) -> HttpClientConfig {
        let mut http = HttpClientConfig {
            timeout: self.timeout_secs.map(Duration::from_secs),
            validate_tls: self.validate_tls,
            ..HttpClientConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            http.user_agent = user_agent.clone();
        }
        http
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for creating configurations programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the code service URL
    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.config.service_url = Some(url.into());
        self
    }

    /// Set the default dialect
    pub fn default_format(mut self, format: FormatTag) -> Self {
        self.config.default_format = format;
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.config.timeout_secs = Some(seconds);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts MIME tags as well as the short dialect names
fn parse_format(value: &str) -> Option<FormatTag> {
    match value.trim().to_ascii_lowercase().as_str() {
        "javascript" | "js" => Some(FormatTag::JavaScript),
        "python" | "py" => Some(FormatTag::Python),
        other => FormatTag::parse(other).ok(),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_format, FormatTag::JavaScript);
        assert!(config.service_url().is_err());

        let http = config.http_config();
        assert_eq!(http.timeout, None);
        assert!(http.validate_tls);
    }

    #[test]
    fn test_yaml_file_with_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "service_url: http://localhost:8080/operation\ndefault_format: text/x-python\ntimeout_secs: 5\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.service_url().unwrap(), "http://localhost:8080/operation");
        assert_eq!(config.default_format, FormatTag::Python);
        assert_eq!(config.http_config().timeout, Some(Duration::from_secs(5)));
        assert!(config.output.progress);
    }

    #[test]
    fn test_logging_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "logging:\n  level: info\n  modules:\n    crsops_core: trace\n    reqwest: warn\n",
        )
        .unwrap();

        let logging = Config::from_file(&path).unwrap().logging;
        assert_eq!(logging.level.as_deref(), Some("info"));
        let modules = logging.modules.unwrap();
        assert_eq!(modules.get("crsops_core").map(String::as_str), Some("trace"));
        assert_eq!(modules.len(), 2);
    }

    #[test]
    fn test_save_and_reload_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ConfigBuilder::new()
            .service_url("https://ops.example.org/code")
            .default_format(FormatTag::Python)
            .timeout_secs(30)
            .build();

        config.save(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_SERVICE_URL, "http://override/operation"),
            (ENV_FORMAT, "python"),
            (ENV_TIMEOUT, "12"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.service_url.as_deref(), Some("http://override/operation"));
        assert_eq!(config.default_format, FormatTag::Python);
        assert_eq!(config.timeout_secs, Some(12));
    }

    #[test]
    fn test_invalid_environment_values() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == ENV_FORMAT).then(|| "text/plain".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = config
            .apply_overrides(|name| (name == ENV_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_with_file(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(parse_format("JS"), Some(FormatTag::JavaScript));
        assert_eq!(parse_format("text/x-python"), Some(FormatTag::Python));
        assert_eq!(parse_format("lua"), None);
    }
}
