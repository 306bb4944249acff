//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default: DefaultConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Flow document used when the CLI does not name one
    pub flow: Option<PathBuf>,

    /// Start state name; flows must declare it or the build fails
    #[serde(default = "default_start_state")]
    pub start_state: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_start_state() -> String {
    crate::state_machine::DEFAULT_START_STATE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            flow: None,
            start_state: default_start_state(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./chatflow.toml
    /// 2. ~/.chatflow/config.toml
    /// 3. /etc/chatflow/config.toml
    pub fn load() -> Result<Self> {
        let paths = vec![
            PathBuf::from("chatflow.toml"),
            dirs::home_dir()
                .map(|h| h.join(".chatflow").join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("/dev/null")),
            PathBuf::from("/etc/chatflow/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Resolve the flow document path from a CLI override or the config
    pub fn flow_path(&self, cli_flow: Option<PathBuf>) -> Result<PathBuf> {
        cli_flow.or_else(|| self.default.flow.clone()).ok_or_else(|| {
            Error::Config(
                "No flow document given. Pass --flow or set default.flow in the config file"
                    .to_string(),
            )
        })
    }

    /// Resolve the start state from a CLI override or the config
    pub fn start_state(&self, cli_start: Option<String>) -> String {
        cli_start.unwrap_or_else(|| self.default.start_state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default.start_state, "Initial");
        assert_eq!(config.logging.level, "info");
        assert!(config.default.flow.is_none());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[default]
flow = "flows/chatbot.yaml"
start_state = "Welcome"

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.default.flow, Some(PathBuf::from("flows/chatbot.yaml")));
        assert_eq!(config.default.start_state, "Welcome");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_flow_path_resolution() {
        let config = Config::default();
        assert!(config.flow_path(None).is_err());
        assert_eq!(
            config.flow_path(Some(PathBuf::from("x.yaml"))).unwrap(),
            PathBuf::from("x.yaml")
        );

        let mut config = Config::default();
        config.default.flow = Some(PathBuf::from("configured.yaml"));
        assert_eq!(config.flow_path(None).unwrap(), PathBuf::from("configured.yaml"));
    }

    #[test]
    fn test_start_state_resolution() {
        let config = Config::default();
        assert_eq!(config.start_state(None), "Initial");
        assert_eq!(config.start_state(Some("Welcome".to_string())), "Welcome");
    }
}
