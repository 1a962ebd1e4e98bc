//! Configuration management for xenserver-inspect.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use xenserver_api::{ClientConfig, SessionRef};
use xenserver_common::LogFormat;

use crate::cli::Args;

/// Location tried when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/xenserver-inspect/config.yaml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// XenAPI endpoint and session
    pub connection: ConnectionConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Defaults plus CLI arguments, for when no config file exists.
    pub fn default_with_cli(args: &Args) -> Self {
        Self::default().with_cli_overrides(args)
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref url) = args.url {
            self.connection.url = url.clone();
        }

        if let Some(ref session) = args.session {
            self.connection.session = session.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }

        if args.json_logs {
            self.logging.format = "json".to_string();
        }

        self
    }

    /// Settings for the JSON-RPC backend.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.connection.url.clone(),
            session: SessionRef::new(self.connection.session.clone()),
            connect_timeout_secs: self.connection.connect_timeout_secs,
            request_timeout_secs: self.connection.request_timeout_secs,
            verify_ssl: self.connection.verify_ssl,
        }
    }
}

/// XenAPI connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Pool master base URL
    pub url: String,
    /// Session reference (`OpaqueRef:...`)
    pub session: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Verify the server's TLS certificate
    pub verify_ssl: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            session: String::new(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed output format.
    pub fn log_format(&self) -> Result<LogFormat> {
        self.format.parse()
    }
}
