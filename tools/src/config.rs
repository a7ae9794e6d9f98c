//! Server configuration loading and parsing

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "spartacus-mcp.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            other => bail!("unknown transport '{other}' (expected stdio or http)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_transport")]
    pub transport: Transport,
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            transport: default_transport(),
            http_addr: default_http_addr(),
        }
    }
}

impl ServerSection {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.http_addr
            .parse()
            .with_context(|| format!("Invalid http_addr '{}'", self.http_addr))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Relative output paths are resolved against this directory
    #[serde(default = "default_workspace_root")]
    pub workspace_root: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
        }
    }
}

fn default_name() -> String { "spartacus-mcp-server".into() }
fn default_version() -> String { env!("CARGO_PKG_VERSION").into() }
fn default_transport() -> Transport { Transport::Stdio }
fn default_http_addr() -> String { "127.0.0.1:3939".into() }
fn default_log_level() -> String { "info".into() }
fn default_log_format() -> LogFormat { LogFormat::Compact }
fn default_workspace_root() -> String { ".".into() }

impl ServerConfig {
    /// Apply `SPARTACUS_MCP_TRANSPORT` / `SPARTACUS_MCP_HTTP_ADDR` style overrides
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(transport) = lookup("SPARTACUS_MCP_TRANSPORT") {
            self.server.transport = transport
                .parse()
                .context("Invalid SPARTACUS_MCP_TRANSPORT")?;
        }
        if let Some(addr) = lookup("SPARTACUS_MCP_HTTP_ADDR") {
            self.server.http_addr = addr;
        }
        Ok(())
    }
}

/// Parse a config file; a missing file yields defaults
pub fn load_from(path: &Path) -> Result<ServerConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    } else {
        tracing::warn!("Config file not found at {}, using defaults", path.display());
        Ok(ServerConfig::default())
    }
}

/// Load configuration from `$SPARTACUS_MCP_CONFIG` (default `spartacus-mcp.toml`)
/// and apply environment overrides
pub fn load_config() -> Result<ServerConfig> {
    let config_path = std::env::var("SPARTACUS_MCP_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_from(Path::new(&config_path))?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}
