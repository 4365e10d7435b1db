pub mod env;
pub use env::overrides_from_env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional TOML file with server settings.
pub const CONFIG_PATH_ENV: &str = "CONNECTOR_CONFIG";

/// Settings shared by every connector binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
    /// Page size requested from vendor listing APIs
    pub page_size: u32,
    /// Size of the process-wide pool of in-flight vendor calls
    pub max_concurrent_connections: usize,
    /// Reported in the synchronizer config
    pub api_version: u32,
    /// Delay between a shutdown signal and closing the listener
    pub wait_before_server_close_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            page_size: 50,
            max_concurrent_connections: 10,
            api_version: 1,
            wait_before_server_close_secs: 0,
            body_limit_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

/// Partial settings, as found in a TOML file or in the environment.
///
/// Missing keys keep whatever the connector chose as its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub page_size: Option<u32>,
    pub max_concurrent_connections: Option<usize>,
    pub api_version: Option<u32>,
    pub wait_before_server_close_secs: Option<u64>,
    pub body_limit_bytes: Option<usize>,
}

impl ServerConfig {
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.port {
            self.port = v;
        }
        if let Some(v) = overrides.log_level {
            self.log_level = v;
        }
        if let Some(v) = overrides.page_size {
            self.page_size = v;
        }
        if let Some(v) = overrides.max_concurrent_connections {
            self.max_concurrent_connections = v;
        }
        if let Some(v) = overrides.api_version {
            self.api_version = v;
        }
        if let Some(v) = overrides.wait_before_server_close_secs {
            self.wait_before_server_close_secs = v;
        }
        if let Some(v) = overrides.body_limit_bytes {
            self.body_limit_bytes = v;
        }
        self
    }

    /// Connector defaults, then the TOML file named by `CONNECTOR_CONFIG`
    /// (if set), then environment variables.
    pub fn load(defaults: ServerConfig) -> Result<Self> {
        let mut config = defaults;
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            config = config.apply(load_file(&path)?);
        }
        Ok(config.apply(overrides_from_env()))
    }
}

/// Load overrides from a TOML file.
pub fn load_file(path: &str) -> Result<ConfigOverrides> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))
}
