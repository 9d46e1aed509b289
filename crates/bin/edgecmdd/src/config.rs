//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `edgecmd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use edgecmd_app::config::{CommandConfig, DEFAULT_MAX_CMD_OPS};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Command execution settings.
    pub device: DeviceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Virtual device toggle.
    #[serde(rename = "virtual")]
    pub virtual_devices: VirtualConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Command execution configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Maximum number of resource operations a single command may resolve to.
    pub max_cmd_ops: usize,
    /// Apply read and write transforms.
    pub data_transform: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Preload the demo devices and serve them through the simulated driver.
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `edgecmd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("edgecmd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EDGECMD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("EDGECMD_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("EDGECMD_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("EDGECMD_MAX_CMD_OPS") {
            if let Ok(max) = val.parse() {
                self.device.max_cmd_ops = max;
            }
        }
        if let Ok(val) = std::env::var("EDGECMD_DATA_TRANSFORM") {
            if let Ok(enabled) = val.parse() {
                self.device.data_transform = enabled;
            }
        }
        if let Ok(val) = std::env::var("EDGECMD_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.device.max_cmd_ops == 0 {
            return Err(ConfigError::Validation(
                "max_cmd_ops must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the settings handed to the command service.
    #[must_use]
    pub fn command_config(&self) -> CommandConfig {
        CommandConfig {
            max_cmd_ops: self.device.max_cmd_ops,
            data_transform: self.device.data_transform,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 48082,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            max_cmd_ops: DEFAULT_MAX_CMD_OPS,
            data_transform: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "edgecmdd=info,edgecmd_app=info,edgecmd_adapter_virtual=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
