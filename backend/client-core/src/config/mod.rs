use crate::error::config::ConfigError;
use crate::{DEFAULT_SERVER_ADDRESS, IDENTITY_CORE_URL};

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const APP_DIR_NAME: &str = "hibiscus";
const MAX_POOL_SIZE: usize = 32;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_address")]
    pub default_address: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_address: default_server_address(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_core_url")]
    pub core_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_elapsed_secs")]
    pub max_elapsed_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            core_url: default_core_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_elapsed_secs: default_max_elapsed_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub mobile: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            identity: IdentityConfig::default(),
            client: ClientConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_server_address() -> Option<String> {
    Some(DEFAULT_SERVER_ADDRESS.to_string())
}
fn default_core_url() -> String {
    IDENTITY_CORE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_max_elapsed_secs() -> u64 {
    15
}
fn default_pool_size() -> usize {
    crate::probe::DEFAULT_POOL_SIZE
}
fn default_probe_timeout_secs() -> u64 {
    crate::probe::DEFAULT_PROBE_TIMEOUT.as_secs()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Platform config directory for the client, e.g. `~/.config/hibiscus`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::read(&config_path, e)
        })?;

        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::parse(&config_path, e.to_string())
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json through a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::write(config_dir, e))?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::serialize(e.to_string()))?;
        std::fs::write(&temp_path, json).map_err(|e| ConfigError::write(&temp_path, e))?;
        std::fs::rename(&temp_path, &config_path)
            .map_err(|e| ConfigError::write(&config_path, e))?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedVersion`] for an unknown version and
    /// [`ConfigError::ValidationError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::unsupported_version(
                self.version,
                CONFIG_VERSION,
            ));
        }

        if self.probe.pool_size == 0 || self.probe.pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::invalid(
                "probe.pool_size",
                format!(
                    "Invalid probe pool size: {} (must be 1-{})",
                    self.probe.pool_size, MAX_POOL_SIZE
                ),
            ));
        }

        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "probe.timeout_secs",
                "Probe timeout must be at least 1 second",
            ));
        }

        if let Some(ref address) = self.server.default_address {
            if !address.starts_with("ws://") && !address.starts_with("wss://") {
                return Err(ConfigError::invalid(
                    "server.default_address",
                    format!("Invalid server address: {} (must be ws:// or wss://)", address),
                ));
            }
        }

        if !self.identity.core_url.starts_with("http://")
            && !self.identity.core_url.starts_with("https://")
        {
            return Err(ConfigError::invalid(
                "identity.core_url",
                format!("Invalid identity core URL: {}", self.identity.core_url),
            ));
        }

        Ok(())
    }
}
