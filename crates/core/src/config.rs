//! Configuration management
//!
//! The configuration lives in a single TOML file. Its location is
//! `$OL_CONFIG_DIR/config.toml` when the variable is set, otherwise
//! `<platform config dir>/openlist-cli/config.toml`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "OL_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";
const CONFIG_VERSION: &str = "1";

/// Top-level configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version of the file
    #[serde(default = "default_version")]
    pub version: String,

    /// Server connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Request timeouts
    #[serde(default)]
    pub timeouts: Timeouts,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

/// Connection details for one OpenList server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base address, e.g. `http://localhost:5244`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Forward proxy, e.g. `http://127.0.0.1:8080`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl ServerConfig {
    /// Create a server configuration without a proxy
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            proxy: None,
        }
    }

    /// Set the forward proxy; an empty string means no proxy
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        let proxy = proxy.into();
        self.proxy = if proxy.trim().is_empty() {
            None
        } else {
            Some(proxy)
        };
        self
    }

    /// Check that the server can be connected to
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config(
                "server url is not set (run `ol server set` or pass --url)".to_string(),
            ));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server url must start with http:// or https://: {}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Default timeout for JSON requests
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,

    /// Timeout for a single upload request
    #[serde(default = "default_upload_secs")]
    pub upload_secs: u64,

    /// Timeout for a single download, body included
    #[serde(default = "default_download_secs")]
    pub download_secs: u64,

    /// Bound on the proxy reachability probe
    #[serde(default = "default_proxy_probe_secs")]
    pub proxy_probe_secs: u64,
}

fn default_request_secs() -> u64 {
    30
}

fn default_upload_secs() -> u64 {
    300
}

fn default_download_secs() -> u64 {
    3600
}

fn default_proxy_probe_secs() -> u64 {
    5
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request_secs(),
            upload_secs: default_upload_secs(),
            download_secs: default_download_secs(),
            proxy_probe_secs: default_proxy_probe_secs(),
        }
    }
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn upload(&self) -> Duration {
        Duration::from_secs(self.upload_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn proxy_probe(&self) -> Duration {
        Duration::from_secs(self.proxy_probe_secs)
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default configuration location
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?
                .join("openlist-cli"),
        };
        Ok(Self::with_path(dir.join(CONFIG_FILE)))
    }

    /// Create a manager for an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Path of the configuration file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, returning defaults when the file does not exist
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "failed to parse {}: {e}",
                self.config_path.display()
            ))
        })?;

        if config.version != CONFIG_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version '{}' (expected '{CONFIG_VERSION}')",
                config.version
            )));
        }

        Ok(config)
    }

    /// Save the configuration, creating the directory if needed
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        // The file holds a password: private from creation on
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.config_path)?;

        // An existing file keeps its old mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(content.as_bytes())?;
        Ok(())
    }
}
