//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Endpoint the debug backend listens on, in `host:port` form
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Debug backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            backend: BackendConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8989".to_string()
}

/// Configuration for the debug backend binary
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Backend executable, either a path or a name looked up in PATH
    #[serde(default = "default_backend_path")]
    pub path: PathBuf,

    /// Additional arguments passed before `--bind`
    #[serde(default)]
    pub args: Vec<String>,

    /// Command prefix that opens a new interactive terminal,
    /// e.g. `["x-terminal-emulator", "-e"]`
    #[serde(default)]
    pub terminal: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            path: default_backend_path(),
            args: Vec::new(),
            terminal: Vec::new(),
        }
    }
}

fn default_backend_path() -> PathBuf {
    PathBuf::from("cdf-dap")
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Timeout for connecting to (or probing) the backend endpoint
    #[serde(default = "default_connect")]
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: default_connect(),
        }
    }
}

fn default_connect() -> u64 {
    5
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Resolve the backend executable
    ///
    /// Explicit paths are taken as-is; bare names are searched in PATH.
    pub fn backend_executable(&self) -> Result<PathBuf> {
        let path = &self.backend.path;
        if path.components().count() > 1 || path.is_absolute() {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(Error::backend_not_found(
                &path.display().to_string(),
                &[path.display().to_string()],
            ));
        }

        which::which(path).map_err(|_| {
            Error::backend_not_found(&path.display().to_string(), &["PATH"])
        })
    }
}
