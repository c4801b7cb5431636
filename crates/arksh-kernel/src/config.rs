//! Kernel configuration.
//!
//! Loaded from `~/.config/arksh/config.toml`:
//!
//! ```toml
//! username = "amy"
//! hostname = "vfs"
//! vfs_path = "disk.zip"
//! startup_script = "startup.txt"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

/// Configuration for one shell session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// User name shown in the prompt.
    #[serde(default = "default_username")]
    pub username: String,

    /// Host name shown in the prompt.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// The zip archive backing the virtual filesystem.
    pub vfs_path: PathBuf,

    /// Commands to run, one per line, before the first prompt.
    #[serde(default)]
    pub startup_script: Option<PathBuf>,
}

fn default_username() -> String {
    std::env::var("USER").unwrap_or_else(|_| "user".to_string())
}

fn default_hostname() -> String {
    "arksh".to_string()
}

impl KernelConfig {
    /// Config for `vfs_path` with default prompt names and no startup script.
    pub fn new(vfs_path: impl Into<PathBuf>) -> Self {
        Self {
            username: default_username(),
            hostname: default_hostname(),
            vfs_path: vfs_path.into(),
            startup_script: None,
        }
    }

    /// Load configuration from the default path.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load() -> Result<Option<Self>> {
        let path = paths::config_file();
        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.vfs_path = base.join(&config.vfs_path);
            config.startup_script = config.startup_script.map(|s| base.join(s));
        }
        Ok(config)
    }

    pub fn with_vfs_path(mut self, vfs_path: impl Into<PathBuf>) -> Self {
        self.vfs_path = vfs_path.into();
        self
    }

    pub fn with_startup_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.startup_script = Some(script.into());
        self
    }

    pub fn with_identity(mut self, username: impl Into<String>, hostname: impl Into<String>) -> Self {
        self.username = username.into();
        self.hostname = hostname.into();
        self
    }
}
