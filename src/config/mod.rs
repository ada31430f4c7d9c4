//! Configuration for FrameScope
//!
//! Viewer settings persisted as TOML.
//!
//! # Location
//!
//! Without an explicit path the file lives in the platform config directory:
//! - **Linux**: `~/.config/dev.framescope.framescope-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.framescope.framescope-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.framescope.framescope-rs\config.toml`

use crate::error::{FrameScopeError, Result};
use crate::source::random;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.framescope.framescope-rs";
/// Config filename
pub const CONFIG_FILE: &str = "config.toml";
/// Default number of display slots
pub const DEFAULT_SLOTS: usize = 3;

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Number of display slots
    #[serde(default = "default_slots")]
    pub slots: usize,

    /// Plane shapes of the synthetic source, `(channels, ticks)`
    #[serde(default = "random::default_shapes")]
    pub random_shapes: Vec<(usize, usize)>,

    /// Pipeline stages enabled at start-up, by name
    #[serde(default)]
    pub stages: Vec<String>,

    /// `tracing` filter directive; `RUST_LOG` takes precedence
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_slots() -> usize {
    DEFAULT_SLOTS
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            random_shapes: random::default_shapes(),
            stages: Vec::new(),
            log_filter: None,
        }
    }
}

impl ViewerConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| FrameScopeError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| FrameScopeError::Config(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            FrameScopeError::Config("Could not determine config directory".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Write pretty TOML, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                FrameScopeError::Config(format!("Failed to create {:?}: {}", dir, e))
            })?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| FrameScopeError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| FrameScopeError::Config(format!("Failed to write {:?}: {}", path, e)))
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| {
            FrameScopeError::Config("Could not determine config directory".to_string())
        })?;
        self.save_to(path)
    }
}
