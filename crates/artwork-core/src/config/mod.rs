//! Configuration management for the artwork pipeline.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every section. Properties without a sensible default (base URL,
//! default image) are resolved separately by [`ArtworkSettings`].

mod settings;
mod types;
mod validate;

pub use settings::ArtworkSettings;
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output location and default-image settings
    pub artwork: ArtworkConfig,

    /// Derivative bounds and encoding
    pub derivatives: DerivativeConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// PDF rendering
    pub pdf: PdfConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.artwork.artwork/config.toml
    /// - Linux: ~/.config/artwork/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\artwork\config\config.toml
    ///
    /// Falls back to ~/.artwork/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "artwork", "artwork")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".artwork").join("config.toml")
            })
    }

    /// Get the resolved pdfium library directory (with ~ expansion).
    pub fn pdf_library_dir(&self) -> Option<PathBuf> {
        self.pdf.library_dir.as_deref().map(expand_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a configured path.
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
