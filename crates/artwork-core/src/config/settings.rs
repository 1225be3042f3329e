//! Required-property resolution.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::pipeline::SourceKind;

use super::{expand_path, Config};

/// Resolved artwork properties a builder needs before any build can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkSettings {
    output_base: PathBuf,
    base_url: String,
    default_image: PathBuf,
    default_image_url: String,
}

impl ArtworkSettings {
    /// Resolve the `[artwork]` section.
    ///
    /// Missing `base_url`, `default_image` or `default_image_url` is fatal.
    /// A missing `output_path` falls back to the system temp directory.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let section = &config.artwork;

        let base_url = non_blank(section.base_url.as_deref())
            .ok_or(ConfigError::MissingProperty("artwork.base_url"))?
            .trim_end_matches('/')
            .to_string();

        let default_image = section
            .default_image
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(expand_path)
            .ok_or(ConfigError::MissingProperty("artwork.default_image"))?;

        let default_image_url = non_blank(section.default_image_url.as_deref())
            .ok_or(ConfigError::MissingProperty("artwork.default_image_url"))?
            .to_string();

        if SourceKind::for_path(&default_image).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "artwork.default_image has an unsupported image type: {}",
                default_image.display()
            )));
        }
        if !default_image.is_file() {
            tracing::warn!(
                "Default image {:?} does not exist; fallback builds will fail to render",
                default_image
            );
        }

        let output_base = match section.output_path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => expand_path(path),
            _ => {
                let tmp = std::env::temp_dir();
                tracing::warn!(
                    "artwork.output_path not set, writing derivatives under {:?}",
                    tmp
                );
                tmp
            }
        };
        if !output_base.is_dir() {
            return Err(ConfigError::ValidationError(format!(
                "artwork.output_path does not exist or is not a directory: {}",
                output_base.display()
            )));
        }

        Ok(Self {
            output_base,
            base_url,
            default_image,
            default_image_url,
        })
    }

    /// Existing directory all output trees are created under.
    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    /// Base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_image(&self) -> &Path {
        &self.default_image
    }

    pub fn default_image_url(&self) -> &str {
        &self.default_image_url
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
