//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::BoundBox;

/// Artwork location and publishing settings.
///
/// `base_url`, `default_image` and `default_image_url` have no defaults;
/// they are required when a builder is constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Base directory derivatives are written under (system temp dir if unset)
    pub output_path: Option<PathBuf>,

    /// Public URL the output base is served at
    pub base_url: Option<String>,

    /// Image used when a product has no usable artwork
    pub default_image: Option<PathBuf>,

    /// Public URL of the default image
    pub default_image_url: Option<String>,
}

/// Derivative generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivativeConfig {
    /// JPEG quality (clamped to 1-100)
    pub jpeg_quality: u8,

    /// Run the two derivative jobs concurrently
    pub concurrent: bool,

    /// Bound for the thumbnail derivative
    pub thumbnail: BoundBox,

    /// Bound for the small derivative
    pub small: BoundBox,
}

impl Default for DerivativeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            concurrent: true,
            thumbnail: BoundBox::THUMBNAIL,
            small: BoundBox::SMALL,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Per-derivative (scale + write) timeout in milliseconds
    pub derivative_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
            decode_timeout_ms: 30000,
            derivative_timeout_ms: 30000,
        }
    }
}

/// PDF rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Directory containing the pdfium shared library (system search path if unset)
    pub library_dir: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
