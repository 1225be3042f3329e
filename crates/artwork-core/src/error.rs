//! Error types for the artwork pipeline.
//!
//! Errors are organized by how the build reacts to them:
//! - [`ConfigError`] and [`ValidationError`] abort a build before any I/O.
//! - [`PipelineError`] is scoped to the stage that raised it. Extraction
//!   failures trigger the default-image fallback; decode/write failures are
//!   confined to the affected derivative job.
//! - [`CatalogError`] comes from the catalog collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for artwork operations.
#[derive(Error, Debug)]
pub enum ArtworkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identifier or artifact bundle failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Catalog lookup errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A required property is not set
    #[error("Required property not set: {0}")]
    MissingProperty(&'static str),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Eager validation failures from smart constructors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A value would escape its directory when used as a path segment
    #[error("{field} is not a valid path segment: {value:?}")]
    InvalidSegment { field: &'static str, value: String },

    /// A bound box dimension is below the minimum
    #[error("Bound {width}x{height} is invalid (each side must be >= {min})")]
    InvalidBound { width: u32, height: u32, min: u32 },
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No decoder is registered for the file extension
    #[error("Unsupported image type for {path}: {extension:?}")]
    UnsupportedType { path: PathBuf, extension: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Archive could not be opened or read
    #[error("Archive error for {archive}: {message}")]
    Archive { archive: PathBuf, message: String },

    /// No archive entry matched the pattern
    #[error("No entry matching {pattern:?} in {archive}")]
    NoMatchingEntry { archive: PathBuf, pattern: String },

    /// Reading or writing a file failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Derivative encoding failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by catalog implementations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog source could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog source is malformed
    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A catalog entry is invalid
    #[error("Invalid catalog entry: {0}")]
    InvalidEntry(#[from] ValidationError),
}

/// Convenience type alias for artwork results.
pub type Result<T> = std::result::Result<T, ArtworkError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
