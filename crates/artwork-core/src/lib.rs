//! Artwork Core - catalog artwork resolution and derivative generation.
//!
//! Given a catalog product, the pipeline finds its cover artwork (inside a
//! ZIP archive, as a direct image, or the configured default image), decodes
//! it once, and writes two JPEG derivatives to a deterministic path and URL
//! layout.
//!
//! # Architecture
//!
//! ```text
//! Catalog → PathResolver → (ArchiveExtractor | default image)
//!         → DecoderSelector → ImageDecoder → Scaler → JpegWriter  (× 2)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use artwork_core::{ArtworkBuilder, CatalogKey, Config, JsonCatalog};
//!
//! #[tokio::main]
//! async fn main() -> artwork_core::Result<()> {
//!     let config = Config::load()?;
//!     let catalog = JsonCatalog::load("catalog.json".as_ref())?;
//!     let builder = ArtworkBuilder::new(&config, Arc::new(catalog))?;
//!
//!     let key = CatalogKey::new("CB01USC512L", "7644012312312")?;
//!     let build = builder.build_artifact(&key, Some("cib01")).await?;
//!     println!("Thumbnail: {}", build.paths.thumbnail_url());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod locator;
pub mod lock;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use builder::ArtworkBuilder;
pub use catalog::{ArtworkCatalog, CatalogEntry, InMemoryCatalog, JsonCatalog};
pub use config::{ArtworkSettings, Config};
pub use error::{
    ArtworkError, CatalogError, ConfigError, PipelineError, PipelineResult, Result,
    ValidationError,
};
pub use lock::KeyLocks;
pub use output::{BatchItem, OutputFormat, OutputWriter};
pub use pipeline::{ArchiveExtractor, DecoderRegistry, ExtractOutcome, ImageDecoder};
pub use types::{
    ArtifactBuild, ArtifactPaths, ArtworkRecord, BoundBox, CatalogKey, Derivative,
    DerivativeReport, JobStatus, ProductType, SourceOrigin,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
