//! The `build_artifact` entry point.

use std::sync::Arc;

use crate::catalog::ArtworkCatalog;
use crate::config::{ArtworkSettings, Config};
use crate::error::Result;
use crate::lock::KeyLocks;
use crate::pipeline::{
    ArchiveExtractor, DecoderRegistry, DerivativeProcessor, PathResolver, DOCUMENT_PATTERN,
};
use crate::types::{ArtifactBuild, CatalogKey, ProductType};

/// Builds artwork derivatives for catalog products.
///
/// Builds for the same key are serialized; builds for different keys run
/// in parallel. Cheap to share behind an `Arc`.
pub struct ArtworkBuilder {
    catalog: Arc<dyn ArtworkCatalog>,
    resolver: PathResolver,
    processor: DerivativeProcessor,
    locks: KeyLocks,
}

impl ArtworkBuilder {
    /// Create a builder with the standard raster and pdfium decoders.
    ///
    /// Fails if required `[artwork]` properties are missing.
    pub fn new(config: &Config, catalog: Arc<dyn ArtworkCatalog>) -> Result<Self> {
        let registry = DecoderRegistry::standard(config.pdf_library_dir());
        Self::with_registry(config, catalog, registry)
    }

    /// Create a builder with custom decoders.
    pub fn with_registry(
        config: &Config,
        catalog: Arc<dyn ArtworkCatalog>,
        registry: DecoderRegistry,
    ) -> Result<Self> {
        let settings = ArtworkSettings::from_config(config)?;
        let extractor = ArchiveExtractor::new(DOCUMENT_PATTERN)?;
        tracing::debug!(
            "Artwork builder writing to {:?}, published at {}",
            settings.output_base(),
            settings.base_url()
        );

        Ok(Self {
            catalog,
            resolver: PathResolver::new(settings, extractor),
            processor: DerivativeProcessor::new(config, registry),
            locks: KeyLocks::new(),
        })
    }

    pub fn settings(&self) -> &ArtworkSettings {
        self.resolver.settings()
    }

    /// Resolve, extract and render the derivatives for one product.
    ///
    /// Completes once extraction and both derivative jobs have finished.
    /// Derivative failures are reported per job in the returned build; only
    /// invalid input, catalog failures, unsupported source types and output
    /// directory errors fail the call.
    pub async fn build_artifact(
        &self,
        key: &CatalogKey,
        product_type: Option<&str>,
    ) -> Result<ArtifactBuild> {
        let product_type = ProductType::new(product_type)?;
        let _guard = self.locks.lock(&key.segment()).await;

        let record = self.catalog.artwork_record(key).await?;
        let resolved = self.resolver.resolve(key, &product_type, record).await?;
        let derivatives = self
            .processor
            .process(resolved.paths.source_path(), &resolved.paths)
            .await;

        if !derivatives.is_complete() {
            tracing::warn!("Build for {} finished with failed derivatives", key);
        }

        Ok(ArtifactBuild {
            key: key.clone(),
            product_type,
            origin: resolved.origin,
            paths: resolved.paths,
            derivatives,
        })
    }
}
