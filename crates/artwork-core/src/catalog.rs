//! Catalog lookup interface and implementations.
//!
//! The pipeline only reads artwork records. [`InMemoryCatalog`] serves
//! embedders and tests; [`JsonCatalog`] backs the CLI with a JSON file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::types::{ArtworkRecord, CatalogKey};

/// Read access to product artwork metadata.
#[async_trait]
pub trait ArtworkCatalog: Send + Sync {
    /// Artwork record for `key`, or `None` if the product has no artwork.
    async fn artwork_record(&self, key: &CatalogKey)
        -> Result<Option<ArtworkRecord>, CatalogError>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    records: HashMap<CatalogKey, ArtworkRecord>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for `key`.
    pub fn insert(&mut self, key: CatalogKey, record: ArtworkRecord) -> Option<ArtworkRecord> {
        self.records.insert(key, record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ArtworkCatalog for InMemoryCatalog {
    async fn artwork_record(
        &self,
        key: &CatalogKey,
    ) -> Result<Option<ArtworkRecord>, CatalogError> {
        Ok(self.records.get(key).cloned())
    }
}

/// One product in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub nrn: String,
    pub nsn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    /// Display name of the media
    #[serde(default)]
    pub cd_name: String,

    /// Archive or image locator; entries without one have no artwork
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub size: u64,
}

impl CatalogEntry {
    pub fn key(&self) -> Result<CatalogKey, CatalogError> {
        Ok(CatalogKey::new(&self.nrn, &self.nsn)?)
    }

    fn record(&self) -> Option<ArtworkRecord> {
        let path = self.path.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
        Some(ArtworkRecord {
            path: path.to_string(),
            size: self.size,
            display_name: self.cd_name.clone(),
        })
    }
}

/// Catalog loaded from a JSON array of [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
    entries: Vec<CatalogEntry>,
    records: InMemoryCatalog,
}

impl JsonCatalog {
    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(path, entries)
    }

    fn from_entries(path: &Path, entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut records = InMemoryCatalog::new();
        for entry in &entries {
            let key = entry.key()?;
            if let Some(record) = entry.record() {
                if records.insert(key.clone(), record).is_some() {
                    tracing::warn!("Duplicate catalog entry for {}; keeping the last one", key);
                }
            }
        }
        tracing::debug!(
            "Loaded {} catalog entries ({} with artwork) from {:?}",
            entries.len(),
            records.len(),
            path
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, in file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[async_trait]
impl ArtworkCatalog for JsonCatalog {
    async fn artwork_record(
        &self,
        key: &CatalogKey,
    ) -> Result<Option<ArtworkRecord>, CatalogError> {
        self.records.artwork_record(key).await
    }
}
