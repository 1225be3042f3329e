//! Command implementations.

pub mod batch;
pub mod build;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use artwork_core::{ArtworkBuilder, Config, JsonCatalog};

/// Load an explicit config file, or the default one if it exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()?),
    }
}

/// Config file path the `config` command operates on.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}

/// Load a catalog file and a builder reading from it.
pub fn open_builder(
    config: &Config,
    catalog_path: &Path,
) -> anyhow::Result<(ArtworkBuilder, Arc<JsonCatalog>)> {
    let catalog = Arc::new(
        JsonCatalog::load(catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?,
    );
    let builder = ArtworkBuilder::new(config, catalog.clone())
        .context("Artwork configuration is incomplete; see `artwork config show`")?;
    Ok((builder, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artwork.toml");
        std::fs::write(&path, "[derivatives]\njpeg_quality = 60\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.derivatives.jpeg_quality, 60);
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let err = load_config(Some(Path::new("/nonexistent/artwork.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_config_path_prefers_explicit() {
        let explicit = Path::new("/etc/artwork.toml");
        assert_eq!(config_path(Some(explicit)), explicit);
        assert_eq!(config_path(None), Config::default_path());
    }
}
