//! Output layout and source resolution.
//!
//! Every build writes under `{base}/{product_type}/{nsn}+{nrn}/` and is
//! published under the matching URL. The source is extracted from the
//! record's archive, used directly, or replaced by the default image.

use std::path::{Path, PathBuf};

use crate::config::ArtworkSettings;
use crate::error::{PipelineError, Result, ValidationError};
use crate::locator;
use crate::types::{
    ArtifactPaths, ArtworkRecord, CatalogKey, Derivative, ProductType, SourceOrigin,
};

use super::decode::SourceKind;
use super::extract::ArchiveExtractor;

/// Extension of derivative files.
pub const DERIVATIVE_EXTENSION: &str = "jpg";

const ARCHIVE_EXTENSION: &str = "zip";

/// Paths for one build and where the source came from.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub paths: ArtifactPaths,
    pub origin: SourceOrigin,
}

/// Computes output locations and picks the source for a build.
pub struct PathResolver {
    settings: ArtworkSettings,
    extractor: ArchiveExtractor,
}

impl PathResolver {
    pub fn new(settings: ArtworkSettings, extractor: ArchiveExtractor) -> Self {
        Self {
            settings,
            extractor,
        }
    }

    pub fn settings(&self) -> &ArtworkSettings {
        &self.settings
    }

    /// `{base}/{product_type}/{segment}`
    pub fn output_dir(&self, key: &CatalogKey, product_type: &ProductType) -> PathBuf {
        self.settings
            .output_base()
            .join(product_type.as_str())
            .join(key.segment())
    }

    /// `{base_url}/{product_type}/{segment}/`
    pub fn output_url(&self, key: &CatalogKey, product_type: &ProductType) -> String {
        format!(
            "{}/{}/{}/",
            self.settings.base_url(),
            product_type.as_str(),
            key.segment()
        )
    }

    /// Resolve the artifact paths for one build.
    ///
    /// Creates the output directories and, for archive records, extracts
    /// the source document into them. Unusable sources fall back to the
    /// default image with a warning.
    pub async fn resolve(
        &self,
        key: &CatalogKey,
        product_type: &ProductType,
        record: Option<ArtworkRecord>,
    ) -> Result<ResolvedArtifact> {
        let (record, has_record) = match record {
            Some(record) => (record, true),
            None => {
                tracing::warn!("No artwork record for {}, using default image", key);
                (ArtworkRecord::placeholder(self.settings.default_image()), false)
            }
        };

        let extension = locator::extension(&record.path).unwrap_or_default();
        let is_archive = extension == ARCHIVE_EXTENSION;
        if has_record && !is_archive {
            SourceKind::from_extension(&extension).ok_or_else(|| {
                PipelineError::UnsupportedType {
                    path: PathBuf::from(&record.path),
                    extension: extension.clone(),
                }
            })?;
        }

        let base_filename = locator::file_stem(&record.path)
            .ok_or(ValidationError::EmptyField("artwork record file name"))?
            .to_string();

        let out_dir = self.output_dir(key, product_type);
        let out_url = self.output_url(key, product_type);
        self.create_output_dirs(product_type, &out_dir).await?;

        let source = if !has_record {
            None
        } else if is_archive {
            self.extract_source(key, &record, &out_dir).await
        } else {
            self.direct_source(key, &record)
        };

        let (source_path, source_url, origin) = match source {
            Some((path, origin)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let url = format!("{}{}", out_url, name);
                (path, url, origin)
            }
            None => (
                self.settings.default_image().to_path_buf(),
                self.settings.default_image_url().to_string(),
                SourceOrigin::Default,
            ),
        };

        let derivative_name = |d: Derivative| {
            format!("{}{}.{}", base_filename, d.suffix(), DERIVATIVE_EXTENSION)
        };
        let small = derivative_name(Derivative::Small);
        let thumbnail = derivative_name(Derivative::Thumbnail);

        let paths = ArtifactPaths::new(
            source_path,
            source_url,
            out_dir.join(&small),
            format!("{}{}", out_url, small),
            out_dir.join(&thumbnail),
            format!("{}{}", out_url, thumbnail),
        )?;

        tracing::debug!("Resolved {} ({:?}): {:?}", key, origin, paths.source_path());
        Ok(ResolvedArtifact { paths, origin })
    }

    /// Create `{base}/{product_type}` and `{base}/{product_type}/{segment}`
    /// one level at a time; the base must already exist.
    async fn create_output_dirs(&self, product_type: &ProductType, out_dir: &Path) -> Result<()> {
        let type_dir = self.settings.output_base().join(product_type.as_str());
        for dir in [type_dir.as_path(), out_dir] {
            match tokio::fs::create_dir(dir).await {
                Ok(()) => tracing::trace!("Created {:?}", dir),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => {}
                Err(e) => return Err(PipelineError::io(dir, e).into()),
            }
        }
        Ok(())
    }

    async fn extract_source(
        &self,
        key: &CatalogKey,
        record: &ArtworkRecord,
        out_dir: &Path,
    ) -> Option<(PathBuf, SourceOrigin)> {
        let archive = match locator::reachable_path(&record.path) {
            Some(path) => path,
            None => {
                tracing::warn!(
                    "Archive {:?} for {} is not reachable, using default image",
                    record.path,
                    key
                );
                return None;
            }
        };

        let extractor = self.extractor.clone();
        let destination = out_dir.to_path_buf();
        let archive_for_task = archive.clone();
        let result = tokio::task::spawn_blocking(move || {
            extractor.extract(&archive_for_task, &destination)
        })
        .await;

        match result {
            Ok(Ok(outcome)) => Some((outcome.path, SourceOrigin::Archive)),
            Ok(Err(e)) => {
                tracing::warn!("No usable artwork for {}: {}; using default image", key, e);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Extraction task for {:?} failed: {}; using default image",
                    archive,
                    e
                );
                None
            }
        }
    }

    fn direct_source(
        &self,
        key: &CatalogKey,
        record: &ArtworkRecord,
    ) -> Option<(PathBuf, SourceOrigin)> {
        match locator::reachable_path(&record.path) {
            Some(path) => Some((path, SourceOrigin::Direct)),
            None => {
                tracing::warn!(
                    "Artwork {:?} for {} is not reachable, using default image",
                    record.path,
                    key
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ArtworkError;
    use crate::pipeline::extract::DOCUMENT_PATTERN;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    struct Fixture {
        dir: tempfile::TempDir,
        resolver: PathResolver,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let out = dir.path().join("out");
            std::fs::create_dir(&out).unwrap();

            let mut config = Config::default();
            config.artwork.output_path = Some(out);
            config.artwork.base_url = Some("http://cdn.example.com/artwork/".to_string());
            config.artwork.default_image = Some(dir.path().join("default.png"));
            config.artwork.default_image_url =
                Some("http://cdn.example.com/default.png".to_string());

            let settings = ArtworkSettings::from_config(&config).unwrap();
            let extractor = ArchiveExtractor::new(DOCUMENT_PATTERN).unwrap();
            Self {
                dir,
                resolver: PathResolver::new(settings, extractor),
            }
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("out")
        }

        fn record(&self, path: &Path) -> ArtworkRecord {
            ArtworkRecord {
                path: path.to_string_lossy().into_owned(),
                size: 0,
                display_name: "Disc".to_string(),
            }
        }
    }

    fn key() -> CatalogKey {
        CatalogKey::new("CB01USC512L", "7644 0123").unwrap()
    }

    fn product() -> ProductType {
        ProductType::new(Some("CIB01")).unwrap()
    }

    #[test]
    fn test_output_layout() {
        let fx = Fixture::new();
        assert_eq!(
            fx.resolver.output_dir(&key(), &product()),
            fx.out().join("cib01").join("7644-0123+CB01USC512L")
        );
        assert_eq!(
            fx.resolver.output_url(&key(), &product()),
            "http://cdn.example.com/artwork/cib01/7644-0123+CB01USC512L/"
        );
    }

    #[tokio::test]
    async fn test_missing_record_uses_default_image() {
        let fx = Fixture::new();
        let resolved = fx
            .resolver
            .resolve(&key(), &ProductType::default(), None)
            .await
            .unwrap();

        let dir = fx.out().join("unavailable").join("7644-0123+CB01USC512L");
        assert_eq!(resolved.origin, SourceOrigin::Default);
        assert!(dir.is_dir());
        assert_eq!(resolved.paths.source_path(), fx.dir.path().join("default.png"));
        assert_eq!(
            resolved.paths.source_url(),
            "http://cdn.example.com/default.png"
        );
        assert_eq!(resolved.paths.small_path(), dir.join("default-small.jpg"));
        assert_eq!(
            resolved.paths.thumbnail_url(),
            "http://cdn.example.com/artwork/unavailable/7644-0123+CB01USC512L/default-thumbnail.jpg"
        );
    }

    #[tokio::test]
    async fn test_missing_archive_falls_back() {
        let fx = Fixture::new();
        let record = fx.record(&fx.dir.path().join("gone").join("DISC01.zip"));
        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(record))
            .await
            .unwrap();

        assert_eq!(resolved.origin, SourceOrigin::Default);
        assert_eq!(resolved.paths.source_path(), fx.dir.path().join("default.png"));
        assert!(resolved
            .paths
            .thumbnail_path()
            .ends_with("DISC01-thumbnail.jpg"));
    }

    #[tokio::test]
    async fn test_archive_source_is_extracted() {
        let fx = Fixture::new();
        let archive = fx.dir.path().join("DISC01.ZIP");
        let mut zip = ZipWriter::new(std::fs::File::create(&archive).unwrap());
        zip.start_file("art/cover.pdf", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"%PDF-1.4 cover").unwrap();
        zip.finish().unwrap();

        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(fx.record(&archive)))
            .await
            .unwrap();

        let dir = fx.out().join("cib01").join("7644-0123+CB01USC512L");
        assert_eq!(resolved.origin, SourceOrigin::Archive);
        assert_eq!(resolved.paths.source_path(), dir.join("cover.pdf"));
        assert_eq!(
            resolved.paths.source_url(),
            "http://cdn.example.com/artwork/cib01/7644-0123+CB01USC512L/cover.pdf"
        );
        assert_eq!(resolved.paths.small_path(), dir.join("DISC01-small.jpg"));
        assert!(dir.join("cover.pdf").is_file());
    }

    #[tokio::test]
    async fn test_archive_without_match_falls_back() {
        let fx = Fixture::new();
        let archive = fx.dir.path().join("DISC02.zip");
        let mut zip = ZipWriter::new(std::fs::File::create(&archive).unwrap());
        zip.start_file("notes.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"no artwork").unwrap();
        zip.finish().unwrap();

        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(fx.record(&archive)))
            .await
            .unwrap();
        assert_eq!(resolved.origin, SourceOrigin::Default);
    }

    #[tokio::test]
    async fn test_direct_source() {
        let fx = Fixture::new();
        let image = fx.dir.path().join("cover.png");
        std::fs::write(&image, b"png").unwrap();

        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(fx.record(&image)))
            .await
            .unwrap();
        assert_eq!(resolved.origin, SourceOrigin::Direct);
        assert_eq!(resolved.paths.source_path(), image);
        assert!(resolved.paths.source_url().ends_with("/cover.png"));
    }

    #[tokio::test]
    async fn test_directory_source_falls_back() {
        let fx = Fixture::new();
        let not_a_file = fx.dir.path().join("cover.png");
        std::fs::create_dir(&not_a_file).unwrap();

        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(fx.record(&not_a_file)))
            .await
            .unwrap();
        assert_eq!(resolved.origin, SourceOrigin::Default);
        assert_eq!(resolved.paths.source_path(), fx.dir.path().join("default.png"));
    }

    #[tokio::test]
    async fn test_remote_source_falls_back() {
        let fx = Fixture::new();
        let record = ArtworkRecord {
            path: "https://images.example.com/cover.jpg".to_string(),
            size: 0,
            display_name: String::new(),
        };
        let resolved = fx
            .resolver
            .resolve(&key(), &product(), Some(record))
            .await
            .unwrap();
        assert_eq!(resolved.origin, SourceOrigin::Default);
        assert!(resolved.paths.small_path().ends_with("cover-small.jpg"));
    }

    #[tokio::test]
    async fn test_unsupported_type_creates_nothing() {
        let fx = Fixture::new();
        let image = fx.dir.path().join("cover.tiff");
        std::fs::write(&image, b"II*\0").unwrap();

        let err = fx
            .resolver
            .resolve(&key(), &product(), Some(fx.record(&image)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ArtworkError::Pipeline(PipelineError::UnsupportedType { .. })
        ));
        assert_eq!(std::fs::read_dir(fx.out()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_output_base_is_io_error() {
        let fx = Fixture::new();
        std::fs::remove_dir(fx.out()).unwrap();

        let err = fx
            .resolver
            .resolve(&key(), &product(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ArtworkError::Pipeline(PipelineError::Io { .. })));
    }
}
