//! Core data types for the artwork pipeline.
//!
//! Identifier and bundle types validate eagerly: once a [`CatalogKey`],
//! [`ProductType`], [`BoundBox`] or [`ArtifactPaths`] exists, it is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// Product type used when the caller does not supply one.
pub const DEFAULT_PRODUCT_TYPE: &str = "unavailable";

/// Display name given to the synthetic record built for products without artwork.
pub const PLACEHOLDER_DISPLAY_NAME: &str = "00000000";

/// Smallest accepted side of a [`BoundBox`].
pub const MIN_BOUND: u32 = 10;

/// Composite product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogKey")]
pub struct CatalogKey {
    nrn: String,
    nsn: String,
}

#[derive(Deserialize)]
struct RawCatalogKey {
    nrn: String,
    nsn: String,
}

impl TryFrom<RawCatalogKey> for CatalogKey {
    type Error = ValidationError;

    fn try_from(raw: RawCatalogKey) -> Result<Self, Self::Error> {
        Self::new(raw.nrn, raw.nsn)
    }
}

impl CatalogKey {
    /// Build a key from its two parts. Both are trimmed and must be non-empty.
    pub fn new(nrn: impl AsRef<str>, nsn: impl AsRef<str>) -> Result<Self, ValidationError> {
        let nrn = nrn.as_ref().trim();
        let nsn = nsn.as_ref().trim();
        if nrn.is_empty() {
            return Err(ValidationError::EmptyField("nrn"));
        }
        if nsn.is_empty() {
            return Err(ValidationError::EmptyField("nsn"));
        }
        let key = Self {
            nrn: nrn.to_string(),
            nsn: nsn.to_string(),
        };
        let segment = key.segment();
        if !is_safe_segment(&segment) {
            return Err(ValidationError::InvalidSegment {
                field: "catalog key",
                value: segment,
            });
        }
        Ok(key)
    }

    pub fn nrn(&self) -> &str {
        &self.nrn
    }

    pub fn nsn(&self) -> &str {
        &self.nsn
    }

    /// Directory and URL segment: `{nsn}+{nrn}` with interior spaces as `-`.
    pub fn segment(&self) -> String {
        format!(
            "{}+{}",
            self.nsn.replace(' ', "-"),
            self.nrn.replace(' ', "-")
        )
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NRN {} / NSN {}", self.nrn, self.nsn)
    }
}

/// Product type, lowercased for use as a path/URL segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductType(String);

impl ProductType {
    /// Parse an optional product type; blank or absent yields `unavailable`.
    pub fn new(value: Option<&str>) -> Result<Self, ValidationError> {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_PRODUCT_TYPE)
            .to_lowercase();
        if !is_safe_segment(&value) {
            return Err(ValidationError::InvalidSegment {
                field: "product type",
                value,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductType {
    fn default() -> Self {
        Self(DEFAULT_PRODUCT_TYPE.to_string())
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
        && !segment.contains('\0')
}

/// Artwork metadata as stored by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    /// Archive or image locator: a local path, `file:` URI, or remote URL
    pub path: String,

    /// Archive size in bytes
    #[serde(default)]
    pub size: u64,

    /// Display name of the media the artwork belongs to
    #[serde(default)]
    pub display_name: String,
}

impl ArtworkRecord {
    /// Synthetic record pointing at the default image.
    pub fn placeholder(default_image: &Path) -> Self {
        Self {
            path: default_image.to_string_lossy().into_owned(),
            size: 0,
            display_name: PLACEHOLDER_DISPLAY_NAME.to_string(),
        }
    }
}

/// Maximum size of a generated derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundBox")]
pub struct BoundBox {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawBoundBox {
    width: u32,
    height: u32,
}

impl TryFrom<RawBoundBox> for BoundBox {
    type Error = ValidationError;

    fn try_from(raw: RawBoundBox) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl BoundBox {
    pub const THUMBNAIL: BoundBox = BoundBox {
        width: 50,
        height: 50,
    };

    pub const SMALL: BoundBox = BoundBox {
        width: 500,
        height: 500,
    };

    pub fn new(width: u32, height: u32) -> Result<Self, ValidationError> {
        if width < MIN_BOUND || height < MIN_BOUND {
            return Err(ValidationError::InvalidBound {
                width,
                height,
                min: MIN_BOUND,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The two generated derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Derivative {
    Thumbnail,
    Small,
}

impl Derivative {
    /// Suffix appended to the base filename.
    pub fn suffix(self) -> &'static str {
        match self {
            Derivative::Thumbnail => "-thumbnail",
            Derivative::Small => "-small",
        }
    }
}

impl fmt::Display for Derivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivative::Thumbnail => f.write_str("thumbnail"),
            Derivative::Small => f.write_str("small"),
        }
    }
}

/// Where the source artwork came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Extracted from the record's ZIP archive
    Archive,
    /// The record path itself
    Direct,
    /// The configured default image
    Default,
}

/// Resolved locations of the source image and both derivatives.
///
/// Built once per build through [`ArtifactPaths::new`]; every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    source_path: PathBuf,
    source_url: String,
    small_path: PathBuf,
    small_url: String,
    thumbnail_path: PathBuf,
    thumbnail_url: String,
}

impl ArtifactPaths {
    pub fn new(
        source_path: PathBuf,
        source_url: String,
        small_path: PathBuf,
        small_url: String,
        thumbnail_path: PathBuf,
        thumbnail_url: String,
    ) -> Result<Self, ValidationError> {
        let paths = [
            ("source_path", &source_path),
            ("small_path", &small_path),
            ("thumbnail_path", &thumbnail_path),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }
        let urls = [
            ("source_url", &source_url),
            ("small_url", &small_url),
            ("thumbnail_url", &thumbnail_url),
        ];
        for (field, url) in urls {
            if url.trim().is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }

        Ok(Self {
            source_path,
            source_url,
            small_path,
            small_url,
            thumbnail_path,
            thumbnail_url,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn small_path(&self) -> &Path {
        &self.small_path
    }

    pub fn small_url(&self) -> &str {
        &self.small_url
    }

    pub fn thumbnail_path(&self) -> &Path {
        &self.thumbnail_path
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }

    /// Output path for a derivative.
    pub fn derivative_path(&self, derivative: Derivative) -> &Path {
        match derivative {
            Derivative::Thumbnail => &self.thumbnail_path,
            Derivative::Small => &self.small_path,
        }
    }
}

/// Outcome of a single derivative job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// The derivative was encoded and written
    Written { width: u32, height: u32 },
    /// The job ran and failed
    Failed { error: String },
    /// The job never ran
    Skipped { reason: String },
}

impl JobStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, JobStatus::Written { .. })
    }
}

/// Per-derivative outcomes of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivativeReport {
    pub thumbnail: JobStatus,
    pub small: JobStatus,
}

impl DerivativeReport {
    /// Both jobs share one status (skipped, or failed before scaling).
    pub fn both(status: JobStatus) -> Self {
        Self {
            thumbnail: status.clone(),
            small: status,
        }
    }

    pub fn status(&self, derivative: Derivative) -> &JobStatus {
        match derivative {
            Derivative::Thumbnail => &self.thumbnail,
            Derivative::Small => &self.small,
        }
    }

    /// True when both derivatives were written.
    pub fn is_complete(&self) -> bool {
        self.thumbnail.is_written() && self.small.is_written()
    }
}

/// Result of one `build_artifact` call.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactBuild {
    pub key: CatalogKey,
    pub product_type: ProductType,
    pub origin: SourceOrigin,
    pub paths: ArtifactPaths,
    pub derivatives: DerivativeReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_key_trims_and_builds_segment() {
        let key = CatalogKey::new(" CB01USC512L ", "7644 0123 12312").unwrap();
        assert_eq!(key.nrn(), "CB01USC512L");
        assert_eq!(key.segment(), "7644-0123-12312+CB01USC512L");
    }

    #[test]
    fn test_catalog_key_rejects_empty_fields() {
        assert_eq!(
            CatalogKey::new("", "7644012312312").unwrap_err(),
            ValidationError::EmptyField("nrn")
        );
        assert_eq!(
            CatalogKey::new("CB01", "   ").unwrap_err(),
            ValidationError::EmptyField("nsn")
        );
    }

    #[test]
    fn test_catalog_key_rejects_path_separators() {
        let err = CatalogKey::new("../etc", "x/y").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSegment { .. }));
    }

    #[test]
    fn test_catalog_key_deserialize_validates() {
        let ok: CatalogKey = serde_json::from_str(r#"{"nrn":"A","nsn":"B"}"#).unwrap();
        assert_eq!(ok.segment(), "B+A");
        assert!(serde_json::from_str::<CatalogKey>(r#"{"nrn":"","nsn":"B"}"#).is_err());
    }

    #[test]
    fn test_product_type_defaults_and_lowercases() {
        assert_eq!(ProductType::new(None).unwrap().as_str(), "unavailable");
        assert_eq!(ProductType::new(Some("  ")).unwrap().as_str(), "unavailable");
        assert_eq!(ProductType::new(Some("CIB01")).unwrap().as_str(), "cib01");
        assert!(ProductType::new(Some("a/b")).is_err());
        assert!(ProductType::new(Some("..")).is_err());
    }

    #[test]
    fn test_bound_box_minimum() {
        assert!(BoundBox::new(50, 50).is_ok());
        assert_eq!(
            BoundBox::new(9, 50).unwrap_err(),
            ValidationError::InvalidBound {
                width: 9,
                height: 50,
                min: MIN_BOUND
            }
        );
        assert_eq!(BoundBox::THUMBNAIL.width(), 50);
        assert_eq!(BoundBox::SMALL.height(), 500);
    }

    #[test]
    fn test_artifact_paths_rejects_empty_fields() {
        let err = ArtifactPaths::new(
            PathBuf::from("/out/a.pdf"),
            "http://x/a.pdf".into(),
            PathBuf::new(),
            "http://x/a-small.jpg".into(),
            PathBuf::from("/out/a-thumbnail.jpg"),
            "http://x/a-thumbnail.jpg".into(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("small_path"));

        let err = ArtifactPaths::new(
            PathBuf::from("/out/a.pdf"),
            "http://x/a.pdf".into(),
            PathBuf::from("/out/a-small.jpg"),
            "http://x/a-small.jpg".into(),
            PathBuf::from("/out/a-thumbnail.jpg"),
            " ".into(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("thumbnail_url"));
    }

    #[test]
    fn test_job_status_serializes_tagged() {
        let json = serde_json::to_string(&JobStatus::Written {
            width: 50,
            height: 37,
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"written","width":50,"height":37}"#);
    }

    #[test]
    fn test_report_completeness() {
        let report = DerivativeReport {
            thumbnail: JobStatus::Written {
                width: 50,
                height: 37,
            },
            small: JobStatus::Failed {
                error: "disk full".into(),
            },
        };
        assert!(!report.is_complete());
        assert!(report.status(Derivative::Thumbnail).is_written());
    }
}
