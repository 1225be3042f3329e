//! Source decoding with extension dispatch, limits, and timeout support.
//!
//! Two decoder variants share the [`ImageDecoder`] capability: raster
//! images go through the `image` crate, paginated documents through
//! pdfium (see [`super::pdf`]). The [`DecoderSelector`] maps a source
//! path to a variant and runs it on the blocking pool.

use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

use super::pdf::PdfDecoder;

/// A decoded pixel buffer.
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// The decoded image data
    pub image: DynamicImage,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Bitmap {
    pub fn new(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }
}

/// Decodes a source file into a [`Bitmap`].
///
/// Implementations are synchronous and run on the blocking pool.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> PipelineResult<Bitmap>;
}

/// Decoder variant a source extension maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JPEG, PNG, GIF, BMP
    Raster,
    /// PDF, first page only
    Document,
}

impl SourceKind {
    /// Extensions handled by the raster decoder.
    pub const RASTER_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png", "gif", "bmp"];

    /// Extensions handled by the document decoder.
    pub const DOCUMENT_EXTENSIONS: &'static [&'static str] = &["pdf"];

    /// Map a file extension (any case) to a decoder variant.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.to_ascii_lowercase();
        if Self::RASTER_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Raster)
        } else if Self::DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Document)
        } else {
            None
        }
    }

    /// Map a path to a decoder variant, or fail with `UnsupportedType`.
    pub fn for_path(path: &Path) -> PipelineResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| PipelineError::UnsupportedType {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        })
    }
}

/// Raster decoder using content-sniffed format detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, path: &Path) -> PipelineResult<Bitmap> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Bitmap::new(image))
    }
}

/// Strategy registry: one decoder per [`SourceKind`].
#[derive(Clone)]
pub struct DecoderRegistry {
    raster: Arc<dyn ImageDecoder>,
    document: Arc<dyn ImageDecoder>,
}

impl DecoderRegistry {
    pub fn new(raster: Arc<dyn ImageDecoder>, document: Arc<dyn ImageDecoder>) -> Self {
        Self { raster, document }
    }

    /// Raster decoding via `image` and PDF rendering via pdfium.
    pub fn standard(pdf_library_dir: Option<PathBuf>) -> Self {
        Self::new(
            Arc::new(RasterDecoder),
            Arc::new(PdfDecoder::new(pdf_library_dir)),
        )
    }

    pub fn decoder(&self, kind: SourceKind) -> Arc<dyn ImageDecoder> {
        match kind {
            SourceKind::Raster => Arc::clone(&self.raster),
            SourceKind::Document => Arc::clone(&self.document),
        }
    }
}

/// Picks a decoder by extension and runs it with limits and a timeout.
#[derive(Clone)]
pub struct DecoderSelector {
    registry: DecoderRegistry,
    limits: LimitsConfig,
}

impl DecoderSelector {
    pub fn new(registry: DecoderRegistry, limits: LimitsConfig) -> Self {
        Self { registry, limits }
    }

    /// Decoder variant for `path`; fails before any decode work if unmapped.
    pub fn select(&self, path: &Path) -> PipelineResult<SourceKind> {
        SourceKind::for_path(path)
    }

    /// Decode `path` on the blocking pool under `limits.decode_timeout_ms`.
    pub async fn decode(&self, path: &Path, kind: SourceKind) -> PipelineResult<Bitmap> {
        let decoder = self.registry.decoder(kind);
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || decoder.decode(&path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(bitmap))) => {
                let max_dim = self.limits.max_image_dimension;
                if bitmap.width > max_dim || bitmap.height > max_dim {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: bitmap.width,
                        height: bitmap.height,
                        max_dim,
                    });
                }
                Ok(bitmap)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}
