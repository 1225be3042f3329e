//! JPEG derivative encoding.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Default JPEG quality for derivatives.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encodes bitmaps to JPEG files.
#[derive(Debug, Clone, Copy)]
pub struct JpegWriter {
    quality: u8,
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl JpegWriter {
    /// Create a writer; quality is clamped to 1-100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `image` to `dest`, replacing any existing file.
    ///
    /// The parent directory must already exist. Alpha is dropped.
    pub fn write(&self, image: &DynamicImage, dest: &Path) -> PipelineResult<()> {
        let rgb = image.to_rgb8();
        let file = File::create(dest).map_err(|e| PipelineError::io(dest, e))?;
        let mut writer = BufWriter::new(file);

        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(&rgb)
            .map_err(|e| PipelineError::Encode {
                path: dest.to_path_buf(),
                message: e.to_string(),
            })?;
        writer.flush().map_err(|e| PipelineError::io(dest, e))?;

        tracing::debug!(
            "Wrote {}x{} JPEG to {:?}",
            rgb.width(),
            rgb.height(),
            dest
        );
        Ok(())
    }
}
