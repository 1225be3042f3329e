//! Source validation before decode.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::decode::SourceKind;

/// Validates source files before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Quick checks before a full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - Magic bytes match the selected decoder variant
    pub fn validate(&self, path: &Path, kind: SourceKind) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path, kind)
    }

    fn check_magic_bytes(&self, path: &Path, kind: SourceKind) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;

        let mut header = [0u8; 8];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if bytes_read < 4 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid source".to_string(),
            });
        }

        let is_valid = match kind {
            SourceKind::Raster => Self::is_raster_header(&header),
            SourceKind::Document => Self::is_document_header(&header),
        };

        if !is_valid {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Magic bytes do not match a {:?} source", kind),
            });
        }

        Ok(())
    }

    /// JPEG, PNG, GIF or BMP signature.
    fn is_raster_header(header: &[u8; 8]) -> bool {
        // JPEG: FF D8 FF
        if header[..3] == [0xFF, 0xD8, 0xFF] {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[..4] == [0x89, b'P', b'N', b'G'] {
            return true;
        }

        // GIF: GIF8
        if header[..4] == *b"GIF8" {
            return true;
        }

        // BMP: BM
        header[..2] == *b"BM"
    }

    /// PDF signature: %PDF
    fn is_document_header(header: &[u8; 8]) -> bool {
        header[..4] == *b"%PDF"
    }
}
