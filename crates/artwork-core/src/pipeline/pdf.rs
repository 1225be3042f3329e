//! First-page PDF rendering through pdfium.

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{PipelineError, PipelineResult};

use super::decode::{Bitmap, ImageDecoder};

/// pdfium is not thread-safe; all rendering in the process goes through this lock.
static RENDER_LOCK: Mutex<()> = Mutex::new(());

/// Renders the first page of a PDF at native resolution (1 point = 1 pixel).
#[derive(Debug, Clone, Default)]
pub struct PdfDecoder {
    library_dir: Option<PathBuf>,
}

impl PdfDecoder {
    /// Bind pdfium from `library_dir`, or the system library path when `None`.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match &self.library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))?
            }
            None => Pdfium::bind_to_system_library()?,
        };
        Ok(Pdfium::new(bindings))
    }

    fn render_first_page(&self, path: &Path) -> PipelineResult<Bitmap> {
        let decode_err = |message: String| PipelineError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let pdfium = self
            .bind()
            .map_err(|e| decode_err(format!("Cannot bind pdfium: {}", e)))?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| decode_err(format!("Cannot open document: {}", e)))?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(decode_err("Document has no pages".to_string()));
        }
        let page = pages
            .get(0)
            .map_err(|e| decode_err(format!("Cannot load first page: {}", e)))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(1.0);
        let rendered = page
            .render_with_config(&render_config)
            .map_err(|e| decode_err(format!("Render failed: {}", e)))?;

        let width = rendered.width() as u32;
        let height = rendered.height() as u32;
        let pixels = RgbaImage::from_raw(width, height, rendered.as_rgba_bytes())
            .ok_or_else(|| decode_err("Rendered buffer does not match page size".to_string()))?;

        tracing::trace!("Rendered first page of {:?} at {}x{}", path, width, height);
        Ok(Bitmap::new(DynamicImage::ImageRgba8(pixels)))
    }
}

impl ImageDecoder for PdfDecoder {
    fn decode(&self, path: &Path) -> PipelineResult<Bitmap> {
        if !path.is_file() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Document is not openable".to_string(),
            });
        }
        let _guard = RENDER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        self.render_first_page(path)
    }
}
