//! Artwork pipeline components.
//!
//! Stages, leaves first:
//! - **scale**: Aspect-preserving target dimensions and Lanczos3 resampling
//! - **decode**: Extension-dispatched raster and document decoding
//! - **pdf**: First-page PDF rendering through pdfium
//! - **validate**: Pre-decode checks
//! - **write**: JPEG encoding
//! - **extract**: Deterministic archive entry lookup and copy
//! - **resolve**: Output layout and source resolution
//! - **processor**: Runs the two derivative jobs

pub mod decode;
pub mod extract;
pub mod pdf;
pub mod processor;
pub mod resolve;
pub mod scale;
pub mod validate;
pub mod write;

// Re-exports for convenient access
pub use decode::{Bitmap, DecoderRegistry, DecoderSelector, ImageDecoder, RasterDecoder, SourceKind};
pub use extract::{ArchiveExtractor, ExtractOutcome, DOCUMENT_PATTERN};
pub use pdf::PdfDecoder;
pub use processor::DerivativeProcessor;
pub use resolve::{PathResolver, ResolvedArtifact};
pub use scale::{scale_dimensions, Scaler};
pub use validate::Validator;
pub use write::JpegWriter;
