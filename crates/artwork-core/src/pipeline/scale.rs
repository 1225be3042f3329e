//! Aspect-preserving derivative scaling.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::types::BoundBox;

/// Output dimensions for a source scaled to fit `bound`.
///
/// One side always equals the matching bound side; the other is floored and
/// never drops below one pixel. Sources smaller than the bound are scaled up.
pub fn scale_dimensions(source: (u32, u32), bound: BoundBox) -> (u32, u32) {
    let (w, h) = (u64::from(source.0.max(1)), u64::from(source.1.max(1)));
    let (bw, bh) = (u64::from(bound.width()), u64::from(bound.height()));

    // w/h < bw/bh, compared without division
    if w * bh < bw * h {
        let out_w = (bh * w / h).max(1);
        (clamp_u32(out_w), bound.height())
    } else {
        let out_h = (bw * h / w).max(1);
        (bound.width(), clamp_u32(out_h))
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Resamples bitmaps into bound boxes.
#[derive(Debug, Clone, Copy)]
pub struct Scaler {
    filter: FilterType,
}

impl Default for Scaler {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl Scaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize `image` to the dimensions computed by [`scale_dimensions`].
    pub fn scale(&self, image: &DynamicImage, bound: BoundBox) -> DynamicImage {
        let (width, height) = scale_dimensions((image.width(), image.height()), bound);
        tracing::trace!(
            "Scaling {}x{} -> {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        image.resize_exact(width, height, self.filter)
    }
}
