// pixel-lift/src/processors/resizer.rs
use crate::core::{PixelLiftError, ProcessingSettings, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Lanczos resampling for the two scaling stages, plus the dimension math
/// both the pipeline and the predictor share.
pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    pub fn upscale(&self, image: RgbaImage, factor: u32) -> Result<RgbaImage> {
        if factor <= 1 {
            return Ok(image);
        }

        let (width, height) = image.dimensions();
        let (new_width, new_height) = width
            .checked_mul(factor)
            .zip(height.checked_mul(factor))
            .ok_or_else(|| {
                PixelLiftError::MemoryLimitExceeded(format!(
                    "Upscaling {}x{} by {} overflows",
                    width, height, factor
                ))
            })?;

        log::debug!(
            "Upscaling image from {}x{} to {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        Ok(imageops::resize(&image, new_width, new_height, self.filter))
    }

    pub fn downscale(&self, image: RgbaImage, factor: f32) -> RgbaImage {
        if factor >= 1.0 {
            return image;
        }

        let (width, height) = image.dimensions();
        let new_width = shrink_length(width as u64, factor);
        let new_height = shrink_length(height as u64, factor);

        if new_width == width && new_height == height {
            log::debug!("Image dimensions unchanged, skipping downscale");
            return image;
        }

        log::debug!(
            "Downscaling image from {}x{} to {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        imageops::resize(&image, new_width, new_height, self.filter)
    }

    /// Shrinks so that `width * factor` and `height * factor` both fit inside
    /// `max_side`. Used to keep preview intermediates small.
    pub fn fit_within(&self, image: RgbaImage, factor: u32, max_side: u32) -> RgbaImage {
        let (width, height) = image.dimensions();
        let up_w = width as u64 * factor.max(1) as u64;
        let up_h = height as u64 * factor.max(1) as u64;

        if up_w <= max_side as u64 && up_h <= max_side as u64 {
            return image;
        }

        let ratio = (max_side as f64 / up_w as f64).min(max_side as f64 / up_h as f64);
        let new_width = ((width as f64 * ratio) as u32).max(1);
        let new_height = ((height as f64 * ratio) as u32).max(1);

        imageops::resize(&image, new_width, new_height, self.filter)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `round(len * factor)`, never below 1.
pub(crate) fn shrink_length(len: u64, factor: f32) -> u32 {
    let scaled = (len as f64 * factor as f64).round();
    (scaled.min(u32::MAX as f64) as u32).max(1)
}

/// Output raster size for a source of `width x height` under `settings`.
///
/// Only the scaling stages change raster size; filters and edge trim do not.
pub fn predict_dimensions(width: u32, height: u32, settings: &ProcessingSettings) -> (u32, u32) {
    let factor = settings.upscale_factor().max(1) as u64;
    let up_w = width as u64 * factor;
    let up_h = height as u64 * factor;

    let shrink = settings.downscale_factor();
    if shrink < 1.0 {
        (shrink_length(up_w, shrink), shrink_length(up_h, shrink))
    } else {
        (
            up_w.clamp(1, u32::MAX as u64) as u32,
            up_h.clamp(1, u32::MAX as u64) as u32,
        )
    }
}
