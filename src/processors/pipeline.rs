// pixel-lift/src/processors/pipeline.rs
use super::enhance;
use super::resizer::Resizer;
use crate::core::{ProcessingSettings, Result};
use image::RgbaImage;

/// Runs the fixed stage sequence over an RGBA buffer.
///
/// Order: upscale, pre-blur, unsharp mask, downscale, contrast, saturation,
/// brightness, noise reduction, edge erosion. Each stage is skipped when its
/// parameter sits at the no-op value. Settings are validated first; nothing
/// after that point fails for in-range values except an upscale whose target
/// size overflows.
pub fn run(image: RgbaImage, settings: &ProcessingSettings) -> Result<RgbaImage> {
    settings.validate()?;

    let resizer = Resizer::new();
    let mut image = resizer.upscale(image, settings.upscale_factor())?;

    if settings.blur_radius > 0.0 {
        log::debug!("Pre-blur, radius {}", settings.blur_radius);
        image = enhance::gaussian_blur(&image, settings.blur_radius);
    }

    if settings.sharpen_amount > 0 {
        log::debug!(
            "Unsharp mask, radius {} amount {}% threshold {}",
            settings.sharpen_radius,
            settings.sharpen_amount,
            settings.sharpen_threshold
        );
        image = enhance::unsharp_mask(
            &image,
            settings.sharpen_radius,
            settings.sharpen_amount,
            settings.sharpen_threshold,
        );
    }

    image = resizer.downscale(image, settings.downscale_factor());

    if settings.contrast != 1.0 {
        enhance::adjust_contrast(&mut image, settings.contrast);
    }

    if settings.saturation != 1.0 {
        enhance::adjust_saturation(&mut image, settings.saturation);
    }

    if settings.brightness != 1.0 {
        enhance::adjust_brightness(&mut image, settings.brightness);
    }

    if settings.noise_reduction > 0 {
        log::debug!("Median filter, strength {}", settings.noise_reduction);
        image = enhance::reduce_noise(&image, settings.noise_reduction);
    }

    // Last: erosion works on the final alpha, not the source alpha.
    if settings.edge_trim > 0 {
        log::debug!("Eroding alpha by {} px", settings.edge_trim);
        enhance::erode_alpha(&mut image, settings.edge_trim);
    }

    Ok(image)
}
