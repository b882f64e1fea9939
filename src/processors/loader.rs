// pixel-lift/src/processors/loader.rs
use crate::core::{PixelLiftError, Result};
use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use std::path::Path;

/// Largest width or height a source image may declare.
pub const MAX_DIMENSION: u32 = 100_000;

/// Decodes source files into the canonical RGBA8 buffer.
#[derive(Clone, Default)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                PixelLiftError::ProcessingError(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let (width, height) = image.dimensions();
        check_dimensions(width, height)?;

        log::info!(
            "Loaded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }

    /// Decodes and converts to RGBA8 in one step.
    pub fn load_rgba(&self, path: &Path) -> Result<RgbaImage> {
        Ok(self.load(path)?.into_rgba8())
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PixelLiftError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(PixelLiftError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PixelLiftError::MemoryLimitExceeded(format!(
            "Image dimensions {}x{} exceed maximum {}x{}",
            width, height, MAX_DIMENSION, MAX_DIMENSION
        )));
    }
    Ok(())
}
