// pixel-lift/src/processors/compressor.rs
use crate::core::{OutputFormat, PixelLiftError, ProcessingSettings, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// How much work the encoder may spend.
///
/// Exports favour write speed for PNG and quality for WebP; estimates use a
/// middle PNG effort so the byte count is closer to what a typical tool
/// would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effort {
    Export,
    Estimate,
}

pub struct Compressor {
    format: OutputFormat,
    quality: u8,
}

impl Compressor {
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_settings(settings: &ProcessingSettings) -> Self {
        Self::new(settings.output_format, settings.jpeg_quality)
    }

    pub fn encode(&self, image: &RgbaImage, effort: Effort) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} as {:?} (quality {}, {:?})",
            image.width(),
            image.height(),
            self.format,
            self.quality,
            effort
        );

        match self.format {
            OutputFormat::Jpeg => self.encode_jpeg(image),
            OutputFormat::Png => self.encode_png(image, effort),
            OutputFormat::WebP => self.encode_webp(image, effort),
        }
    }

    pub fn save(&self, image: &RgbaImage, path: &Path) -> Result<u64> {
        let data = self.encode(image, Effort::Export)?;
        std::fs::write(path, &data)?;
        log::info!("Saved image: {} ({} bytes)", path.display(), data.len());
        Ok(data.len() as u64)
    }

    /// Byte length of a trial encode. Nothing is written.
    pub fn estimate_size(&self, image: &RgbaImage) -> Result<u64> {
        Ok(self.encode(image, Effort::Estimate)?.len() as u64)
    }

    fn encode_jpeg(&self, image: &RgbaImage) -> Result<Vec<u8>> {
        let rgb = flatten_on_white(image);
        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, self.quality).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(buffer.into_inner())
    }

    fn encode_png(&self, image: &RgbaImage, effort: Effort) -> Result<Vec<u8>> {
        let compression = match effort {
            Effort::Export => CompressionType::Fast,
            Effort::Estimate => CompressionType::Default,
        };

        let mut buffer = Cursor::new(Vec::new());
        PngEncoder::new_with_quality(&mut buffer, compression, PngFilter::Adaptive).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(buffer.into_inner())
    }

    fn encode_webp(&self, image: &RgbaImage, effort: Effort) -> Result<Vec<u8>> {
        let encoder = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height());

        let mut config = webp::WebPConfig::new().map_err(|_| {
            PixelLiftError::EncodeError("failed to create WebP config".to_string())
        })?;
        config.quality = self.quality as f32;
        config.method = match effort {
            Effort::Export => 4,
            Effort::Estimate => 2,
        };

        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| PixelLiftError::EncodeError(format!("WebP encode failed: {:?}", e)))?;

        Ok(memory.to_vec())
    }
}

/// Composites RGBA over opaque white.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = a as u32;
        let mix = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([mix(r), mix(g), mix(b)])
    })
}
