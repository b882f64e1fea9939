// pixel-lift/src/core/mod.rs
pub mod processor;
pub mod session;

use image::{ColorType, ImageReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAX_UPSCALE_FACTOR: u32 = 8;
pub const MIN_SHRINK_FACTOR: f32 = 0.80;
pub const MAX_BLUR_RADIUS: f32 = 3.0;
pub const MAX_SHARPEN_RADIUS: f32 = 5.0;
pub const MAX_SHARPEN_AMOUNT: u32 = 300;
pub const MAX_SHARPEN_THRESHOLD: u8 = 10;
pub const MAX_ENHANCE_FACTOR: f32 = 2.0;
pub const MAX_NOISE_REDUCTION: u8 = 5;
pub const MAX_EDGE_TRIM: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }
}

/// Which resampling operation dominates a run.
///
/// `Upscale` magnifies by an integer factor and then shrinks slightly by
/// `smoothing` to soften stair-stepping. `Downscale` skips magnification and
/// only shrinks by `factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    Upscale { factor: u32, smoothing: f32 },
    Downscale { factor: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingSettings {
    pub scale: ScaleMode,
    pub blur_radius: f32,
    pub sharpen_radius: f32,
    pub sharpen_amount: u32,
    pub sharpen_threshold: u8,
    pub contrast: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub noise_reduction: u8,
    pub edge_trim: u32,
    pub output_format: OutputFormat,
    pub jpeg_quality: u8,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            scale: ScaleMode::Upscale {
                factor: 4,
                smoothing: 0.97,
            },
            blur_radius: 0.6,
            sharpen_radius: 1.2,
            sharpen_amount: 120,
            sharpen_threshold: 2,
            contrast: 1.0,
            saturation: 1.0,
            brightness: 1.0,
            noise_reduction: 0,
            edge_trim: 0,
            output_format: OutputFormat::Png,
            jpeg_quality: 95,
        }
    }
}

impl ProcessingSettings {
    /// Settings under which every stage is a no-op.
    pub fn identity() -> Self {
        Self {
            scale: ScaleMode::Upscale {
                factor: 1,
                smoothing: 1.0,
            },
            blur_radius: 0.0,
            sharpen_amount: 0,
            ..Self::default()
        }
    }

    pub fn upscale_factor(&self) -> u32 {
        match self.scale {
            ScaleMode::Upscale { factor, .. } => factor,
            ScaleMode::Downscale { .. } => 1,
        }
    }

    pub fn downscale_factor(&self) -> f32 {
        match self.scale {
            ScaleMode::Upscale { smoothing, .. } => smoothing,
            ScaleMode::Downscale { factor } => factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.scale {
            ScaleMode::Upscale { factor, smoothing } => {
                if !(1..=MAX_UPSCALE_FACTOR).contains(&factor) {
                    return Err(PixelLiftError::InvalidParameter(format!(
                        "Upscale factor must be between 1 and {}, got {}",
                        MAX_UPSCALE_FACTOR, factor
                    )));
                }
                check_range("Smoothing factor", smoothing, MIN_SHRINK_FACTOR, 1.0)?;
            }
            ScaleMode::Downscale { factor } => {
                check_range("Downscale factor", factor, MIN_SHRINK_FACTOR, 1.0)?;
            }
        }

        check_range("Blur radius", self.blur_radius, 0.0, MAX_BLUR_RADIUS)?;
        check_range("Sharpen radius", self.sharpen_radius, 0.0, MAX_SHARPEN_RADIUS)?;
        check_range("Contrast", self.contrast, 0.0, MAX_ENHANCE_FACTOR)?;
        check_range("Saturation", self.saturation, 0.0, MAX_ENHANCE_FACTOR)?;
        check_range("Brightness", self.brightness, 0.0, MAX_ENHANCE_FACTOR)?;

        if self.sharpen_amount > MAX_SHARPEN_AMOUNT {
            return Err(PixelLiftError::InvalidParameter(format!(
                "Sharpen amount must be at most {}",
                MAX_SHARPEN_AMOUNT
            )));
        }

        if self.sharpen_threshold > MAX_SHARPEN_THRESHOLD {
            return Err(PixelLiftError::InvalidParameter(format!(
                "Sharpen threshold must be at most {}",
                MAX_SHARPEN_THRESHOLD
            )));
        }

        if self.noise_reduction > MAX_NOISE_REDUCTION {
            return Err(PixelLiftError::InvalidParameter(format!(
                "Noise reduction must be at most {}",
                MAX_NOISE_REDUCTION
            )));
        }

        if self.edge_trim > MAX_EDGE_TRIM {
            return Err(PixelLiftError::InvalidParameter(format!(
                "Edge trim must be at most {}",
                MAX_EDGE_TRIM
            )));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(PixelLiftError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }

    /// Copy with every field forced into its valid range. NaN falls back to
    /// the field's identity value.
    pub fn clamped(&self) -> Self {
        let scale = match self.scale {
            ScaleMode::Upscale { factor, smoothing } => ScaleMode::Upscale {
                factor: factor.clamp(1, MAX_UPSCALE_FACTOR),
                smoothing: clamp_f32(smoothing, MIN_SHRINK_FACTOR, 1.0, 1.0),
            },
            ScaleMode::Downscale { factor } => ScaleMode::Downscale {
                factor: clamp_f32(factor, MIN_SHRINK_FACTOR, 1.0, 1.0),
            },
        };

        Self {
            scale,
            blur_radius: clamp_f32(self.blur_radius, 0.0, MAX_BLUR_RADIUS, 0.0),
            sharpen_radius: clamp_f32(self.sharpen_radius, 0.0, MAX_SHARPEN_RADIUS, 0.0),
            sharpen_amount: self.sharpen_amount.min(MAX_SHARPEN_AMOUNT),
            sharpen_threshold: self.sharpen_threshold.min(MAX_SHARPEN_THRESHOLD),
            contrast: clamp_f32(self.contrast, 0.0, MAX_ENHANCE_FACTOR, 1.0),
            saturation: clamp_f32(self.saturation, 0.0, MAX_ENHANCE_FACTOR, 1.0),
            brightness: clamp_f32(self.brightness, 0.0, MAX_ENHANCE_FACTOR, 1.0),
            noise_reduction: self.noise_reduction.min(MAX_NOISE_REDUCTION),
            edge_trim: self.edge_trim.min(MAX_EDGE_TRIM),
            output_format: self.output_format,
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(PixelLiftError::InvalidParameter(format!(
            "{} must be between {:.2} and {:.2}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

fn clamp_f32(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Header-level facts about one discovered image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub name: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
}

impl ImageRecord {
    /// Reads dimensions and color type from the header without decoding pixels.
    pub fn probe(path: &Path) -> Result<Self> {
        let file_size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = image::ImageDecoder::dimensions(&decoder);
        let color = image::ImageDecoder::color_type(&decoder);

        Ok(Self {
            path: path.to_path_buf(),
            name,
            file_size,
            width,
            height,
            color,
        })
    }

    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub errors: Vec<(PathBuf, String)>,
}

#[derive(Error, Debug)]
pub enum PixelLiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Encode error: {0}")]
    EncodeError(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, PixelLiftError>;
