mod core;
mod processors;
mod utils;

pub use crate::core::processor::{ImageProcessor, Preview, ProcessedFile, PREVIEW_MAX_SIDE};
pub use crate::core::session::WorkingSet;
pub use crate::core::{
    ExportStats, ImageRecord, OutputFormat, PixelLiftError,
    ProcessingSettings, Result, ScaleMode,
};
pub use processors::{
    cleanup_temp_dirs, discover, enhance, flatten_on_white, predict_dimensions, Compressor,
    Discoverer, Discovery, DiscoveryOptions, Effort, Loader, Resizer,
};
pub use utils::{
    clean_path_arg, format_file_size, is_supported_format, is_zip_extension, unique_output_path,
    SUPPORTED_EXTENSIONS,
};

/// Applies the full stage sequence to `image`.
pub fn run(image: RgbaImage, settings: &ProcessingSettings) -> Result<RgbaImage> {
    processors::pipeline::run(image, settings)
}

/// Trial-encodes an already processed buffer and returns its byte length.
pub fn estimate_bytes(processed: &RgbaImage, settings: &ProcessingSettings) -> Result<u64> {
    Compressor::from_settings(settings).estimate_size(processed)
}

/// Encodes a processed buffer the way an export would.
pub fn encode(processed: &RgbaImage, settings: &ProcessingSettings) -> Result<Vec<u8>> {
    Compressor::from_settings(settings).encode(processed, Effort::Export)
}

pub fn save(
    processed: &RgbaImage,
    settings: &ProcessingSettings,
    destination: &std::path::Path,
) -> Result<u64> {
    Compressor::from_settings(settings).save(processed, destination)
}

pub mod prelude {
    pub use crate::{
        discover, predict_dimensions, run, Compressor, ImageProcessor, Loader, OutputFormat,
        ProcessingSettings, ScaleMode, WorkingSet,
    };
}

// Re-export commonly used types
pub use image::{DynamicImage, RgbaImage};
