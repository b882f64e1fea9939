// pixel-lift/src/core/processor.rs
use super::{ExportStats, ImageRecord, ProcessingSettings, Result};
use crate::processors::{pipeline, predict_dimensions, Compressor, Loader, Resizer};
use crate::utils::{sanitize_filename, unique_output_path};
use image::RgbaImage;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Largest side of the upscaled intermediate a preview will build.
pub const PREVIEW_MAX_SIDE: u32 = 2048;

#[derive(Debug, Clone)]
pub struct Preview {
    pub image: RgbaImage,
    pub original: (u32, u32),
    pub output: (u32, u32),
    pub estimated_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessedFile {
    pub original: (u32, u32),
    pub output: (u32, u32),
    pub bytes_written: u64,
}

/// Decode, pipeline and encode bound to one settings value.
pub struct ImageProcessor {
    settings: ProcessingSettings,
    loader: Loader,
    compressor: Compressor,
}

impl ImageProcessor {
    pub fn new(settings: ProcessingSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            compressor: Compressor::from_settings(&settings),
            settings,
            loader: Loader::new(),
        })
    }

    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    pub fn run(&self, image: RgbaImage) -> Result<RgbaImage> {
        pipeline::run(image, &self.settings)
    }

    pub fn predict(&self, width: u32, height: u32) -> (u32, u32) {
        predict_dimensions(width, height, &self.settings)
    }

    pub fn estimate_bytes(&self, processed: &RgbaImage) -> Result<u64> {
        self.compressor.estimate_size(processed)
    }

    /// Loads, processes and saves one file with a single decode and run.
    pub fn process_file(&self, input: &Path, destination: &Path) -> Result<ProcessedFile> {
        let image = self.loader.load_rgba(input)?;
        let original = image.dimensions();
        let processed = self.run(image)?;
        let bytes_written = self.save(&processed, destination)?;

        Ok(ProcessedFile {
            original,
            output: processed.dimensions(),
            bytes_written,
        })
    }

    pub fn save(&self, processed: &RgbaImage, destination: &Path) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.compressor.save(processed, destination)
    }

    /// Processes a reduced copy for display. Output dimensions and the size
    /// estimate describe the reduced run; `output` is the full-size
    /// prediction.
    pub fn preview(&self, input: &Path) -> Result<Preview> {
        let image = self.loader.load_rgba(input)?;
        let original = image.dimensions();

        let reduced = Resizer::new().fit_within(
            image,
            self.settings.upscale_factor(),
            PREVIEW_MAX_SIDE,
        );
        let processed = self.run(reduced)?;
        let estimated_bytes = self.estimate_bytes(&processed)?;

        Ok(Preview {
            output: self.predict(original.0, original.1),
            image: processed,
            original,
            estimated_bytes,
        })
    }

    /// Processes `records` one after another into `output_dir`.
    ///
    /// Failures are counted and the batch moves on. `cancel` is checked
    /// before each image; an image already started always completes.
    /// `on_progress` receives `(done, total)` before each image and once at
    /// the end.
    pub fn export_batch<F>(
        &self,
        records: &[ImageRecord],
        output_dir: &Path,
        cancel: &AtomicBool,
        mut on_progress: F,
    ) -> Result<ExportStats>
    where
        F: FnMut(usize, usize),
    {
        std::fs::create_dir_all(output_dir)?;

        let total = records.len();
        let extension = self.settings.output_format.extension();
        let mut used_names = HashSet::new();
        let mut stats = ExportStats::default();

        for (index, record) in records.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Export cancelled after {} images", index);
                stats.cancelled = true;
                return Ok(stats);
            }

            on_progress(index, total);

            let stem = sanitize_filename(record.stem());
            let result = self
                .loader
                .load_rgba(&record.path)
                .and_then(|image| self.run(image))
                .and_then(|processed| {
                    let destination =
                        unique_output_path(output_dir, &stem, extension, &mut used_names);
                    self.compressor.save(&processed, &destination)
                });

            match result {
                Ok(_) => stats.succeeded += 1,
                Err(e) => {
                    log::warn!("Failed to export {}: {}", record.path.display(), e);
                    stats.failed += 1;
                    stats.errors.push((record.path.clone(), e.to_string()));
                }
            }
        }

        on_progress(total, total);
        log::info!(
            "Exported {} images to {} ({} failed)",
            stats.succeeded,
            output_dir.display(),
            stats.failed
        );

        Ok(stats)
    }
}
