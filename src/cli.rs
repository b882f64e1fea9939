// pixel-lift/src/cli.rs
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixel_lift::{OutputFormat, ProcessingSettings, ScaleMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixel-lift", version, about = "Upscale and enhance images in bulk")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the images found under files, folders and ZIP archives
    Scan {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Show the output dimensions for a source size
    Predict {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Process a single image
    Process {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Process everything found under the given paths into a folder
    Export {
        #[arg(required = true)]
        paths: Vec<String>,
        /// Destination folder; outputs land in <output>/upscaled_output
        #[arg(short, long)]
        output: PathBuf,
        /// Maximum ZIP nesting depth
        #[arg(long, default_value_t = 8)]
        max_archive_depth: usize,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Show header information for an image
    Info { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    Upscale,
    Downscale,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Png,
    Jpeg,
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => OutputFormat::Png,
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Webp => OutputFormat::WebP,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    #[arg(long, value_enum, default_value_t = Mode::Upscale)]
    pub mode: Mode,
    /// Integer magnification (upscale mode)
    #[arg(long, default_value_t = 4)]
    pub upscale: u32,
    /// Shrink applied after sharpening (0.80-1.00)
    #[arg(long, default_value_t = 0.97)]
    pub downscale: f32,
    #[arg(long, default_value_t = 0.6)]
    pub blur: f32,
    #[arg(long, default_value_t = 1.2)]
    pub sharpen_radius: f32,
    #[arg(long, default_value_t = 120)]
    pub sharpen_amount: u32,
    #[arg(long, default_value_t = 2)]
    pub sharpen_threshold: u8,
    #[arg(long, default_value_t = 1.0)]
    pub contrast: f32,
    #[arg(long, default_value_t = 1.0)]
    pub saturation: f32,
    #[arg(long, default_value_t = 1.0)]
    pub brightness: f32,
    #[arg(long, default_value_t = 0)]
    pub noise: u8,
    #[arg(long, default_value_t = 0)]
    pub edge_trim: u32,
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    pub format: Format,
    /// JPEG/WebP quality (1-100)
    #[arg(short, long, default_value_t = 95)]
    pub quality: u8,
}

impl From<&SettingsArgs> for ProcessingSettings {
    fn from(args: &SettingsArgs) -> Self {
        let scale = match args.mode {
            Mode::Upscale => ScaleMode::Upscale {
                factor: args.upscale,
                smoothing: args.downscale,
            },
            Mode::Downscale => ScaleMode::Downscale {
                factor: args.downscale,
            },
        };

        ProcessingSettings {
            scale,
            blur_radius: args.blur,
            sharpen_radius: args.sharpen_radius,
            sharpen_amount: args.sharpen_amount,
            sharpen_threshold: args.sharpen_threshold,
            contrast: args.contrast,
            saturation: args.saturation,
            brightness: args.brightness,
            noise_reduction: args.noise,
            edge_trim: args.edge_trim,
            output_format: args.format.into(),
            jpeg_quality: args.quality,
        }
    }
}
