mod cli;

use crate::cli::{Cli, Commands, SettingsArgs};
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use pixel_lift::{
    format_file_size, DiscoveryOptions, ImageProcessor, ImageRecord, ProcessingSettings,
    WorkingSet,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Scan { paths } => process_scan(&paths),
        Commands::Predict {
            width,
            height,
            settings,
        } => process_predict(width, height, &settings),
        Commands::Process {
            input,
            output,
            settings,
        } => process_single(&input, &output, &settings),
        Commands::Export {
            paths,
            output,
            max_archive_depth,
            settings,
        } => process_export(&paths, &output, max_archive_depth, &settings),
        Commands::Info { input } => process_info(&input),
    }
}

fn build_settings(args: &SettingsArgs) -> anyhow::Result<ProcessingSettings> {
    let settings = ProcessingSettings::from(args);
    settings.validate().context("invalid processing settings")?;
    Ok(settings)
}

fn process_scan(paths: &[String]) -> anyhow::Result<()> {
    let mut working_set = WorkingSet::default();
    working_set.add_paths(paths);

    for record in working_set.records() {
        print_record_line(record);
    }
    println!(
        "{} images  |  {} total",
        working_set.len(),
        format_file_size(working_set.total_size())
    );

    Ok(())
}

fn process_predict(width: u32, height: u32, args: &SettingsArgs) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(build_settings(args)?)?;
    let (out_w, out_h) = processor.predict(width, height);
    println!("{}x{} -> {}x{}", width, height, out_w, out_h);
    Ok(())
}

fn process_single(input: &Path, output: &Path, args: &SettingsArgs) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(build_settings(args)?)?;

    let result = processor
        .process_file(input, output)
        .with_context(|| format!("failed to process {}", input.display()))?;

    println!(
        "Original: {}x{}  ->  Output: {}x{}",
        result.original.0, result.original.1, result.output.0, result.output.1
    );
    println!(
        "Saved image to: {} ({})",
        output.display(),
        format_file_size(result.bytes_written)
    );
    Ok(())
}

fn process_export(
    paths: &[String],
    output: &Path,
    max_archive_depth: usize,
    args: &SettingsArgs,
) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(build_settings(args)?)?;

    let mut working_set = WorkingSet::new(DiscoveryOptions {
        max_archive_depth,
        ..DiscoveryOptions::default()
    });
    if working_set.add_paths(paths) == 0 {
        log::warn!("No images found");
        return Ok(());
    }

    let output_dir: PathBuf = output.join("upscaled_output");
    let pb = create_progress_bar(working_set.len());
    let cancel = AtomicBool::new(false);

    let stats = processor.export_batch(working_set.records(), &output_dir, &cancel, |done, _| {
        pb.set_position(done as u64)
    })?;

    pb.finish_and_clear();

    if stats.failed > 0 {
        println!(
            "Exported {} image(s), {} failed, to: {}",
            stats.succeeded,
            stats.failed,
            output_dir.display()
        );
        for (path, error) in &stats.errors {
            println!("  {}: {}", path.display(), error);
        }
    } else {
        println!(
            "Successfully exported {} image(s) to: {}",
            stats.succeeded,
            output_dir.display()
        );
    }

    Ok(())
}

fn process_info(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("File does not exist: {}", input.display());
    }

    let record = ImageRecord::probe(input)?;
    let aspect_ratio = if record.height == 0 {
        0.0
    } else {
        record.width as f32 / record.height as f32
    };

    println!("=== Image Information ===");
    println!("File: {}", record.path.display());
    println!("Size: {}", format_file_size(record.file_size));
    println!("Dimensions: {} x {} pixels", record.width, record.height);
    println!("Aspect Ratio: {:.2}:1", aspect_ratio);
    println!("Color: {:?}", record.color);

    Ok(())
}

fn print_record_line(record: &ImageRecord) {
    println!(
        "{:<40} {:>6}x{:<6} {:>10}",
        record.name,
        record.width,
        record.height,
        format_file_size(record.file_size)
    );
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
