#[cfg(test)]
mod tests {
    use assert_fs::TempDir;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pixel_lift::{
        discover, predict_dimensions, run, Discoverer, DiscoveryOptions, ImageProcessor,
        ImageRecord, OutputFormat, ProcessingSettings, ScaleMode, WorkingSet,
    };
    use std::fs::{self, File};
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicBool;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
                255,
            ])
        })
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::write(path, png_bytes(&gradient(width, height))).unwrap();
    }

    fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn discoverer_in(root: &Path) -> Discoverer {
        Discoverer::new(DiscoveryOptions {
            temp_root: Some(root.to_path_buf()),
            ..DiscoveryOptions::default()
        })
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    fn upscale_settings(factor: u32, smoothing: f32) -> ProcessingSettings {
        ProcessingSettings {
            scale: ScaleMode::Upscale { factor, smoothing },
            ..ProcessingSettings::identity()
        }
    }

    #[test]
    fn test_predicted_dimensions_match_pipeline() {
        let cases = [
            (100, 100, upscale_settings(2, 0.9)),
            (13, 7, upscale_settings(3, 0.83)),
            (13, 7, ProcessingSettings::default()),
            (
                21,
                9,
                ProcessingSettings {
                    scale: ScaleMode::Downscale { factor: 0.8 },
                    edge_trim: 2,
                    noise_reduction: 1,
                    ..ProcessingSettings::identity()
                },
            ),
            (1, 1, upscale_settings(1, 0.8)),
        ];

        for (width, height, settings) in cases {
            let output = run(gradient(width, height), &settings).unwrap();
            assert_eq!(
                predict_dimensions(width, height, &settings),
                output.dimensions(),
                "source {}x{} with {:?}",
                width,
                height,
                settings
            );
        }
    }

    #[test]
    fn test_upscale_then_smoothing_gives_180() {
        let settings = upscale_settings(2, 0.9);
        let source = RgbaImage::from_pixel(100, 100, Rgba([40, 80, 120, 255]));
        assert_eq!(predict_dimensions(100, 100, &settings), (180, 180));
        assert_eq!(run(source, &settings).unwrap().dimensions(), (180, 180));
    }

    #[test]
    fn test_identity_settings_leave_pixels_untouched() {
        let source = RgbaImage::from_fn(17, 11, |x, y| {
            Rgba([(x * 13) as u8, (y * 29) as u8, (x * y) as u8, ((x + y) * 7) as u8])
        });
        let output = run(source.clone(), &ProcessingSettings::identity()).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_out_of_range_settings_are_rejected() {
        let mut settings = ProcessingSettings::identity();
        settings.brightness = 3.0;
        assert!(run(gradient(4, 4), &settings).is_err());
        assert!(ImageProcessor::new(settings).is_err());
    }

    #[test]
    fn test_erosion_runs_after_median_filter() {
        let mut source = RgbaImage::from_pixel(10, 10, Rgba([60, 60, 60, 255]));
        source.put_pixel(5, 5, Rgba([60, 60, 60, 0]));
        let settings = ProcessingSettings {
            noise_reduction: 1,
            edge_trim: 1,
            ..ProcessingSettings::identity()
        };

        // The median closes the pinhole first, so erosion has nothing to grow.
        let output = run(source, &settings).unwrap();
        assert!(output.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_pre_blur_changes_pixels() {
        let source = RgbaImage::from_fn(12, 12, |x, _| {
            if x < 6 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let settings = ProcessingSettings {
            blur_radius: 1.0,
            ..ProcessingSettings::identity()
        };
        let output = run(source.clone(), &settings).unwrap();
        assert_ne!(output, source);
        assert!(output.get_pixel(5, 6).0[0] > 0);
    }

    #[test]
    fn test_edge_trim_is_monotonic() {
        let source = RgbaImage::from_fn(32, 32, |x, y| {
            let dx = x as i32 - 16;
            let dy = y as i32 - 16;
            let alpha = if dx * dx + dy * dy < 144 { 255 } else { 0 };
            Rgba([255, 255, 255, alpha])
        });

        let mut previous = usize::MAX;
        for trim in 0..6 {
            let settings = ProcessingSettings {
                edge_trim: trim,
                ..ProcessingSettings::identity()
            };
            let output = run(source.clone(), &settings).unwrap();
            let opaque = output.pixels().filter(|p| p.0[3] > 0).count();
            assert!(opaque <= previous, "trim {} grew the opaque region", trim);
            previous = opaque;
        }
        assert!(previous < 144 * 3);
    }

    #[test]
    fn test_discover_is_idempotent_on_duplicates() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("a.png"), 4, 4);
        write_png(&temp.path().join("b.JPG.png"), 4, 4);
        let dir = path_str(temp.path());
        let file = path_str(&temp.path().join("a.png"));

        let once = discover(&[dir.clone()]);
        let twice = discover(&[dir.clone(), dir.clone()]);
        let overlapping = discover(&[file, dir]);

        assert_eq!(once.images.len(), 2);
        assert_eq!(once.images, twice.images);

        let mut a = overlapping.images.clone();
        let mut b = once.images.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_discover_tolerates_quotes_and_missing_paths() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("shot.png");
        write_png(&image, 3, 3);
        fs::write(temp.path().join("notes.txt"), b"hello").unwrap();

        let found = discover(&[
            format!("  \"{}\" ", image.display()),
            path_str(&temp.path().join("missing.png")),
            path_str(&temp.path().join("notes.txt")),
        ]);

        assert_eq!(names(&found.images), vec!["shot.png"]);
        assert!(found.temp_dirs.is_empty());
        assert!(found.images[0].is_absolute());
    }

    #[test]
    fn test_discover_walks_directories_recursively() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("one").join("two");
        fs::create_dir_all(&nested).unwrap();
        write_png(&temp.path().join("top.png"), 2, 2);
        write_png(&nested.join("deep.PNG"), 2, 2);
        fs::write(nested.join("skip.doc"), b"x").unwrap();

        let found = discover(&[path_str(temp.path())]);
        let mut found_names = names(&found.images);
        found_names.sort();
        assert_eq!(found_names, vec!["deep.PNG", "top.png"]);
    }

    #[test]
    fn test_zip_yields_only_images_and_one_temp_dir() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pack.zip");
        let image = png_bytes(&gradient(5, 5));
        write_zip(
            &archive,
            &[
                ("a.png", image.clone()),
                ("sub/b.png", image.clone()),
                ("c.gif.png", image),
                ("readme.txt", b"text".to_vec()),
                ("data.bin", vec![0, 1, 2]),
            ],
        );

        let found = discoverer_in(temp.path()).discover(&[path_str(&archive)]);

        assert_eq!(found.images.len(), 3);
        assert_eq!(found.temp_dirs.len(), 1);
        let temp_dir = fs::canonicalize(&found.temp_dirs[0]).unwrap();
        assert!(found.images.iter().all(|p| p.starts_with(&temp_dir)));
        assert!(found.images.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_nested_zip_inside_directory_is_expanded() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        let input = temp.path().join("input");
        fs::create_dir_all(&scratch).unwrap();
        fs::create_dir_all(&input).unwrap();

        let inner = scratch.join("inner.zip");
        write_zip(&inner, &[("inner.png", png_bytes(&gradient(3, 3)))]);
        write_zip(
            &input.join("outer.zip"),
            &[
                ("outer.png", png_bytes(&gradient(3, 3))),
                ("inner.zip", fs::read(&inner).unwrap()),
            ],
        );
        write_png(&input.join("plain.png"), 3, 3);

        let found = discoverer_in(&scratch).discover(&[path_str(&input)]);

        let mut found_names = names(&found.images);
        found_names.sort();
        assert_eq!(found_names, vec!["inner.png", "outer.png", "plain.png"]);
        assert_eq!(found.temp_dirs.len(), 2);
    }

    #[test]
    fn test_archive_depth_ceiling() {
        let temp = TempDir::new().unwrap();
        let inner = temp.path().join("inner.zip");
        write_zip(&inner, &[("deep.png", png_bytes(&gradient(2, 2)))]);
        let outer = temp.path().join("outer.zip");
        write_zip(
            &outer,
            &[
                ("shallow.png", png_bytes(&gradient(2, 2))),
                ("inner.zip", fs::read(&inner).unwrap()),
            ],
        );

        let discoverer = Discoverer::new(DiscoveryOptions {
            max_archive_depth: 1,
            temp_root: Some(temp.path().to_path_buf()),
            ..DiscoveryOptions::default()
        });
        let found = discoverer.discover(&[path_str(&outer)]);

        assert_eq!(names(&found.images), vec!["shallow.png"]);
        assert_eq!(found.temp_dirs.len(), 1);
    }

    #[test]
    fn test_invalid_zip_is_skipped_without_temp_dir() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let bogus = temp.path().join("broken.zip");
        fs::write(&bogus, b"definitely not an archive").unwrap();

        let found = discoverer_in(&scratch).discover(&[path_str(&bogus)]);

        assert!(found.images.is_empty());
        assert!(found.temp_dirs.is_empty());
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let source = RgbaImage::from_fn(9, 6, |x, y| Rgba([x as u8 * 20, y as u8 * 30, 7, (x * y) as u8]));
        let settings = ProcessingSettings::identity();
        let encoded = pixel_lift::encode(&source, &settings).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().into_rgba8();
        assert_eq!(decoded, source);
    }

    #[test]
    fn test_lossy_round_trips_keep_dimensions() {
        let source = gradient(37, 21);
        for format in [OutputFormat::Jpeg, OutputFormat::WebP] {
            let settings = ProcessingSettings {
                output_format: format,
                jpeg_quality: 80,
                ..ProcessingSettings::identity()
            };
            let encoded = pixel_lift::encode(&source, &settings).unwrap();
            let decoded = image::load_from_memory(&encoded).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (37, 21), "{:?}", format);
        }
    }

    #[test]
    fn test_jpeg_flattens_transparency_onto_white() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let settings = ProcessingSettings {
            output_format: OutputFormat::Jpeg,
            jpeg_quality: 95,
            ..ProcessingSettings::identity()
        };
        let encoded = pixel_lift::encode(&source, &settings).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().into_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn test_estimate_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let processed = gradient(20, 20);
        for format in [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::WebP] {
            let settings = ProcessingSettings {
                output_format: format,
                ..ProcessingSettings::identity()
            };
            assert!(pixel_lift::estimate_bytes(&processed, &settings).unwrap() > 0);
        }
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_batch_suffixes_colliding_names() {
        let temp = TempDir::new().unwrap();
        let left = temp.path().join("left");
        let right = temp.path().join("right");
        fs::create_dir_all(&left).unwrap();
        fs::create_dir_all(&right).unwrap();
        write_png(&left.join("photo.png"), 6, 4);
        write_png(&right.join("photo.png"), 6, 4);

        let records = vec![
            ImageRecord::probe(&left.join("photo.png")).unwrap(),
            ImageRecord::probe(&right.join("photo.png")).unwrap(),
        ];
        let processor = ImageProcessor::new(upscale_settings(2, 1.0)).unwrap();
        let output_dir = temp.path().join("out");
        let cancel = AtomicBool::new(false);
        let mut progress = Vec::new();

        let stats = processor
            .export_batch(&records, &output_dir, &cancel, |done, total| progress.push((done, total)))
            .unwrap();

        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 0);
        assert!(!stats.cancelled);
        assert!(output_dir.join("photo.png").exists());
        assert!(output_dir.join("photo_1.png").exists());
        assert_eq!(progress, vec![(0, 2), (1, 2), (2, 2)]);

        let saved = image::open(output_dir.join("photo_1.png")).unwrap();
        assert_eq!((saved.width(), saved.height()), (12, 8));
    }

    #[test]
    fn test_export_batch_counts_failures_and_continues() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.png");
        let bad = temp.path().join("bad.png");
        write_png(&good, 4, 4);
        fs::write(&bad, b"not really a png").unwrap();

        let good_record = ImageRecord::probe(&good).unwrap();
        let bad_record = ImageRecord {
            path: bad.clone(),
            name: "bad.png".to_string(),
            ..good_record.clone()
        };

        let processor = ImageProcessor::new(ProcessingSettings::identity()).unwrap();
        let cancel = AtomicBool::new(false);
        let stats = processor
            .export_batch(&[bad_record, good_record], &temp.path().join("out"), &cancel, |_, _| {})
            .unwrap();

        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors[0].0, bad);
    }

    #[test]
    fn test_export_batch_honours_cancellation() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.png");
        write_png(&source, 4, 4);
        let records = vec![ImageRecord::probe(&source).unwrap()];

        let processor = ImageProcessor::new(ProcessingSettings::identity()).unwrap();
        let cancel = AtomicBool::new(true);
        let output_dir = temp.path().join("out");
        let stats = processor
            .export_batch(&records, &output_dir, &cancel, |_, _| {})
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.succeeded, 0);
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_probe_reads_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("probe.png");
        write_png(&path, 12, 5);

        let record = ImageRecord::probe(&path).unwrap();
        assert_eq!((record.width, record.height), (12, 5));
        assert_eq!(record.name, "probe.png");
        assert_eq!(record.color, image::ColorType::Rgba8);
        assert_eq!(record.file_size, fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_working_set_owns_and_releases_temp_dirs() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let archive = temp.path().join("set.zip");
        write_zip(
            &archive,
            &[
                ("one.png", png_bytes(&gradient(3, 2))),
                ("broken.png", b"garbage".to_vec()),
            ],
        );
        write_png(&temp.path().join("two.png"), 2, 3);

        let mut set = WorkingSet::new(DiscoveryOptions {
            temp_root: Some(scratch.clone()),
            ..DiscoveryOptions::default()
        });
        let added = set.add_paths(&[path_str(&archive), path_str(&temp.path().join("two.png"))]);
        assert_eq!(added, 2);
        assert_eq!(set.add_paths(&[path_str(&temp.path().join("two.png"))]), 0);

        let extracted = set.temp_dirs().to_vec();
        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].exists());

        set.clear();
        assert!(set.is_empty());
        assert!(!extracted[0].exists());
    }

    #[test]
    fn test_dropping_working_set_removes_extractions() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let archive = temp.path().join("set.zip");
        write_zip(&archive, &[("one.png", png_bytes(&gradient(3, 2)))]);

        let extracted = {
            let mut set = WorkingSet::new(DiscoveryOptions {
                temp_root: Some(scratch.clone()),
                ..DiscoveryOptions::default()
            });
            assert_eq!(set.add_paths(&[path_str(&archive)]), 1);
            assert!(set.records()[0].path.exists());
            set.temp_dirs().to_vec()
        };

        assert_eq!(extracted.len(), 1);
        assert!(!extracted[0].exists());
        assert!(archive.exists());
    }

    #[test]
    fn test_preview_reports_full_size_prediction() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wide.png");
        write_png(&path, 1200, 10);

        let settings = upscale_settings(4, 0.9);
        let processor = ImageProcessor::new(settings).unwrap();
        let preview = processor.preview(&path).unwrap();

        assert_eq!(preview.original, (1200, 10));
        assert_eq!(preview.output, (4320, 36));
        assert!(preview.image.width() <= pixel_lift::PREVIEW_MAX_SIDE);
        assert!(preview.estimated_bytes > 0);
    }

    #[test]
    fn test_process_file_saves_predicted_size() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("small.png");
        write_png(&input, 10, 6);
        let output = temp.path().join("nested").join("small.jpg");

        let settings = ProcessingSettings {
            output_format: OutputFormat::Jpeg,
            ..upscale_settings(3, 0.9)
        };
        let processor = ImageProcessor::new(settings).unwrap();
        let result = processor.process_file(&input, &output).unwrap();

        assert_eq!(result.original, (10, 6));
        assert_eq!(result.output, processor.predict(10, 6));
        assert_eq!(result.bytes_written, fs::metadata(&output).unwrap().len());
        let saved = image::open(&output).unwrap();
        assert_eq!((saved.width(), saved.height()), (27, 16));
    }

    #[test]
    fn test_invalid_file() {
        let temp = TempDir::new().unwrap();
        let processor = ImageProcessor::new(ProcessingSettings::default()).unwrap();
        let output = temp.path().join("output.png");
        let result = processor.process_file(Path::new("nonexistent.jpg"), &output);
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
