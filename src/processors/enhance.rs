// pixel-lift/src/processors/enhance.rs
//! Per-pixel and neighbourhood filters used by the pipeline.
//!
//! Tone adjustments (contrast, saturation, brightness) blend each pixel with
//! a degenerate image and touch only the colour channels. Blur and median
//! run on all four channels.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::filter::{gaussian_blur_f32, median_filter};

/// ITU-R 601 luma, integer form.
fn luma(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Blend from `base` towards `value` by `factor`; factor 1 returns `value`.
fn blend(base: f32, value: f32, factor: f32) -> u8 {
    clamp_u8(base + factor * (value - base))
}

pub fn gaussian_blur(image: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 {
        return image.clone();
    }
    gaussian_blur_f32(image, radius)
}

/// `original + (original - blurred) * amount / 100` on the colour channels,
/// applied only where `|original - blurred|` exceeds `threshold`.
pub fn unsharp_mask(image: &RgbaImage, radius: f32, amount: u32, threshold: u8) -> RgbaImage {
    if amount == 0 || radius <= 0.0 {
        return image.clone();
    }

    let blurred = gaussian_blur_f32(image, radius);
    let gain = amount as f32 / 100.0;
    let threshold = threshold as i16;

    let mut out = image.clone();
    for (dst, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let orig = dst.0[c] as i16;
            let diff = orig - soft.0[c] as i16;
            if diff.abs() > threshold {
                dst.0[c] = clamp_u8(orig as f32 + diff as f32 * gain);
            }
        }
    }
    out
}

pub fn adjust_contrast(image: &mut RgbaImage, factor: f32) {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return;
    }
    let sum: u64 = image.pixels().map(|p| luma(p) as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5).floor() as f32;

    for pixel in image.pixels_mut() {
        for c in 0..3 {
            pixel.0[c] = blend(mean, pixel.0[c] as f32, factor);
        }
    }
}

pub fn adjust_saturation(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let gray = luma(pixel) as f32;
        for c in 0..3 {
            pixel.0[c] = blend(gray, pixel.0[c] as f32, factor);
        }
    }
}

pub fn adjust_brightness(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for c in 0..3 {
            pixel.0[c] = clamp_u8(pixel.0[c] as f32 * factor);
        }
    }
}

/// Median filter with a `(2 * strength + 1)` square kernel, per channel.
pub fn reduce_noise(image: &RgbaImage, strength: u8) -> RgbaImage {
    if strength == 0 {
        return image.clone();
    }
    median_filter(image, strength as u32, strength as u32)
}

/// Applies a 3x3 minimum filter to the alpha channel `passes` times.
/// Colour channels are left as they are.
pub fn erode_alpha(image: &mut RgbaImage, passes: u32) {
    if passes == 0 {
        return;
    }

    let (width, height) = image.dimensions();
    let mut alpha = GrayImage::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y).0[3]]));
    for _ in 0..passes {
        alpha = min_filter_3x3(&alpha);
    }

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        pixel.0[3] = alpha.get_pixel(x, y).0[0];
    }
}

/// Separable 3x3 minimum with edge replication.
fn min_filter_3x3(src: &GrayImage) -> GrayImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }

    let horizontal = GrayImage::from_fn(width, height, |x, y| {
        let left = x.saturating_sub(1);
        let right = (x + 1).min(width - 1);
        let v = src.get_pixel(left, y).0[0]
            .min(src.get_pixel(x, y).0[0])
            .min(src.get_pixel(right, y).0[0]);
        Luma([v])
    });

    GrayImage::from_fn(width, height, |x, y| {
        let up = y.saturating_sub(1);
        let down = (y + 1).min(height - 1);
        let v = horizontal.get_pixel(x, up).0[0]
            .min(horizontal.get_pixel(x, y).0[0])
            .min(horizontal.get_pixel(x, down).0[0]);
        Luma([v])
    })
}
