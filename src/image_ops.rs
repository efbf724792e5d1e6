//! PNG discovery, random selection and splash screen rendering.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use rand::Rng;
use rand::seq::SliceRandom;
use walkdir::WalkDir;

/// Centered crop region in source pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Collect every PNG file under `root`, descending into subfolders when `recursive` is set.
pub fn list_png_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Only a failure on the root itself aborts the scan.
            Err(err) if err.depth() == 0 => {
                return Err(err).with_context(|| format!("failed to scan {}", root.display()));
            }
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_png(entry.path()) {
            images.push(entry.path().to_path_buf());
        }
    }

    images.sort();
    Ok(images)
}

/// Return true when the file extension is `png`, ignoring case.
pub fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Pick one file uniformly at random.
pub fn pick_random<R: Rng + ?Sized>(files: &[PathBuf], rng: &mut R) -> Result<PathBuf> {
    files
        .choose(rng)
        .cloned()
        .ok_or_else(|| anyhow!("no PNG files found"))
}

/// Compute the largest centered region of a `src_w x src_h` image that has
/// the aspect ratio of `dst_w x dst_h`.
pub fn crop_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropRect {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (dw, dh) = (u64::from(dst_w), u64::from(dst_h));

    // Compare sw/sh against dw/dh without going through floats.
    if sw * dh > dw * sh {
        // Wider than the target: trim left and right.
        let width = (sh * dw / dh).clamp(1, sw) as u32;
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        // Taller than the target: trim top and bottom.
        let height = (sw * dh / dw).clamp(1, sh) as u32;
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Crop `img` to the target aspect ratio and resample it to exactly `width x height`.
pub fn crop_to_aspect_ratio(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();
    let rect = crop_rect(src_w, src_h, width, height);
    let cropped = imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image();
    imageops::resize(&cropped, width, height, FilterType::CatmullRom)
}

/// Load `src`, crop and resize it, then write it to `dest` as PNG.
pub fn resize_png_file(src: &Path, dest: &Path, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(anyhow!("target size must be non-zero, got {width}x{height}"));
    }

    let img = image::open(src).with_context(|| format!("failed to open {}", src.display()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(anyhow!("image has no pixels: {}", src.display()));
    }
    let rendered = crop_to_aspect_ratio(&img, width, height);

    // Write next to the target first so the game never sees a partial file.
    let staging = staging_path(dest);
    let written = rendered
        .save_with_format(&staging, ImageFormat::Png)
        .with_context(|| format!("failed to write {}", staging.display()))
        .and_then(|()| {
            fs::rename(&staging, dest)
                .with_context(|| format!("failed to replace {}", dest.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&staging);
    }
    written
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dest.with_file_name(name)
}
