//! PNG / JPEG imagery georeferenced by an ESRI world file sidecar.

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{RasterError, Result};
use crate::transform::GeoTransform;
use crate::types::{Raster, SampleType};

/// Read an image file and its world file (if one exists next to it).
pub fn read_image_raster(path: &Path) -> Result<Raster> {
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => RasterError::not_found(path, io),
        other => RasterError::decode(path, other.to_string()),
    })?;
    let (width, height) = img.dimensions();
    let (width, height) = (width as usize, height as usize);

    let transform = match find_world_file(path) {
        Some(world) => {
            let text = std::fs::read_to_string(&world).map_err(|e| RasterError::not_found(&world, e))?;
            let lines = parse_world_file(&text).map_err(|msg| RasterError::decode(&world, msg))?;
            debug!(world = %world.display(), "Using world file");
            GeoTransform::from_world_file(lines)
        }
        None => {
            warn!(path = %path.display(), "No world file found, using pixel coordinates");
            GeoTransform::pixel_space(height)
        }
    };

    let (band_count, samples, sample_type) = image_samples(img);
    Ok(
        Raster::from_interleaved(width, height, band_count, &samples, transform)?
            .with_sample_type(sample_type),
    )
}

/// Flatten a decoded image into interleaved `f32` samples.
fn image_samples(img: DynamicImage) -> (usize, Vec<f32>, SampleType) {
    fn bytes(raw: Vec<u8>) -> Vec<f32> {
        raw.into_iter().map(f32::from).collect()
    }
    fn words(raw: Vec<u16>) -> Vec<f32> {
        raw.into_iter().map(f32::from).collect()
    }

    match img.color() {
        ColorType::L8 => (1, bytes(img.into_luma8().into_raw()), SampleType::U8),
        ColorType::La8 => (2, bytes(img.into_luma_alpha8().into_raw()), SampleType::U8),
        ColorType::Rgb8 => (3, bytes(img.into_rgb8().into_raw()), SampleType::U8),
        ColorType::Rgba8 => (4, bytes(img.into_rgba8().into_raw()), SampleType::U8),
        ColorType::L16 => (1, words(img.into_luma16().into_raw()), SampleType::U16),
        ColorType::La16 => (2, words(img.into_luma_alpha16().into_raw()), SampleType::U16),
        ColorType::Rgb16 => (3, words(img.into_rgb16().into_raw()), SampleType::U16),
        ColorType::Rgba16 => (4, words(img.into_rgba16().into_raw()), SampleType::U16),
        ColorType::Rgb32F => (3, img.into_rgb32f().into_raw(), SampleType::F32),
        ColorType::Rgba32F => (4, img.into_rgba32f().into_raw(), SampleType::F32),
        _ => (4, bytes(img.into_rgba8().into_raw()), SampleType::U8),
    }
}

/// Candidate world file paths for an image, in lookup order.
///
/// For `scene.png` these are `scene.pgw`, `scene.pngw` and finally `scene.wld`.
pub fn world_file_candidates(path: &Path) -> Vec<PathBuf> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut exts = Vec::new();
    if ext.len() >= 2 {
        let mut chars = ext.chars();
        if let (Some(first), Some(last)) = (chars.next(), chars.last()) {
            exts.push(format!("{}{}w", first, last));
        }
    }
    if !ext.is_empty() {
        exts.push(format!("{}w", ext));
    }
    exts.push("wld".to_string());

    exts.iter().map(|e| path.with_extension(e)).collect()
}

fn find_world_file(path: &Path) -> Option<PathBuf> {
    world_file_candidates(path).into_iter().find(|p| p.is_file())
}

/// Parse the six numeric lines of a world file.
pub fn parse_world_file(text: &str) -> std::result::Result<[f64; 6], String> {
    let values = text
        .split_whitespace()
        .map(|t| t.parse::<f64>().map_err(|_| format!("invalid world file value '{}'", t)))
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    if values.len() != 6 {
        return Err(format!("world file must hold 6 values, found {}", values.len()));
    }
    Ok([values[0], values[1], values[2], values[3], values[4], values[5]])
}

/// Format world file text for a transform.
pub fn encode_world_file(transform: &GeoTransform) -> String {
    transform
        .to_world_file()
        .iter()
        .map(|v| format!("{}\n", v))
        .collect()
}
