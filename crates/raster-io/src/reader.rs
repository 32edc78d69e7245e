//! Format detection and the top-level read / write entry points.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::ascii_grid::{encode_ascii_grid, read_ascii_grid};
use crate::error::{RasterError, Result};
use crate::geotiff::{encode_geotiff, read_geotiff};
use crate::image_raster::{encode_world_file, read_image_raster, world_file_candidates};
use crate::output::OutputBatch;
use crate::png::{encode_png_auto, PngColor};
use crate::quantize::to_u8_interleaved;
use crate::types::Raster;

/// Raster file formats understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    /// ESRI ASCII grid.
    AsciiGrid,
    /// (Geo)TIFF.
    GeoTiff,
    /// PNG or JPEG with an optional world file.
    Image,
}

impl RasterFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "asc" | "grd" => Some(Self::AsciiGrid),
            "tif" | "tiff" | "gtiff" => Some(Self::GeoTiff),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Read a raster, choosing the decoder from the file extension.
pub fn read_raster(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(RasterError::not_found(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
    }

    let format = RasterFormat::from_path(path)
        .ok_or_else(|| RasterError::UnsupportedFormat(path.display().to_string()))?;

    let raster = match format {
        RasterFormat::AsciiGrid => read_ascii_grid(path)?,
        RasterFormat::GeoTiff => read_geotiff(path)?,
        RasterFormat::Image => read_image_raster(path)?,
    };

    info!(
        path = %path.display(),
        format = ?format,
        width = raster.width,
        height = raster.height,
        bands = raster.band_count,
        nodata = ?raster.nodata,
        "Loaded raster"
    );

    Ok(raster)
}

/// Write a raster, choosing the encoder from the file extension.
///
/// - `.asc` / `.grd`: first band as an ASCII grid.
/// - `.tif` / `.tiff`: 1, 3 or 4 bands as a GeoTIFF, keeping the sample type.
/// - `.png`: 1-4 bands as 8-bit PNG plus a `.pgw` world file.
///
/// Returns every file written.
pub fn write_raster(raster: &Raster, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut batch = OutputBatch::new();

    match RasterFormat::from_path(path) {
        Some(RasterFormat::AsciiGrid) => {
            if raster.band_count != 1 {
                return Err(RasterError::unsupported_shape(format!(
                    "ASCII grids hold one band, raster has {}",
                    raster.band_count
                )));
            }
            batch.stage(path, encode_ascii_grid(raster, 0)?.as_bytes())?;
        }
        Some(RasterFormat::GeoTiff) => {
            batch.stage(path, &encode_geotiff(raster)?)?;
        }
        Some(RasterFormat::Image) if has_png_extension(path) => {
            let color = PngColor::from_channels(raster.band_count).ok_or_else(|| {
                RasterError::unsupported_shape(format!(
                    "PNG output needs 1-4 bands, raster has {}",
                    raster.band_count
                ))
            })?;
            let bands: Vec<usize> = (0..raster.band_count).collect();
            let pixels = to_u8_interleaved(raster, &bands)?;
            let png = encode_png_auto(&pixels, raster.width, raster.height, color)?;
            batch.stage(path, &png)?;

            // First candidate is the short form (.pgw).
            if let Some(world) = world_file_candidates(path).into_iter().next() {
                batch.stage(&world, encode_world_file(&raster.transform).as_bytes())?;
            }
        }
        _ => return Err(RasterError::UnsupportedFormat(format!("cannot write {}", path.display()))),
    }

    let written = batch.commit()?;
    info!(path = %path.display(), files = written.len(), "Wrote raster");
    Ok(written)
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}
