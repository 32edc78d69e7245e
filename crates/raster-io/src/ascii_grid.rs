//! ESRI ASCII grid (`.asc`) reading and writing.
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     500000.0
//! yllcorner     4000000.0
//! cellsize      30.0
//! NODATA_value  -9999
//! 1 2 3 4
//! ...
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::error::{RasterError, Result};
use crate::transform::GeoTransform;
use crate::types::{Raster, SampleType};

const HEADER_KEYS: [&str; 10] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "xllcenter",
    "yllcenter",
    "cellsize",
    "dx",
    "dy",
    "nodata_value",
];

/// Sentinel written when a band contains NaN but declares no nodata value.
const DEFAULT_NODATA: f64 = -9999.0;

/// Read an ASCII grid file.
pub fn read_ascii_grid(path: &Path) -> Result<Raster> {
    let text = std::fs::read_to_string(path).map_err(|e| RasterError::not_found(path, e))?;
    parse_ascii_grid(&text, path)
}

/// Parse ASCII grid text. `path` is only used for error context.
pub fn parse_ascii_grid(text: &str, path: &Path) -> Result<Raster> {
    let mut tokens = text.split_whitespace().peekable();
    let mut header: HashMap<String, f64> = HashMap::new();

    while let Some(token) = tokens.peek() {
        let key = token.to_ascii_lowercase();
        if !HEADER_KEYS.contains(&key.as_str()) {
            break;
        }
        tokens.next();
        let raw = tokens
            .next()
            .ok_or_else(|| RasterError::decode(path, format!("missing value for '{}'", key)))?;
        let value: f64 = raw
            .parse()
            .map_err(|_| RasterError::decode(path, format!("invalid value '{}' for '{}'", raw, key)))?;
        header.insert(key, value);
    }

    let ncols = header_dim(&header, "ncols", path)?;
    let nrows = header_dim(&header, "nrows", path)?;

    let (cell_x, cell_y) = match (header.get("cellsize"), header.get("dx"), header.get("dy")) {
        (Some(&size), _, _) => (size, size),
        (None, Some(&dx), Some(&dy)) => (dx, dy),
        _ => return Err(RasterError::decode(path, "missing 'cellsize' (or 'dx'/'dy')")),
    };

    let left = match (header.get("xllcorner"), header.get("xllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - 0.5 * cell_x,
        _ => return Err(RasterError::decode(path, "missing 'xllcorner' or 'xllcenter'")),
    };
    let bottom = match (header.get("yllcorner"), header.get("yllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - 0.5 * cell_y,
        _ => return Err(RasterError::decode(path, "missing 'yllcorner' or 'yllcenter'")),
    };

    let data = tokens
        .map(|t| {
            t.parse::<f32>()
                .map_err(|_| RasterError::decode(path, format!("invalid sample '{}'", t)))
        })
        .collect::<Result<Vec<f32>>>()?;

    let expected = ncols
        .checked_mul(nrows)
        .ok_or_else(|| RasterError::decode(path, format!("grid size {} x {} overflows", nrows, ncols)))?;
    if data.len() != expected {
        return Err(RasterError::decode(
            path,
            format!("expected {} samples ({} x {}), found {}", expected, nrows, ncols, data.len()),
        ));
    }

    let top = bottom + nrows as f64 * cell_y;
    let transform = GeoTransform::north_up(left, top, cell_x, cell_y);

    debug!(path = %path.display(), ncols, nrows, cell_x, cell_y, "Parsed ASCII grid header");

    Ok(Raster::new(ncols, nrows, 1, data, transform)?
        .with_nodata(header.get("nodata_value").copied())
        .with_sample_type(SampleType::F32))
}

fn header_dim(header: &HashMap<String, f64>, key: &str, path: &Path) -> Result<usize> {
    let value = header
        .get(key)
        .ok_or_else(|| RasterError::decode(path, format!("missing '{}'", key)))?;
    if *value < 0.0 || value.fract() != 0.0 {
        return Err(RasterError::decode(path, format!("'{}' must be a non-negative integer, got {}", key, value)));
    }
    Ok(*value as usize)
}

/// Encode one band of a raster as ASCII grid text.
///
/// The raster must be north-up without rotation. Square pixels are written
/// with `cellsize`, others with `dx`/`dy`. NaN samples are written as the
/// nodata value.
pub fn encode_ascii_grid(raster: &Raster, band: usize) -> Result<String> {
    let t = &raster.transform;
    if t.is_rotated() {
        return Err(RasterError::InvalidTransform(
            "ASCII grids cannot represent rotated transforms".to_string(),
        ));
    }
    if t.pixel_height >= 0.0 || t.pixel_width <= 0.0 {
        return Err(RasterError::InvalidTransform(format!(
            "ASCII grids must be north-up (pixel size {} x {})",
            t.pixel_width, t.pixel_height
        )));
    }
    let samples = raster.band(band).ok_or_else(|| {
        RasterError::unsupported_shape(format!(
            "band {} requested but raster has {} band(s)",
            band + 1,
            raster.band_count
        ))
    })?;

    let cell_x = t.pixel_width;
    let cell_y = -t.pixel_height;
    let bottom = t.origin_y + raster.height as f64 * t.pixel_height;
    let nodata = match raster.nodata {
        Some(v) if !v.is_nan() => Some(v),
        _ if samples.iter().any(|v| v.is_nan()) => Some(DEFAULT_NODATA),
        _ => None,
    };

    let mut out = String::with_capacity(samples.len() * 8 + 128);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "ncols {}", raster.width);
    let _ = writeln!(out, "nrows {}", raster.height);
    let _ = writeln!(out, "xllcorner {}", t.origin_x);
    let _ = writeln!(out, "yllcorner {}", bottom);
    if (cell_x - cell_y).abs() <= f64::EPSILON * cell_x.abs().max(1.0) {
        let _ = writeln!(out, "cellsize {}", cell_x);
    } else {
        let _ = writeln!(out, "dx {}", cell_x);
        let _ = writeln!(out, "dy {}", cell_y);
    }
    if let Some(nodata) = nodata {
        let _ = writeln!(out, "NODATA_value {}", nodata);
    }

    for row in samples.chunks_exact(raster.width) {
        let line: Vec<String> = row
            .iter()
            .map(|&v| match nodata {
                Some(nd) if v.is_nan() => nd.to_string(),
                _ => v.to_string(),
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    Ok(out)
}
