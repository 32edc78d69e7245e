//! Interpolation methods and whole-raster resampling.

use tracing::info;

use crate::error::{RasterError, Result};
use crate::types::{InterpolationMethod, Raster};

/// Nearest neighbor interpolation.
///
/// Returns the value of the nearest grid point.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let col = x.round() as usize;
    let row = y.round() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation.
///
/// Smoothly interpolates between the four nearest grid points.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;

    if x0 >= width || y0 >= height {
        return f32::NAN;
    }

    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    // Handle NaN values - if any corner is NaN, return NaN
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

/// Bicubic interpolation.
///
/// Uses 16 surrounding points for smoother interpolation.
pub fn cubic_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let xi = x.floor() as i64;
    let yi = y.floor() as i64;

    let xf = (x - xi as f64) as f32;
    let yf = (y - yi as f64) as f32;

    let mut values = [[0.0f32; 4]; 4];

    for j in 0..4 {
        for i in 0..4 {
            let px = (xi + i - 1).clamp(0, width as i64 - 1) as usize;
            let py = (yi + j - 1).clamp(0, height as i64 - 1) as usize;
            let v = data[py * width + px];

            // If any value is NaN, fall back to bilinear
            if v.is_nan() {
                return bilinear_interpolate(data, width, height, x, y);
            }
            values[j as usize][i as usize] = v;
        }
    }

    let mut row_values = [0.0f32; 4];
    for (j, row) in values.iter().enumerate() {
        row_values[j] = cubic_1d(row[0], row[1], row[2], row[3], xf);
    }

    cubic_1d(row_values[0], row_values[1], row_values[2], row_values[3], yf)
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

/// Resample one row-major band to a new size.
///
/// Destination pixel centres are mapped back to source pixel centres through
/// `ratio` (source pixels per destination pixel) and clamped to the grid.
pub fn resample_band(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    ratio: (f64, f64),
    method: InterpolationMethod,
) -> Vec<f32> {
    let mut output = vec![f32::NAN; dst_width * dst_height];
    let max_x = (src_width - 1) as f64;
    let max_y = (src_height - 1) as f64;

    for dy in 0..dst_height {
        let sy = ((dy as f64 + 0.5) * ratio.1 - 0.5).clamp(0.0, max_y);
        for dx in 0..dst_width {
            let sx = ((dx as f64 + 0.5) * ratio.0 - 0.5).clamp(0.0, max_x);

            output[dy * dst_width + dx] = match method {
                InterpolationMethod::Nearest => nearest_interpolate(data, src_width, src_height, sx, sy),
                InterpolationMethod::Bilinear => bilinear_interpolate(data, src_width, src_height, sx, sy),
                InterpolationMethod::Cubic => cubic_interpolate(data, src_width, src_height, sx, sy),
            };
        }
    }

    output
}

/// Change the resolution of a raster by `scale` (0.5 halves the pixel count per axis).
///
/// The new size is `floor(width * scale)` x `floor(height * scale)`; pixel
/// sizes are divided by `scale` and the origin is kept. Nodata cells are
/// excluded from interpolation and written back as the nodata sentinel.
pub fn resample(raster: &Raster, scale: f64, method: InterpolationMethod) -> Result<Raster> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RasterError::unsupported_shape(format!(
            "resolution scale must be positive, got {}",
            scale
        )));
    }
    let width = (raster.width as f64 * scale).floor() as usize;
    let height = (raster.height as f64 * scale).floor() as usize;
    if width == 0 || height == 0 {
        return Err(RasterError::unsupported_shape(format!(
            "scale {} reduces {}x{} raster to {}x{}",
            scale, raster.width, raster.height, width, height
        )));
    }

    let ratio = (1.0 / scale, 1.0 / scale);
    let mut data = Vec::with_capacity(width * height * raster.band_count);
    for band in 0..raster.band_count {
        let masked: Vec<f32> = raster
            .band(band)
            .unwrap_or_default()
            .iter()
            .map(|&v| if raster.is_nodata(v) { f32::NAN } else { v })
            .collect();
        let resampled = resample_band(&masked, raster.width, raster.height, width, height, ratio, method);
        data.extend(resampled.into_iter().map(|v| match raster.nodata {
            Some(nodata) if v.is_nan() => nodata as f32,
            _ => v,
        }));
    }

    info!(
        from_width = raster.width,
        from_height = raster.height,
        to_width = width,
        to_height = height,
        method = %method,
        "Resampled raster"
    );

    Ok(Raster::new(width, height, raster.band_count, data, raster.transform.rescaled(scale))?
        .with_nodata(raster.nodata)
        .with_sample_type(raster.sample_type))
}
