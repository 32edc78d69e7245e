//! Core raster types.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{RasterError, Result};
use crate::transform::GeoTransform;

/// Sample type of the source file, kept so 8-bit imagery can pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// True for integer types whose full range fits into one byte.
    pub fn is_byte(&self) -> bool {
        matches!(self, Self::U8)
    }
}

/// A georeferenced multi-band raster held in memory.
///
/// Samples are stored band-major: band 0 row 0 first, then band 0 row 1, and
/// so on. Row 0 is the first row of the file (the top for north-up rasters).
#[derive(Debug, Clone)]
pub struct Raster {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Number of bands.
    pub band_count: usize,
    /// Band-major samples, `band_count * height * width` long.
    pub data: Vec<f32>,
    /// Affine transform from (col, row) to world coordinates.
    pub transform: GeoTransform,
    /// Declared nodata sentinel, if any.
    pub nodata: Option<f64>,
    /// Sample type of the source file.
    pub sample_type: SampleType,
}

impl Raster {
    /// Create a raster from band-major samples.
    ///
    /// Fails with `UnsupportedShape` when any dimension is zero or the sample
    /// count does not match the dimensions.
    pub fn new(
        width: usize,
        height: usize,
        band_count: usize,
        data: Vec<f32>,
        transform: GeoTransform,
    ) -> Result<Self> {
        if width == 0 || height == 0 || band_count == 0 {
            return Err(RasterError::unsupported_shape(format!(
                "degenerate raster: {} columns, {} rows, {} bands",
                width, height, band_count
            )));
        }
        let expected = width * height * band_count;
        if data.len() != expected {
            return Err(RasterError::unsupported_shape(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                band_count,
                height,
                width,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            band_count,
            data,
            transform,
            nodata: None,
            sample_type: SampleType::F32,
        })
    }

    /// Set the nodata sentinel.
    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Set the source sample type.
    pub fn with_sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    /// Build a band-major raster from pixel-interleaved samples.
    pub fn from_interleaved(
        width: usize,
        height: usize,
        band_count: usize,
        interleaved: &[f32],
        transform: GeoTransform,
    ) -> Result<Self> {
        let pixels = width * height;
        if band_count == 0 || interleaved.len() != pixels * band_count {
            return Err(RasterError::unsupported_shape(format!(
                "expected {} interleaved samples for {}x{}x{}, got {}",
                pixels * band_count,
                height,
                width,
                band_count,
                interleaved.len()
            )));
        }
        let mut data = vec![0.0f32; interleaved.len()];
        for (pixel, samples) in interleaved.chunks_exact(band_count).enumerate() {
            for (band, &value) in samples.iter().enumerate() {
                data[band * pixels + pixel] = value;
            }
        }
        Self::new(width, height, band_count, data, transform)
    }

    /// Number of pixels in one band.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Samples of a zero-based band in row-major order.
    pub fn band(&self, band: usize) -> Option<&[f32]> {
        if band >= self.band_count {
            return None;
        }
        let n = self.pixel_count();
        self.data.get(band * n..(band + 1) * n)
    }

    /// Get the value at a specific grid coordinate.
    pub fn get(&self, band: usize, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.band(band).map(|b| b[row * self.width + col])
    }

    /// Check a sample against the nodata sentinel.
    ///
    /// Comparison is done at `f32` precision since that is how samples are
    /// stored. A NaN sentinel matches NaN samples.
    pub fn is_nodata(&self, value: f32) -> bool {
        match self.nodata {
            Some(nodata) if nodata.is_nan() => value.is_nan(),
            Some(nodata) => value == nodata as f32,
            None => false,
        }
    }

    /// Pixel-centre X coordinate of every column.
    pub fn x_coords(&self) -> Vec<f64> {
        self.transform.x_coords(self.width)
    }

    /// Pixel-centre Y coordinate of every row.
    pub fn y_coords(&self) -> Vec<f64> {
        self.transform.y_coords(self.height)
    }

    /// Extent of the pixel centres.
    pub fn center_extent(&self) -> BoundingBox {
        // Dimensions are validated non-zero in `new`.
        self.transform
            .center_extent(self.width, self.height)
            .unwrap_or_else(|| self.transform.outer_extent(self.width, self.height))
    }
}

/// Interpolation method for raster resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
    /// Bicubic interpolation (smoothest, more compute).
    Cubic,
}

impl std::str::FromStr for InterpolationMethod {
    type Err = String;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "cubic" | "bicubic" => Ok(Self::Cubic),
            other => Err(format!("unknown interpolation method '{}'", other)),
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::Cubic => write!(f, "cubic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GeoTransform {
        GeoTransform::north_up(0.0, 2.0, 1.0, 1.0)
    }

    #[test]
    fn test_new_rejects_degenerate() {
        let err = Raster::new(0, 3, 1, vec![], transform()).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedShape(_)));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Raster::new(2, 2, 1, vec![1.0; 3], transform()).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedShape(_)));
    }

    #[test]
    fn test_from_interleaved_splits_bands() {
        let interleaved = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0];
        let raster = Raster::from_interleaved(2, 2, 2, &interleaved, transform()).unwrap();
        assert_eq!(raster.band(0).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(raster.band(1).unwrap(), &[10.0, 20.0, 30.0, 40.0]);
        assert!(raster.band(2).is_none());
        assert_eq!(raster.get(1, 1, 0), Some(30.0));
    }

    #[test]
    fn test_is_nodata() {
        let raster = Raster::new(1, 1, 1, vec![0.0], transform()).unwrap();
        assert!(!raster.is_nodata(0.0));

        let raster = raster.with_nodata(Some(-9999.99));
        assert!(raster.is_nodata(-9999.99f32));
        assert!(!raster.is_nodata(-9999.0));

        let raster = raster.with_nodata(Some(f64::NAN));
        assert!(raster.is_nodata(f32::NAN));
        assert!(!raster.is_nodata(1.0));
    }

    #[test]
    fn test_interpolation_from_str() {
        assert_eq!("Nearest".parse::<InterpolationMethod>(), Ok(InterpolationMethod::Nearest));
        assert_eq!("bicubic".parse::<InterpolationMethod>(), Ok(InterpolationMethod::Cubic));
        assert!("spline".parse::<InterpolationMethod>().is_err());
        assert_eq!(InterpolationMethod::default().to_string(), "bilinear");
    }
}
