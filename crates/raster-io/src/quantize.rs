//! Conversion of raster bands to interleaved 8-bit pixels.

use crate::error::{RasterError, Result};
use crate::types::Raster;

/// Interleave the selected zero-based bands as 8-bit samples (row, col, band).
///
/// Byte sources are copied as-is. Other sample types are rounded when every
/// valid value already lies in `0..=255`, and otherwise stretched linearly
/// over the band's finite min..max. Nodata and NaN samples become 0.
pub fn to_u8_interleaved(raster: &Raster, bands: &[usize]) -> Result<Vec<u8>> {
    let pixels = raster.pixel_count();
    let mut out = vec![0u8; pixels * bands.len()];

    for (slot, &band) in bands.iter().enumerate() {
        let samples = raster.band(band).ok_or_else(|| {
            RasterError::unsupported_shape(format!(
                "band {} requested but raster has {} band(s)",
                band + 1,
                raster.band_count
            ))
        })?;
        let mapping = ByteMapping::for_band(raster, samples);
        for (pixel, &value) in samples.iter().enumerate() {
            out[pixel * bands.len() + slot] = mapping.apply(raster, value);
        }
    }

    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ByteMapping {
    Copy,
    Stretch { min: f32, max: f32 },
}

impl ByteMapping {
    fn for_band(raster: &Raster, samples: &[f32]) -> Self {
        if raster.sample_type.is_byte() {
            return Self::Copy;
        }
        let mut valid = samples
            .iter()
            .copied()
            .filter(|v| v.is_finite() && !raster.is_nodata(*v));
        let Some(first) = valid.next() else {
            return Self::Copy;
        };
        let (min, max) = valid.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min >= 0.0 && max <= 255.0 {
            Self::Copy
        } else {
            Self::Stretch { min, max }
        }
    }

    fn apply(&self, raster: &Raster, value: f32) -> u8 {
        if !value.is_finite() || raster.is_nodata(value) {
            return 0;
        }
        match *self {
            Self::Copy => value.round().clamp(0.0, 255.0) as u8,
            Self::Stretch { min, max } if max > min => {
                (((value - min) / (max - min)) * 255.0).round().clamp(0.0, 255.0) as u8
            }
            Self::Stretch { .. } => 0,
        }
    }
}
