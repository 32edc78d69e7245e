//! Elevation samples on pixel-centre coordinates.

use raster_io::{Raster, RasterError};

/// Heights of a single raster band with nodata replaced by NaN.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    /// Pixel-centre X of every column.
    pub x: Vec<f64>,
    /// Pixel-centre Y of every row.
    pub y: Vec<f64>,
    /// Row-major samples, NaN where missing.
    pub values: Vec<f64>,
}

impl ElevationGrid {
    /// Build the grid from one band of `raster`.
    ///
    /// `band` is zero-based; `None` requires a single-band raster. `nodata`
    /// overrides the sentinel declared by the raster.
    pub fn from_raster(raster: &Raster, band: Option<usize>, nodata: Option<f64>) -> raster_io::Result<Self> {
        let band = match band {
            Some(b) => b,
            None if raster.band_count == 1 => 0,
            None => {
                return Err(RasterError::unsupported_shape(format!(
                    "elevation raster has {} bands, select one",
                    raster.band_count
                )))
            }
        };
        let samples = raster.band(band).ok_or_else(|| {
            RasterError::unsupported_shape(format!(
                "band {} requested but raster has {} band(s)",
                band + 1,
                raster.band_count
            ))
        })?;

        if raster.transform.is_rotated() {
            return Err(RasterError::InvalidTransform(
                "rotated transforms cannot be laid out as an axis-aligned grid".to_string(),
            ));
        }

        let sentinel = nodata.or(raster.nodata).map(|v| v as f32);
        let values = samples
            .iter()
            .map(|&v| match sentinel {
                _ if v.is_nan() => f64::NAN,
                Some(nd) if v == nd => f64::NAN,
                _ => v as f64,
            })
            .collect();

        Ok(Self {
            x: raster.x_coords(),
            y: raster.y_coords(),
            values,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.y.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.x.len()
    }

    /// Sample at `(row, col)`, NaN when missing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    /// Number of missing samples.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Min and max of the valid samples.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.values.iter().copied())
    }
}

pub(crate) fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_io::GeoTransform;

    fn raster(width: usize, height: usize, bands: usize, data: Vec<f32>) -> Raster {
        Raster::new(width, height, bands, data, GeoTransform::north_up(0.0, 30.0, 10.0, 10.0)).unwrap()
    }

    #[test]
    fn test_nodata_becomes_nan() {
        let r = raster(3, 3, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 5000.0, 7.0, 8.0, 9.0]).with_nodata(Some(5000.0));
        let grid = ElevationGrid::from_raster(&r, None, None).unwrap();
        assert!(grid.get(1, 2).is_nan());
        assert_eq!(grid.get(2, 0), 7.0);
        assert_eq!(grid.missing_count(), 1);
        assert_eq!(grid.value_range(), Some((1.0, 9.0)));
        assert_eq!(grid.x, vec![5.0, 15.0, 25.0]);
        assert_eq!(grid.y, vec![25.0, 15.0, 5.0]);
    }

    #[test]
    fn test_nodata_override() {
        let r = raster(2, 1, 1, vec![-1.0, 4.0]).with_nodata(Some(4.0));
        let grid = ElevationGrid::from_raster(&r, None, Some(-1.0)).unwrap();
        assert!(grid.get(0, 0).is_nan());
        assert_eq!(grid.get(0, 1), 4.0);
    }

    #[test]
    fn test_multiband_needs_selection() {
        let r = raster(1, 1, 2, vec![10.0, 20.0]);
        let err = ElevationGrid::from_raster(&r, None, None).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedShape(_)));

        let grid = ElevationGrid::from_raster(&r, Some(1), None).unwrap();
        assert_eq!(grid.get(0, 0), 20.0);

        assert!(ElevationGrid::from_raster(&r, Some(2), None).is_err());
    }

    #[test]
    fn test_rotated_transform_rejected() {
        let transform = GeoTransform::from_gdal([0.0, 1.0, 0.5, 10.0, 0.0, -1.0]);
        let r = Raster::new(2, 2, 1, vec![0.0; 4], transform).unwrap();
        let err = ElevationGrid::from_raster(&r, None, None).unwrap_err();
        assert!(matches!(err, RasterError::InvalidTransform(_)));
    }

    #[test]
    fn test_all_missing_has_no_range() {
        let r = raster(2, 1, 1, vec![f32::NAN, f32::NAN]);
        let grid = ElevationGrid::from_raster(&r, None, None).unwrap();
        assert_eq!(grid.value_range(), None);
    }
}
