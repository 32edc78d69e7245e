//! Planar texture projection and texture image encoding.

use nalgebra::Vector3;
use raster_io::{encode_png_auto, to_u8_interleaved, BoundingBox, PngColor, Raster, RasterError};
use tracing::debug;

use crate::options::TexturePolicy;

/// Slack allowed past the image border before a vertex counts as outside.
pub const EXTENT_TOLERANCE: f64 = 1e-9;

/// Three reference points spanning the texture plane.
///
/// `origin` maps to `(0, 0)`, `point_u` to `(1, 0)` and `point_v` to `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundControlPoints {
    pub origin: Vector3<f64>,
    pub point_u: Vector3<f64>,
    pub point_v: Vector3<f64>,
}

impl GroundControlPoints {
    /// Bottom-left, bottom-right and top-left corners of `extent`.
    ///
    /// Returns `None` when the extent has no width or height.
    pub fn from_extent(extent: &BoundingBox) -> Option<Self> {
        if extent.width() <= 0.0 || extent.height() <= 0.0 {
            return None;
        }
        Some(Self {
            origin: Vector3::new(extent.min_x, extent.min_y, 0.0),
            point_u: Vector3::new(extent.max_x, extent.min_y, 0.0),
            point_v: Vector3::new(extent.min_x, extent.max_y, 0.0),
        })
    }

    /// Unclamped `(u, v)` of a point projected onto the plane.
    pub fn project(&self, point: [f64; 3]) -> [f64; 2] {
        let p = Vector3::new(point[0], point[1], point[2]) - self.origin;
        let axis_u = self.point_u - self.origin;
        let axis_v = self.point_v - self.origin;
        [
            p.dot(&axis_u) / axis_u.norm_squared(),
            p.dot(&axis_v) / axis_v.norm_squared(),
        ]
    }
}

/// Texture coordinates for a set of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureMapping {
    pub coords: Vec<[f64; 2]>,
    /// Vertices whose raw projection fell outside `[0, 1]`.
    pub out_of_extent: usize,
}

/// Project `points` onto the plane of `gcps`.
///
/// `Clamp` pulls coordinates into `[0, 1]`; the other policies keep raw
/// values. `Reject` is enforced by the caller from `out_of_extent`.
pub fn map_to_plane(points: &[[f64; 3]], gcps: &GroundControlPoints, policy: TexturePolicy) -> TextureMapping {
    let mut out_of_extent = 0;
    let coords = points
        .iter()
        .map(|&p| {
            let [u, v] = gcps.project(p);
            if !in_unit_range(u) || !in_unit_range(v) {
                out_of_extent += 1;
            }
            match policy {
                TexturePolicy::Clamp => [u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)],
                TexturePolicy::Extrapolate | TexturePolicy::Reject => [u, v],
            }
        })
        .collect();

    debug!(vertices = points.len(), out_of_extent, ?policy, "Projected texture coordinates");
    TextureMapping { coords, out_of_extent }
}

fn in_unit_range(t: f64) -> bool {
    (-EXTENT_TOLERANCE..=1.0 + EXTENT_TOLERANCE).contains(&t)
}

/// An image raster as interleaved 8-bit pixels, row 0 at the top.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: usize,
    pub height: usize,
    pub color: PngColor,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Interleave the selected zero-based bands of `raster`.
    ///
    /// Without a selection every band is used, which requires 1-4 bands.
    pub fn from_raster(raster: &Raster, bands: Option<&[usize]>) -> raster_io::Result<Self> {
        let bands: Vec<usize> = match bands {
            Some(b) => b.to_vec(),
            None => (0..raster.band_count).collect(),
        };
        let color = PngColor::from_channels(bands.len()).ok_or_else(|| {
            RasterError::unsupported_shape(format!(
                "texture needs 1-4 bands, image has {}; select bands explicitly",
                bands.len()
            ))
        })?;

        Ok(Self {
            width: raster.width,
            height: raster.height,
            color,
            pixels: to_u8_interleaved(raster, &bands)?,
        })
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> raster_io::Result<Vec<u8>> {
        encode_png_auto(&self.pixels, self.width, self.height, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_io::{GeoTransform, SampleType};

    fn gcps() -> GroundControlPoints {
        GroundControlPoints::from_extent(&BoundingBox::new(100.0, 200.0, 300.0, 600.0)).unwrap()
    }

    #[test]
    fn test_corners_map_to_unit_square() {
        let g = gcps();
        assert_eq!(g.project([100.0, 200.0, 0.0]), [0.0, 0.0]);
        assert_eq!(g.project([300.0, 200.0, 0.0]), [1.0, 0.0]);
        assert_eq!(g.project([100.0, 600.0, 0.0]), [0.0, 1.0]);
        assert_eq!(g.project([300.0, 600.0, 0.0]), [1.0, 1.0]);
        assert_eq!(g.project([200.0, 400.0, 55.0]), [0.5, 0.5]);
    }

    #[test]
    fn test_policies_outside_extent() {
        let g = gcps();
        let points = [[50.0, 400.0, 0.0], [200.0, 400.0, 0.0], [300.0, 800.0, 0.0]];

        let clamped = map_to_plane(&points, &g, TexturePolicy::Clamp);
        assert_eq!(clamped.out_of_extent, 2);
        assert_eq!(clamped.coords[0], [0.0, 0.5]);
        assert_eq!(clamped.coords[2], [1.0, 1.0]);

        let raw = map_to_plane(&points, &g, TexturePolicy::Extrapolate);
        assert_eq!(raw.out_of_extent, 2);
        assert_eq!(raw.coords[0], [-0.25, 0.5]);
        assert_eq!(raw.coords[2], [1.0, 1.5]);
    }

    #[test]
    fn test_tolerance_at_border() {
        let g = gcps();
        let mapping = map_to_plane(&[[300.0 + 1e-8, 600.0, 0.0]], &g, TexturePolicy::Reject);
        assert_eq!(mapping.out_of_extent, 0);
    }

    #[test]
    fn test_degenerate_extent() {
        assert!(GroundControlPoints::from_extent(&BoundingBox::new(5.0, 0.0, 5.0, 10.0)).is_none());
    }

    #[test]
    fn test_texture_band_selection() {
        let t = GeoTransform::north_up(0.0, 1.0, 1.0, 1.0);
        let data = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let raster = Raster::new(1, 1, 5, data, t).unwrap().with_sample_type(SampleType::U8);

        let err = TextureImage::from_raster(&raster, None).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedShape(_)));

        let rgb = TextureImage::from_raster(&raster, Some(&[2, 1, 0])).unwrap();
        assert_eq!(rgb.color, PngColor::Rgb);
        assert_eq!(rgb.pixels, vec![30, 20, 10]);

        let gray_alpha = TextureImage::from_raster(&raster, Some(&[0, 4])).unwrap();
        assert_eq!(gray_alpha.color, PngColor::GrayAlpha);
    }
}
