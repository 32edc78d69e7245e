//! Affine georeferencing for rasters.
//!
//! Coefficients follow the GDAL ordering. For pixel `(col, row)`:
//!
//! ```text
//! x = origin_x + col * pixel_width  + row * row_rotation
//! y = origin_y + col * col_rotation + row * pixel_height
//! ```
//!
//! `(origin_x, origin_y)` is the outer corner of the first pixel, so pixel
//! centres sit at `col + 0.5`, `row + 0.5`. North-up rasters have a negative
//! `pixel_height`.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// Six-coefficient affine transform from array indices to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build a north-up transform with no rotation.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height: -pixel_height.abs(),
        }
    }

    /// Build from coefficients in GDAL order `[c, a, b, f, d, e]`.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Coefficients in GDAL order `[c, a, b, f, d, e]`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Unit-pixel transform used when a file carries no georeferencing.
    ///
    /// Places the raster in the first quadrant with row 0 at the top.
    pub fn pixel_space(height: usize) -> Self {
        Self::north_up(0.0, height as f64, 1.0, 1.0)
    }

    /// Build from the six lines of an ESRI world file.
    ///
    /// World files reference the centre of the upper-left pixel; the line
    /// order is `A, D, B, E, C, F`.
    pub fn from_world_file(lines: [f64; 6]) -> Self {
        let [a, d, b, e, c, f] = lines;
        Self {
            origin_x: c - 0.5 * a - 0.5 * b,
            pixel_width: a,
            row_rotation: b,
            origin_y: f - 0.5 * d - 0.5 * e,
            col_rotation: d,
            pixel_height: e,
        }
    }

    /// The six world-file lines `A, D, B, E, C, F` for this transform.
    pub fn to_world_file(&self) -> [f64; 6] {
        let (cx, cy) = self.pixel_center(0, 0);
        [
            self.pixel_width,
            self.col_rotation,
            self.row_rotation,
            self.pixel_height,
            cx,
            cy,
        ]
    }

    /// Map fractional array indices to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// World coordinates of the centre of pixel `(col, row)`.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// True when either rotation term is non-zero.
    pub fn is_rotated(&self) -> bool {
        self.row_rotation != 0.0 || self.col_rotation != 0.0
    }

    /// Pixel-centre X coordinate of every column (rotation terms ignored).
    pub fn x_coords(&self, width: usize) -> Vec<f64> {
        (0..width)
            .map(|col| self.origin_x + (col as f64 + 0.5) * self.pixel_width)
            .collect()
    }

    /// Pixel-centre Y coordinate of every row (rotation terms ignored).
    pub fn y_coords(&self, height: usize) -> Vec<f64> {
        (0..height)
            .map(|row| self.origin_y + (row as f64 + 0.5) * self.pixel_height)
            .collect()
    }

    /// Extent spanned by the pixel centres of a `width` x `height` raster.
    pub fn center_extent(&self, width: usize, height: usize) -> Option<BoundingBox> {
        BoundingBox::from_coords(&self.x_coords(width), &self.y_coords(height))
    }

    /// Extent spanned by the outer pixel edges of a `width` x `height` raster.
    pub fn outer_extent(&self, width: usize, height: usize) -> BoundingBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];
        let xs: Vec<f64> = corners.iter().map(|c| c.0).collect();
        let ys: Vec<f64> = corners.iter().map(|c| c.1).collect();
        // Four corners are always present.
        BoundingBox::from_coords(&xs, &ys).unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Transform for the same extent sampled at `scale` times the resolution.
    ///
    /// Pixel sizes are divided by `scale`; origin and rotation are unchanged.
    pub fn rescaled(&self, scale: f64) -> Self {
        Self {
            pixel_width: self.pixel_width / scale,
            pixel_height: self.pixel_height / scale,
            ..*self
        }
    }
}
