//! Structured surface mesh built from an elevation grid.
//!
//! Vertices are stored column-major: the row index varies fastest, so vertex
//! `(row, col)` sits at `col * rows + row`. The grid dimensions written to VTK
//! are `(rows, cols, 1)` to match.

use crate::grid::{finite_range, ElevationGrid};

/// A grid-topology surface with one vertex per elevation sample.
#[derive(Debug, Clone)]
pub struct StructuredSurface {
    rows: usize,
    cols: usize,
    /// Vertex positions, column-major.
    pub points: Vec<[f64; 3]>,
    /// Unscaled per-vertex elevation, NaN where missing.
    pub scalars: Vec<f64>,
    pub scalar_name: String,
    /// Per-vertex `(u, v)` texture coordinates.
    pub texture_coords: Option<Vec<[f64; 2]>>,
}

impl StructuredSurface {
    /// Flat surface (z = 0) carrying the grid samples as a point scalar.
    pub fn from_grid(grid: &ElevationGrid, scalar_name: impl Into<String>) -> Self {
        let rows = grid.rows();
        let cols = grid.cols();
        let mut points = Vec::with_capacity(rows * cols);
        let mut scalars = Vec::with_capacity(rows * cols);

        for (col, &x) in grid.x.iter().enumerate() {
            for (row, &y) in grid.y.iter().enumerate() {
                points.push([x, y, 0.0]);
                scalars.push(grid.get(row, col));
            }
        }

        Self {
            rows,
            cols,
            points,
            scalars,
            scalar_name: scalar_name.into(),
            texture_coords: None,
        }
    }

    /// Displace every vertex along +Z by `factor` times its scalar.
    ///
    /// Vertices with a missing scalar stay where they are.
    pub fn warp_by_scalar(&mut self, factor: f64) {
        for (point, &value) in self.points.iter_mut().zip(&self.scalars) {
            if value.is_finite() {
                point[2] += factor * value;
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// VTK structured grid dimensions.
    pub fn dimensions(&self) -> [u32; 3] {
        [self.rows as u32, self.cols as u32, 1]
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Index of vertex `(row, col)` in the point and scalar arrays.
    pub fn vertex_index(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }

    pub fn point(&self, row: usize, col: usize) -> [f64; 3] {
        self.points[self.vertex_index(row, col)]
    }

    pub fn scalar(&self, row: usize, col: usize) -> f64 {
        self.scalars[self.vertex_index(row, col)]
    }

    /// Z range over vertices with a valid scalar.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        finite_range(
            self.points
                .iter()
                .zip(&self.scalars)
                .filter(|(_, s)| s.is_finite())
                .map(|(p, _)| p[2]),
        )
    }
}
