//! Test data generators for synthetic elevation and imagery rasters.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite. All grids are row-major with row 0 at the top.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a smooth hill: highest in the centre, `base` at the corners.
///
/// Values lie in `base..=base + relief`.
pub fn create_hill_grid(width: usize, height: usize, base: f32, relief: f32) -> Vec<f32> {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            data.push(base + relief * (1.0 - dist / max_dist));
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Replaces the cells at `(col, row)` positions with a sentinel value.
///
/// Useful for testing nodata handling.
pub fn with_sentinel(mut data: Vec<f32>, width: usize, positions: &[(usize, usize)], sentinel: f32) -> Vec<f32> {
    for &(col, row) in positions {
        let idx = row * width + col;
        if idx < data.len() {
            data[idx] = sentinel;
        }
    }
    data
}

/// Creates RGB pixel data for a simple test pattern.
///
/// Red grows left to right, green grows top to bottom, blue is constant.
///
/// # Returns
///
/// A `Vec<u8>` with RGB pixel data (3 bytes per pixel).
pub fn create_test_rgb_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128]);
        }
    }
    pixels
}
