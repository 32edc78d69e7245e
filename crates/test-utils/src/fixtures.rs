//! Fixture writers for raster and particle-tracking test inputs.
//!
//! Each writer drops a small, fully georeferenced file into a directory
//! (normally a `TempDir`) and returns its path.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Georeferencing of a north-up fixture grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
    /// Lower-left corner X.
    pub xll: f64,
    /// Lower-left corner Y.
    pub yll: f64,
    pub cellsize: f64,
}

impl GridSpec {
    /// Number of cells.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Pixel-centre X of the first and last column.
    pub fn x_center_range(&self) -> (f64, f64) {
        (
            self.xll + 0.5 * self.cellsize,
            self.xll + (self.width as f64 - 0.5) * self.cellsize,
        )
    }

    /// Pixel-centre Y of the bottom and top row.
    pub fn y_center_range(&self) -> (f64, f64) {
        (
            self.yll + 0.5 * self.cellsize,
            self.yll + (self.height as f64 - 0.5) * self.cellsize,
        )
    }
}

/// Common grid specifications for testing.
pub mod grid {
    use super::GridSpec;

    /// 3x3 grid with 10 m cells at the origin.
    pub const SMALL_3X3: GridSpec = GridSpec {
        width: 3,
        height: 3,
        xll: 0.0,
        yll: 0.0,
        cellsize: 10.0,
    };

    /// 4x3 grid in UTM-like coordinates.
    pub const UTM_4X3: GridSpec = GridSpec {
        width: 4,
        height: 3,
        xll: 500_000.0,
        yll: 4_000_000.0,
        cellsize: 30.0,
    };
}

/// Write an ESRI ASCII grid.
///
/// `data` is row-major with row 0 at the top.
pub fn write_ascii_grid(dir: &Path, name: &str, spec: &GridSpec, data: &[f32], nodata: Option<f64>) -> PathBuf {
    assert_eq!(data.len(), spec.size(), "fixture data does not match grid size");

    let mut text = String::new();
    let _ = writeln!(text, "ncols {}", spec.width);
    let _ = writeln!(text, "nrows {}", spec.height);
    let _ = writeln!(text, "xllcorner {}", spec.xll);
    let _ = writeln!(text, "yllcorner {}", spec.yll);
    let _ = writeln!(text, "cellsize {}", spec.cellsize);
    if let Some(nd) = nodata {
        let _ = writeln!(text, "NODATA_value {}", nd);
    }
    for row in data.chunks(spec.width) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        let _ = writeln!(text, "{}", line.join(" "));
    }

    let path = dir.join(name);
    std::fs::write(&path, text).expect("Failed to write ASCII grid fixture");
    path
}

/// Write the world file lines for a north-up grid spec.
pub fn world_file_text(spec: &GridSpec) -> String {
    let top = spec.yll + spec.height as f64 * spec.cellsize;
    format!(
        "{}\n0\n0\n{}\n{}\n{}\n",
        spec.cellsize,
        -spec.cellsize,
        spec.xll + 0.5 * spec.cellsize,
        top - 0.5 * spec.cellsize
    )
}

/// Write an RGB PNG with a `.pgw` world file matching `spec`.
pub fn write_rgb_png(dir: &Path, name: &str, spec: &GridSpec, pixels: &[u8]) -> PathBuf {
    assert_eq!(pixels.len(), spec.size() * 3, "fixture pixels do not match grid size");

    let path = dir.join(name);
    image::save_buffer(
        &path,
        pixels,
        spec.width as u32,
        spec.height as u32,
        image::ColorType::Rgb8,
    )
    .expect("Failed to write PNG fixture");
    std::fs::write(path.with_extension("pgw"), world_file_text(spec)).expect("Failed to write world file");
    path
}

/// Write a single-band 32-bit float GeoTIFF.
///
/// Georeferenced with a corner tie point and pixel scale; `nodata` goes into
/// the `GDAL_NODATA` tag.
pub fn write_geotiff(dir: &Path, name: &str, spec: &GridSpec, data: &[f32], nodata: Option<f64>) -> PathBuf {
    use tiff::encoder::{colortype, TiffEncoder};
    use tiff::tags::Tag;

    assert_eq!(data.len(), spec.size(), "fixture data does not match grid size");

    let top = spec.yll + spec.height as f64 * spec.cellsize;
    let tiepoint = [0.0, 0.0, 0.0, spec.xll, top, 0.0];
    let scale = [spec.cellsize, spec.cellsize, 0.0];

    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("Failed to create GeoTIFF fixture");
    let mut encoder = TiffEncoder::new(file).expect("Failed to start TIFF encoder");
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(spec.width as u32, spec.height as u32)
        .expect("Failed to start TIFF image");
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .expect("Failed to write tie point");
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .expect("Failed to write pixel scale");
    if let Some(nodata) = nodata {
        image
            .encoder()
            .write_tag(Tag::GdalNodata, nodata.to_string().as_str())
            .expect("Failed to write nodata");
    }
    image.write_data(data).expect("Failed to write TIFF samples");
    path
}

/// One particle track for a MODPATH 7 pathline fixture.
#[derive(Debug, Clone)]
pub struct FixturePathline {
    pub particle_id: u32,
    /// `(x, y, z, time)` per point.
    pub points: Vec<(f64, f64, f64, f64)>,
}

/// Write a MODPATH 7 pathline file.
pub fn write_mp7_pathlines(dir: &Path, name: &str, pathlines: &[FixturePathline]) -> PathBuf {
    let mut text = String::new();
    let _ = writeln!(text, "MODPATH_PATHLINE_FILE         7         2");
    let _ = writeln!(text, "         1  0.000000000000000E+00  0.000000000000000E+00  0.000000000000000E+00  0.000000000000000E+00");
    let _ = writeln!(text, "END HEADER");
    for (seq, pathline) in pathlines.iter().enumerate() {
        let _ = writeln!(text, "{:>10}{:>10}{:>10}{:>10}", seq + 1, 1, pathline.particle_id, pathline.points.len());
        for &(x, y, z, t) in &pathline.points {
            let _ = writeln!(
                text,
                "{:>10} {:>24.15E} {:>24.15E} {:>24.15E} {:>24.15E}  5.0E-01  5.0E-01  5.0E-01 {:>5} {:>5} {:>5}",
                1, x, y, z, t, 1, 1, 1
            );
        }
    }

    let path = dir.join(name);
    std::fs::write(&path, text).expect("Failed to write pathline fixture");
    path
}
