//! Georeferenced raster I/O.
//!
//! Reads elevation and imagery rasters into a common in-memory [`Raster`]
//! (band-major `f32` samples + affine [`GeoTransform`] + nodata sentinel),
//! resamples them, and writes them back out.
//!
//! Supported formats:
//!
//! | format | read | write |
//! |--------|------|-------|
//! | ESRI ASCII grid (`.asc`) | yes | yes (single band) |
//! | GeoTIFF (`.tif`) | yes | yes (1, 3 or 4 bands) |
//! | PNG / JPEG + world file | yes | PNG only |
//!
//! # Example
//!
//! ```ignore
//! use raster_io::{read_raster, resample, write_raster, InterpolationMethod};
//!
//! let dem = read_raster("dem.asc")?;
//! let coarse = resample(&dem, 0.5, InterpolationMethod::Bilinear)?;
//! write_raster(&coarse, "dem_half.asc")?;
//! ```

pub mod ascii_grid;
pub mod bbox;
pub mod error;
pub mod geotiff;
pub mod image_raster;
pub mod output;
pub mod png;
pub mod quantize;
pub mod reader;
pub mod resample;
pub mod transform;
pub mod types;

// Re-export commonly used types at crate root
pub use bbox::BoundingBox;
pub use error::{RasterError, Result};
pub use geotiff::encode_geotiff;
pub use output::{write_atomic, OutputBatch};
pub use png::{encode_png, encode_png_auto, PngColor};
pub use quantize::to_u8_interleaved;
pub use reader::{read_raster, write_raster, RasterFormat};
pub use resample::resample;
pub use transform::GeoTransform;
pub use types::{InterpolationMethod, Raster, SampleType};
