//! Mesh export for terrain and groundwater data.
//!
//! Turns a single-band elevation raster into a warped VTK structured surface,
//! optionally textured by a co-registered image, and MODPATH pathlines into
//! VTK polylines and point clouds.
//!
//! # Example
//!
//! ```ignore
//! use mesh_export::{convert, ConversionOptions};
//!
//! let options = ConversionOptions {
//!     height_scale: 2.0,
//!     mesh_output: "dem.vtk".into(),
//!     texture_output: "dem.png".into(),
//!     ..Default::default()
//! };
//! let report = convert("dem.tif", Some("ortho.tif".as_ref()), &options)?;
//! println!("{} vertices", report.vertex_count);
//! ```

pub mod convert;
pub mod error;
pub mod grid;
pub mod options;
pub mod pathlines;
pub mod surface;
pub mod texture;
pub mod vtk;

pub use convert::{build_textured_surface, convert, ConversionReport, TexturedSurface};
pub use error::{ConvertError, Result, Stage};
pub use grid::ElevationGrid;
pub use options::{ConversionOptions, PathlineExportOptions, TexturePolicy, VtkEncoding};
pub use pathlines::{
    end_points_polydata, export_pathline_timesteps, export_pathlines, load_pathlines, pathlines_polydata,
    select_pathlines, start_points_polydata, PathlineExportReport, PathlineOutputs,
};
pub use surface::StructuredSurface;
pub use texture::{map_to_plane, GroundControlPoints, TextureImage, TextureMapping};
pub use vtk::{encode_vtk, polydata_to_vtk, surface_to_vtk};
