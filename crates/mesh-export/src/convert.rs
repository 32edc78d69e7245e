//! Elevation raster (+ optional image) to textured VTK surface.

use std::path::{Path, PathBuf};

use raster_io::{read_raster, OutputBatch, Raster};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConvertError, Result, Stage};
use crate::grid::ElevationGrid;
use crate::options::{ConversionOptions, TexturePolicy};
use crate::surface::StructuredSurface;
use crate::texture::{map_to_plane, GroundControlPoints, TextureImage};
use crate::vtk::{encode_vtk, surface_to_vtk};

/// Summary of a finished conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub mesh_file: PathBuf,
    pub texture_image_file: Option<PathBuf>,
    pub rows: usize,
    pub cols: usize,
    pub vertex_count: usize,
    pub missing_count: usize,
    /// Unscaled range of valid elevation samples.
    pub elevation_range: Option<(f64, f64)>,
    /// Range of warped vertex heights, missing samples excluded.
    pub z_range: Option<(f64, f64)>,
    pub texture_out_of_extent: usize,
}

/// A surface and texture ready for writing.
#[derive(Debug, Clone)]
pub struct TexturedSurface {
    pub surface: StructuredSurface,
    pub texture: Option<TextureImage>,
    pub missing_count: usize,
    pub elevation_range: Option<(f64, f64)>,
    pub texture_out_of_extent: usize,
}

/// Convert an elevation raster, optionally textured by a co-registered image.
///
/// Both inputs are read and every output is encoded before anything is
/// written. Outputs are then committed together.
pub fn convert(
    elevation_path: impl AsRef<Path>,
    image_path: Option<&Path>,
    options: &ConversionOptions,
) -> Result<ConversionReport> {
    let elevation_path = elevation_path.as_ref();
    options.validate().map_err(ConvertError::InvalidOptions)?;

    let elevation =
        read_raster(elevation_path).map_err(|e| ConvertError::from_raster(Stage::ReadElevation, elevation_path, e))?;
    let image = image_path
        .map(|path| {
            read_raster(path)
                .map(|raster| (path, raster))
                .map_err(|e| ConvertError::from_raster(Stage::ReadImage, path, e))
        })
        .transpose()?;

    let textured = build_textured_surface(
        (elevation_path, &elevation),
        image.as_ref().map(|(path, raster)| (*path, raster)),
        options,
    )?;

    let title = mesh_title(options);
    let mesh_bytes = encode_vtk(surface_to_vtk(&textured.surface, &title), options.encoding)?;
    let texture_bytes = match &textured.texture {
        Some(texture) => Some(
            texture
                .encode_png()
                .map_err(|e| ConvertError::from_raster(Stage::Encode, &options.texture_output, e))?,
        ),
        None => None,
    };

    let mut batch = OutputBatch::new();
    batch
        .stage(&options.mesh_output, &mesh_bytes)
        .map_err(|e| ConvertError::from_raster(Stage::WriteOutputs, &options.mesh_output, e))?;
    if let Some(bytes) = &texture_bytes {
        batch
            .stage(&options.texture_output, bytes)
            .map_err(|e| ConvertError::from_raster(Stage::WriteOutputs, &options.texture_output, e))?;
    }
    batch
        .commit()
        .map_err(|e| ConvertError::from_raster(Stage::WriteOutputs, &options.mesh_output, e))?;

    let report = ConversionReport {
        mesh_file: options.mesh_output.clone(),
        texture_image_file: texture_bytes.map(|_| options.texture_output.clone()),
        rows: textured.surface.rows(),
        cols: textured.surface.cols(),
        vertex_count: textured.surface.vertex_count(),
        missing_count: textured.missing_count,
        elevation_range: textured.elevation_range,
        z_range: textured.surface.z_range(),
        texture_out_of_extent: textured.texture_out_of_extent,
    };

    info!(
        mesh = %report.mesh_file.display(),
        texture = ?report.texture_image_file,
        vertices = report.vertex_count,
        missing = report.missing_count,
        height_scale = options.height_scale,
        "Converted elevation raster"
    );

    Ok(report)
}

/// Build the warped surface and texture from rasters already in memory.
///
/// The paths are only used in error messages.
pub fn build_textured_surface(
    elevation: (&Path, &Raster),
    image: Option<(&Path, &Raster)>,
    options: &ConversionOptions,
) -> Result<TexturedSurface> {
    let (elevation_path, elevation) = elevation;

    let grid = ElevationGrid::from_raster(elevation, options.elevation_band.map(|b| b - 1), options.nodata)
        .map_err(|e| ConvertError::from_raster(Stage::BuildMesh, elevation_path, e))?;

    let mut surface = StructuredSurface::from_grid(&grid, options.scalar_name.as_str());
    surface.warp_by_scalar(options.height_scale);

    let mut texture = None;
    let mut texture_out_of_extent = 0;

    if let Some((image_path, image)) = image {
        let bands: Option<Vec<usize>> = options
            .image_bands
            .as_ref()
            .map(|bands| bands.iter().map(|b| b - 1).collect());
        let image_texture = TextureImage::from_raster(image, bands.as_deref())
            .map_err(|e| ConvertError::from_raster(Stage::Texture, image_path, e))?;

        let gcps = GroundControlPoints::from_extent(&image.center_extent()).ok_or_else(|| {
            ConvertError::UnsupportedRasterShape {
                stage: Stage::Texture,
                path: image_path.to_path_buf(),
                message: "image extent has no width or height".to_string(),
            }
        })?;

        let mapping = map_to_plane(&surface.points, &gcps, options.texture_policy);
        if mapping.out_of_extent > 0 {
            match options.texture_policy {
                TexturePolicy::Reject => {
                    return Err(ConvertError::TextureOutOfExtent {
                        path: image_path.to_path_buf(),
                        count: mapping.out_of_extent,
                    })
                }
                TexturePolicy::Clamp => warn!(
                    image = %image_path.display(),
                    vertices = mapping.out_of_extent,
                    "Mesh extends past the image; texture coordinates clamped"
                ),
                TexturePolicy::Extrapolate => warn!(
                    image = %image_path.display(),
                    vertices = mapping.out_of_extent,
                    "Mesh extends past the image; texture coordinates outside [0, 1]"
                ),
            }
        }

        texture_out_of_extent = mapping.out_of_extent;
        surface.texture_coords = Some(mapping.coords);
        texture = Some(image_texture);
    }

    Ok(TexturedSurface {
        surface,
        texture,
        missing_count: grid.missing_count(),
        elevation_range: grid.value_range(),
        texture_out_of_extent,
    })
}

fn mesh_title(options: &ConversionOptions) -> String {
    match &options.crs {
        Some(crs) => format!("{} surface, height scale {}, crs {}", options.scalar_name, options.height_scale, crs),
        None => format!("{} surface, height scale {}", options.scalar_name, options.height_scale),
    }
}
