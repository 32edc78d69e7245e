//! MODPATH pathlines to VTK polydata.
//!
//! Three products, all `POLYDATA`:
//! - one `LINES` cell per pathline, point scalar `time`, cell scalar `particle_id`
//! - start / end point clouds, one `VERTICES` cell per particle
//! - a series of line files, file `j` holding the first `j` points of every pathline

use std::path::{Path, PathBuf};

use modpath_parser::{read_pathlines, Pathline, PathlineFile, PathlinePoint};
use raster_io::OutputBatch;
use serde::Serialize;
use tracing::info;
use vtkio::model::{Attribute, Attributes, IOBuffer, PolyDataPiece, VertexNumbers};

use crate::error::{ConvertError, Result, Stage};
use crate::options::PathlineExportOptions;
use crate::vtk::{encode_vtk, polydata_to_vtk};

/// Where to write the pathline products.
#[derive(Debug, Clone, Default)]
pub struct PathlineOutputs {
    pub lines: PathBuf,
    pub start_points: Option<PathBuf>,
    pub end_points: Option<PathBuf>,
}

/// Summary of a pathline export.
#[derive(Debug, Clone, Serialize)]
pub struct PathlineExportReport {
    pub files: Vec<PathBuf>,
    /// Pathlines in the input.
    pub pathlines: usize,
    /// Pathlines kept after applying the divider.
    pub exported_pathlines: usize,
    /// Points written to the line output.
    pub line_points: usize,
}

/// Read a pathline file, tagging errors with the reading stage.
pub fn load_pathlines(path: impl AsRef<Path>) -> Result<PathlineFile> {
    let path = path.as_ref();
    read_pathlines(path).map_err(|e| ConvertError::from_modpath(path, e))
}

/// Every `divider`-th pathline, starting with the first.
pub fn select_pathlines(pathlines: &[Pathline], divider: usize) -> Vec<&Pathline> {
    pathlines.iter().step_by(divider.max(1)).collect()
}

/// One polyline per pathline, truncated to `max_points` points when given.
///
/// Pathlines with no points produce no cell.
pub fn pathlines_polydata(pathlines: &[&Pathline], offset: [f64; 3], max_points: Option<usize>) -> PolyDataPiece {
    let mut points = Vec::new();
    let mut times = Vec::new();
    let mut vertices = Vec::new();
    let mut particle_ids = Vec::new();
    let mut next_index = 0u32;

    for pathline in pathlines {
        let take = max_points.map_or(pathline.len(), |m| m.min(pathline.len()));
        if take == 0 {
            continue;
        }
        vertices.push(take as u32);
        for point in &pathline.points[..take] {
            push_point(&mut points, point, offset);
            times.push(point.time);
            vertices.push(next_index);
            next_index += 1;
        }
        particle_ids.push(pathline.particle_id as i32);
    }

    let num_cells = particle_ids.len() as u32;
    PolyDataPiece {
        points: IOBuffer::F64(points),
        verts: None,
        lines: (num_cells > 0).then_some(VertexNumbers::Legacy { num_cells, vertices }),
        polys: None,
        strips: None,
        data: Attributes {
            point: vec![Attribute::scalars("time", 1).with_data(IOBuffer::F64(times))],
            cell: if num_cells > 0 {
                vec![Attribute::scalars("particle_id", 1).with_data(IOBuffer::I32(particle_ids))]
            } else {
                Vec::new()
            },
        },
    }
}

/// Point cloud of the first point of every pathline.
pub fn start_points_polydata(pathlines: &[&Pathline], offset: [f64; 3]) -> PolyDataPiece {
    points_polydata(pathlines, offset, Pathline::start)
}

/// Point cloud of the last point of every pathline.
pub fn end_points_polydata(pathlines: &[&Pathline], offset: [f64; 3]) -> PolyDataPiece {
    points_polydata(pathlines, offset, Pathline::end)
}

fn points_polydata(
    pathlines: &[&Pathline],
    offset: [f64; 3],
    pick: impl Fn(&Pathline) -> Option<&PathlinePoint>,
) -> PolyDataPiece {
    let mut points = Vec::new();
    let mut times = Vec::new();
    let mut particle_ids = Vec::new();

    for pathline in pathlines {
        if let Some(point) = pick(pathline) {
            push_point(&mut points, point, offset);
            times.push(point.time);
            particle_ids.push(pathline.particle_id as i32);
        }
    }

    let n = particle_ids.len() as u32;
    let vertices = (0..n).flat_map(|i| [1, i]).collect();
    PolyDataPiece {
        points: IOBuffer::F64(points),
        verts: (n > 0).then_some(VertexNumbers::Legacy { num_cells: n, vertices }),
        lines: None,
        polys: None,
        strips: None,
        data: Attributes {
            point: vec![
                Attribute::scalars("time", 1).with_data(IOBuffer::F64(times)),
                Attribute::scalars("particle_id", 1).with_data(IOBuffer::I32(particle_ids)),
            ],
            cell: Vec::new(),
        },
    }
}

fn push_point(buf: &mut Vec<f64>, point: &PathlinePoint, offset: [f64; 3]) {
    buf.extend_from_slice(&[point.x + offset[0], point.y + offset[1], point.z + offset[2]]);
}

/// Write the line file and the requested point clouds in one batch.
///
/// The divider thins the line output only; point clouds cover every particle.
pub fn export_pathlines(
    file: &PathlineFile,
    outputs: &PathlineOutputs,
    options: &PathlineExportOptions,
) -> Result<PathlineExportReport> {
    options.validate().map_err(ConvertError::InvalidOptions)?;

    let all: Vec<&Pathline> = file.pathlines.iter().collect();
    let selected = select_pathlines(&file.pathlines, options.divider);
    let line_points: usize = selected.iter().map(|p| p.len()).sum();

    let mut encoded = vec![(
        outputs.lines.clone(),
        encode_vtk(
            polydata_to_vtk(pathlines_polydata(&selected, options.offset, None), "MODPATH pathlines"),
            options.encoding,
        )?,
    )];
    if let Some(path) = &outputs.start_points {
        let piece = start_points_polydata(&all, options.offset);
        encoded.push((path.clone(), encode_vtk(polydata_to_vtk(piece, "MODPATH start points"), options.encoding)?));
    }
    if let Some(path) = &outputs.end_points {
        let piece = end_points_polydata(&all, options.offset);
        encoded.push((path.clone(), encode_vtk(polydata_to_vtk(piece, "MODPATH end points"), options.encoding)?));
    }

    let files = write_batch(&encoded)?;
    info!(
        lines = %outputs.lines.display(),
        pathlines = file.pathlines.len(),
        exported = selected.len(),
        points = line_points,
        "Exported pathlines"
    );

    Ok(PathlineExportReport {
        files,
        pathlines: file.pathlines.len(),
        exported_pathlines: selected.len(),
        line_points,
    })
}

/// Write `<stem>_<j>.vtk` for `j` in `1..=longest pathline` into `dir`.
///
/// File `j` holds every selected pathline truncated to its first `j` points.
/// The directory is created when missing.
pub fn export_pathline_timesteps(
    file: &PathlineFile,
    dir: impl AsRef<Path>,
    stem: &str,
    options: &PathlineExportOptions,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    options.validate().map_err(ConvertError::InvalidOptions)?;

    std::fs::create_dir_all(dir).map_err(|source| ConvertError::OutputWriteFailed {
        stage: Stage::WriteOutputs,
        path: dir.to_path_buf(),
        source,
    })?;

    let selected = select_pathlines(&file.pathlines, options.divider);
    let steps = selected.iter().map(|p| p.len()).max().unwrap_or(0);

    let mut encoded = Vec::with_capacity(steps);
    for j in 1..=steps {
        let piece = pathlines_polydata(&selected, options.offset, Some(j));
        let title = format!("MODPATH pathlines, first {} points", j);
        encoded.push((
            dir.join(format!("{}_{}.vtk", stem, j)),
            encode_vtk(polydata_to_vtk(piece, &title), options.encoding)?,
        ));
    }

    let files = write_batch(&encoded)?;
    info!(dir = %dir.display(), steps, pathlines = selected.len(), "Exported pathline timesteps");
    Ok(files)
}

fn write_batch(encoded: &[(PathBuf, Vec<u8>)]) -> Result<Vec<PathBuf>> {
    let mut batch = OutputBatch::new();
    for (path, bytes) in encoded {
        batch
            .stage(path, bytes)
            .map_err(|e| ConvertError::from_raster(Stage::WriteOutputs, path, e))?;
    }
    batch
        .commit()
        .map_err(|e| ConvertError::from_raster(Stage::WriteOutputs, Path::new(""), e))
}
