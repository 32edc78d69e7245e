//! End-to-end conversion of raster fixtures into VTK surfaces and textures.

use std::path::{Path, PathBuf};

use mesh_export::{convert, ConversionOptions, ConvertError, Stage, TexturePolicy, VtkEncoding};
use test_utils::{
    assert_approx_eq, create_test_rgb_pixels, grid, temp_test_dir, write_ascii_grid, write_geotiff, write_rgb_png,
};
use vtkio::model::{Attribute, DataArray, DataSet, ElementType, IOBuffer, Piece, StructuredGridPiece, Vtk};

const SCENARIO: [f32; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 5000.0, 7.0, 8.0, 9.0];

fn options_in(dir: &Path) -> ConversionOptions {
    ConversionOptions {
        mesh_output: dir.join("output.vtk"),
        texture_output: dir.join("satellite.png"),
        ..Default::default()
    }
}

fn load_surface(path: &Path) -> StructuredGridPiece {
    let vtk = Vtk::import(path).expect("mesh should parse");
    let DataSet::StructuredGrid { pieces, .. } = vtk.data else {
        panic!("expected a structured grid");
    };
    match pieces.into_iter().next() {
        Some(Piece::Inline(piece)) => *piece,
        _ => panic!("expected one inline piece"),
    }
}

fn points(piece: &StructuredGridPiece) -> Vec<f64> {
    match &piece.points {
        IOBuffer::F64(v) => v.clone(),
        IOBuffer::F32(v) => v.iter().map(|&x| x as f64).collect(),
        other => panic!("unexpected point buffer {:?}", other),
    }
}

fn point_array(piece: &StructuredGridPiece, wanted: &str) -> IOBuffer {
    piece
        .data
        .point
        .iter()
        .find_map(|attr| match attr {
            Attribute::DataArray(DataArray { name, data, .. }) if name == wanted => Some(data.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no point array named {}", wanted))
}

fn as_f64(buf: IOBuffer) -> Vec<f64> {
    match buf {
        IOBuffer::F64(v) => v,
        IOBuffer::F32(v) => v.into_iter().map(|x| x as f64).collect(),
        other => panic!("unexpected buffer {:?}", other),
    }
}

fn scenario_dem(dir: &Path) -> PathBuf {
    write_ascii_grid(dir, "dem.asc", &grid::SMALL_3X3, &SCENARIO, Some(5000.0))
}

#[test]
fn test_nodata_scenario_with_scale_two() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let options = ConversionOptions {
        height_scale: 2.0,
        ..options_in(dir.path())
    };

    let report = convert(&dem, None, &options).unwrap();
    assert_eq!(report.vertex_count, 9);
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.elevation_range, Some((1.0, 9.0)));
    assert_eq!(report.z_range, Some((2.0, 18.0)));
    assert!(report.texture_image_file.is_none());

    let piece = load_surface(&report.mesh_file);
    let xyz = points(&piece);
    let elevation = as_f64(point_array(&piece, "Elevation"));
    assert_eq!(xyz.len(), 27);
    assert_eq!(elevation.len(), 9);

    // Column-major: vertex (row, col) is at col * 3 + row.
    for col in 0..3 {
        for row in 0..3 {
            let idx = col * 3 + row;
            let sample = SCENARIO[row * 3 + col] as f64;
            if row == 1 && col == 2 {
                assert!(elevation[idx].is_nan(), "missing cell should be NaN");
            } else {
                assert_eq!(elevation[idx], sample);
                assert_approx_eq!(xyz[idx * 3 + 2], 2.0 * sample, 1e-12);
            }
            assert_approx_eq!(xyz[idx * 3], 5.0 + 10.0 * col as f64, 1e-12);
            assert_approx_eq!(xyz[idx * 3 + 1], 25.0 - 10.0 * row as f64, 1e-12);
        }
    }
}

#[test]
fn test_geotiff_elevation_matches_ascii_grid() {
    let dir = temp_test_dir();
    let tif = write_geotiff(dir.path(), "dem.tif", &grid::SMALL_3X3, &SCENARIO, Some(5000.0));
    let options = ConversionOptions {
        height_scale: 2.0,
        ..options_in(dir.path())
    };

    let report = convert(&tif, None, &options).unwrap();
    assert_eq!((report.rows, report.cols), (3, 3));
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.z_range, Some((2.0, 18.0)));
    let from_tiff = std::fs::read(&report.mesh_file).unwrap();

    let asc = scenario_dem(dir.path());
    convert(&asc, None, &options).unwrap();
    assert_eq!(std::fs::read(&options.mesh_output).unwrap(), from_tiff);
}

#[test]
fn test_zero_scale_flattens_but_keeps_elevation() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let options = ConversionOptions {
        height_scale: 0.0,
        ..options_in(dir.path())
    };

    let report = convert(&dem, None, &options).unwrap();
    let piece = load_surface(&report.mesh_file);
    let xyz = points(&piece);
    assert!(xyz.chunks(3).all(|p| p[2] == 0.0));

    let elevation = as_f64(point_array(&piece, "Elevation"));
    assert_eq!(elevation[0], 1.0);
    assert_eq!(elevation[8], 9.0);
}

#[test]
fn test_round_trip_vertex_count() {
    let dir = temp_test_dir();
    let data = test_utils::create_hill_grid(4, 3, 100.0, 25.0);
    let dem = write_ascii_grid(dir.path(), "hill.asc", &grid::UTM_4X3, &data, None);

    for encoding in [VtkEncoding::Binary, VtkEncoding::Ascii] {
        let options = ConversionOptions {
            encoding,
            ..options_in(dir.path())
        };
        let report = convert(&dem, None, &options).unwrap();
        let piece = load_surface(&report.mesh_file);
        assert_eq!(points(&piece).len() / 3, 4 * 3);
        assert_eq!(report.rows, 3);
        assert_eq!(report.cols, 4);
    }
}

#[test]
fn test_texture_corners_and_image() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let pixels = create_test_rgb_pixels(3, 3);
    let image = write_rgb_png(dir.path(), "ortho.png", &grid::SMALL_3X3, &pixels);

    let options = options_in(dir.path());
    let report = convert(&dem, Some(&image), &options).unwrap();
    assert_eq!(report.texture_out_of_extent, 0);
    let texture_path = report.texture_image_file.clone().expect("texture written");

    let piece = load_surface(&report.mesh_file);
    let has_tcoords = piece.data.point.iter().any(|attr| {
        matches!(attr, Attribute::DataArray(DataArray { elem: ElementType::TCoords(2), .. }))
    });
    assert!(has_tcoords);

    let uv = as_f64(point_array(&piece, "TextureCoordinates"));
    let at = |row: usize, col: usize| {
        let idx = col * 3 + row;
        (uv[idx * 2], uv[idx * 2 + 1])
    };
    // Bottom-left, bottom-right, top-left, top-right.
    assert_eq!(at(2, 0), (0.0, 0.0));
    assert_eq!(at(2, 2), (1.0, 0.0));
    assert_eq!(at(0, 0), (0.0, 1.0));
    assert_eq!(at(0, 2), (1.0, 1.0));

    let decoded = image::open(&texture_path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (3, 3));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_mesh_is_byte_identical_across_runs() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let options = ConversionOptions {
        height_scale: 3.0,
        ..options_in(dir.path())
    };

    convert(&dem, None, &options).unwrap();
    let first = std::fs::read(&options.mesh_output).unwrap();
    convert(&dem, None, &options).unwrap();
    let second = std::fs::read(&options.mesh_output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_elevation_input() {
    let dir = temp_test_dir();
    let options = options_in(dir.path());
    let err = convert(dir.path().join("absent.asc"), None, &options).unwrap_err();

    assert!(matches!(err, ConvertError::InputNotFound { stage: Stage::ReadElevation, .. }));
    assert!(!options.mesh_output.exists());
}

#[test]
fn test_missing_image_writes_nothing() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let options = options_in(dir.path());
    let missing = dir.path().join("absent.png");

    let err = convert(&dem, Some(&missing), &options).unwrap_err();
    assert!(matches!(err, ConvertError::InputNotFound { stage: Stage::ReadImage, .. }));
    assert!(!options.mesh_output.exists());
}

#[test]
fn test_unwritable_texture_leaves_no_mesh() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let image = write_rgb_png(dir.path(), "ortho.png", &grid::SMALL_3X3, &create_test_rgb_pixels(3, 3));
    let options = ConversionOptions {
        texture_output: dir.path().join("no_such_dir").join("satellite.png"),
        ..options_in(dir.path())
    };

    let err = convert(&dem, Some(&image), &options).unwrap_err();
    assert!(matches!(err, ConvertError::OutputWriteFailed { stage: Stage::WriteOutputs, .. }));
    assert!(!options.mesh_output.exists());
}

#[test]
fn test_missing_output_directory() {
    let dir = temp_test_dir();
    let dem = scenario_dem(dir.path());
    let options = ConversionOptions {
        mesh_output: dir.path().join("no_such_dir").join("output.vtk"),
        ..options_in(dir.path())
    };

    let err = convert(&dem, None, &options).unwrap_err();
    assert!(matches!(err, ConvertError::OutputWriteFailed { .. }));
}

#[test]
fn test_multiband_elevation_needs_band() {
    let dir = temp_test_dir();
    let rgb = write_rgb_png(dir.path(), "rgb.png", &grid::SMALL_3X3, &create_test_rgb_pixels(3, 3));

    let err = convert(&rgb, None, &options_in(dir.path())).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedRasterShape { .. }));

    let options = ConversionOptions {
        elevation_band: Some(2),
        ..options_in(dir.path())
    };
    let report = convert(&rgb, None, &options).unwrap();
    assert_eq!(report.vertex_count, 9);
}

#[test]
fn test_reject_policy_for_smaller_image() {
    let dir = temp_test_dir();
    let data = test_utils::create_constant_grid(4, 3, 10.0);
    let dem = write_ascii_grid(dir.path(), "dem.asc", &grid::UTM_4X3, &data, None);
    let mut spec = grid::UTM_4X3;
    spec.width = 2;
    let image = write_rgb_png(dir.path(), "half.png", &spec, &create_test_rgb_pixels(2, 3));

    let options = ConversionOptions {
        texture_policy: TexturePolicy::Reject,
        ..options_in(dir.path())
    };
    let err = convert(&dem, Some(&image), &options).unwrap_err();
    assert!(matches!(err, ConvertError::TextureOutOfExtent { count: 6, .. }));
    assert!(!options.mesh_output.exists());

    let clamped = convert(&dem, Some(&image), &options_in(dir.path())).unwrap();
    assert_eq!(clamped.texture_out_of_extent, 6);
}
