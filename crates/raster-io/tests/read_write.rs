//! Reading fixtures from disk, resampling and writing them back.

use raster_io::{read_raster, resample, write_raster, InterpolationMethod, RasterError, SampleType};
use raster_io::GeoTransform;
use test_utils::{
    assert_approx_eq, assert_coords_approx_eq, create_test_grid, create_test_rgb_pixels, grid, temp_test_dir,
    with_sentinel, write_ascii_grid, write_geotiff, write_rgb_png, GridSpec,
};

const TIFF_3X2: GridSpec = GridSpec {
    width: 3,
    height: 2,
    xll: 100.0,
    yll: 180.0,
    cellsize: 10.0,
};

#[test]
fn test_ascii_grid_georeferencing() {
    let dir = temp_test_dir();
    let spec = grid::UTM_4X3;
    let data = with_sentinel(create_test_grid(4, 3), 4, &[(3, 0)], -9999.0);
    let path = write_ascii_grid(dir.path(), "dem.asc", &spec, &data, Some(-9999.0));

    let raster = read_raster(&path).unwrap();
    assert_eq!((raster.width, raster.height, raster.band_count), (4, 3, 1));
    assert_eq!(raster.nodata, Some(-9999.0));
    assert!(raster.is_nodata(raster.get(0, 0, 3).unwrap()));
    assert_eq!(raster.get(0, 2, 1), Some(1002.0));

    let (x0, x1) = spec.x_center_range();
    let (y0, y1) = spec.y_center_range();
    let xs = raster.x_coords();
    let ys = raster.y_coords();
    // Row 0 is the top row.
    assert_coords_approx_eq!((xs[0], ys[0]), (x0, y1), 1e-9);
    assert_coords_approx_eq!((xs[3], ys[2]), (x1, y0), 1e-9);
}

#[test]
fn test_png_with_world_file() {
    let dir = temp_test_dir();
    let spec = grid::SMALL_3X3;
    let pixels = create_test_rgb_pixels(3, 3);
    let path = write_rgb_png(dir.path(), "ortho.png", &spec, &pixels);

    let raster = read_raster(&path).unwrap();
    assert_eq!(raster.band_count, 3);
    assert_eq!(raster.sample_type, SampleType::U8);
    assert_eq!(raster.get(1, 2, 0), Some(pixels[(2 * 3) * 3 + 1] as f32));

    let extent = raster.center_extent();
    assert_approx_eq!(extent.min_x, 5.0, 1e-9);
    assert_approx_eq!(extent.max_y, 25.0, 1e-9);
}

#[test]
fn test_resample_and_write_ascii() {
    let dir = temp_test_dir();
    let spec = grid::UTM_4X3;
    let path = write_ascii_grid(dir.path(), "dem.asc", &spec, &vec![10.0; 12], None);
    let raster = read_raster(&path).unwrap();

    let doubled = resample(&raster, 2.0, InterpolationMethod::Bilinear).unwrap();
    assert_eq!((doubled.width, doubled.height), (8, 6));
    assert_eq!(doubled.transform.pixel_width, 15.0);
    assert!(doubled.data.iter().all(|&v| (v - 10.0).abs() < 1e-5));

    let out = dir.path().join("dem_x2.asc");
    let written = write_raster(&doubled, &out).unwrap();
    assert_eq!(written, vec![out.clone()]);

    let again = read_raster(&out).unwrap();
    assert_eq!((again.width, again.height), (8, 6));
    assert_approx_eq!(again.transform.origin_x, spec.xll, 1e-6);
}

#[test]
fn test_write_png_round_trip() {
    let dir = temp_test_dir();
    let spec = grid::SMALL_3X3;
    let pixels = create_test_rgb_pixels(3, 3);
    let source = read_raster(write_rgb_png(dir.path(), "in.png", &spec, &pixels)).unwrap();

    let out = dir.path().join("out.png");
    let written = write_raster(&source, &out).unwrap();
    assert_eq!(written.len(), 2);
    assert!(out.with_extension("pgw").exists());

    let decoded = image::open(&out).unwrap().to_rgb8();
    assert_eq!(decoded.into_raw(), pixels);

    let reread = read_raster(&out).unwrap();
    assert_eq!(reread.transform, source.transform);
}

#[test]
fn test_geotiff_tiepoint_and_nodata() {
    let dir = temp_test_dir();
    let data = [1.0, 2.0, 3.0, 4.0, -9999.0, 6.0];
    let path = write_geotiff(dir.path(), "dem.tif", &TIFF_3X2, &data, Some(-9999.0));

    let raster = read_raster(&path).unwrap();
    assert_eq!((raster.width, raster.height, raster.band_count), (3, 2, 1));
    assert_eq!(raster.sample_type, SampleType::F32);
    assert_eq!(raster.nodata, Some(-9999.0));
    assert_eq!(raster.transform, GeoTransform::north_up(100.0, 200.0, 10.0, 10.0));
    assert_eq!(raster.x_coords(), vec![105.0, 115.0, 125.0]);
    assert_eq!(raster.y_coords(), vec![195.0, 185.0]);
    assert_eq!(raster.get(0, 0, 2), Some(3.0));
    assert!(raster.is_nodata(raster.get(0, 1, 1).unwrap()));
}

#[test]
fn test_resample_geotiff_to_geotiff() {
    let dir = temp_test_dir();
    let data = [5.0; 6];
    let source = read_raster(write_geotiff(dir.path(), "dem.tif", &TIFF_3X2, &data, Some(-9999.0))).unwrap();

    let doubled = resample(&source, 2.0, InterpolationMethod::Nearest).unwrap();
    let out = dir.path().join("dem_x2.tif");
    assert_eq!(write_raster(&doubled, &out).unwrap(), vec![out.clone()]);

    let reread = read_raster(&out).unwrap();
    assert_eq!((reread.width, reread.height), (6, 4));
    assert_eq!(reread.sample_type, SampleType::F32);
    assert_eq!(reread.nodata, Some(-9999.0));
    assert_eq!(reread.transform, GeoTransform::north_up(100.0, 200.0, 5.0, 5.0));
    assert!(reread.data.iter().all(|&v| v == 5.0));
}

#[test]
fn test_write_rgb_geotiff_keeps_bytes() {
    let dir = temp_test_dir();
    let pixels = create_test_rgb_pixels(3, 3);
    let source = read_raster(write_rgb_png(dir.path(), "in.png", &grid::SMALL_3X3, &pixels)).unwrap();

    let out = dir.path().join("ortho.tif");
    write_raster(&source, &out).unwrap();

    let reread = read_raster(&out).unwrap();
    assert_eq!(reread.band_count, 3);
    assert_eq!(reread.sample_type, SampleType::U8);
    assert_eq!(reread.transform, source.transform);
    assert_eq!(reread.data, source.data);
}

#[test]
fn test_unknown_extension() {
    let dir = temp_test_dir();
    let path = dir.path().join("heads.hds");
    std::fs::write(&path, b"binary").unwrap();
    let err = read_raster(&path).unwrap_err();
    assert!(matches!(err, RasterError::UnsupportedFormat(_)));
}
