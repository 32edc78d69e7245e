//! Reading pathline files written in the MODPATH 7 fixed layout.

use modpath_parser::{read_pathlines, ModpathError, TrackingDirection};
use test_utils::{temp_test_dir, write_mp7_pathlines, FixturePathline};

#[test]
fn test_reads_fixture_file() {
    let dir = temp_test_dir();
    let path = write_mp7_pathlines(
        dir.path(),
        "wells.mppth",
        &[
            FixturePathline {
                particle_id: 1,
                points: vec![(10.0, 20.0, 5.0, 0.0), (12.5, 21.0, 4.5, 30.0), (15.0, 22.0, 4.0, 60.0)],
            },
            FixturePathline {
                particle_id: 2,
                points: vec![(100.0, 200.0, 1.0, 0.0)],
            },
        ],
    );

    let file = read_pathlines(&path).unwrap();
    assert_eq!(file.header.version, 7);
    assert_eq!(file.header.direction, TrackingDirection::Forward);
    assert_eq!(file.pathlines.len(), 2);
    assert_eq!(file.total_points(), 4);

    let first = &file.pathlines[0];
    assert_eq!(first.particle_id, 1);
    let end = first.end().unwrap();
    assert!((end.x - 15.0).abs() < 1e-9);
    assert!((end.y - 22.0).abs() < 1e-9);
    assert!((end.time - 60.0).abs() < 1e-9);
    assert_eq!(end.layer, 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = temp_test_dir();
    let err = read_pathlines(dir.path().join("absent.mppth")).unwrap_err();
    assert!(matches!(err, ModpathError::Io { .. }));
}
