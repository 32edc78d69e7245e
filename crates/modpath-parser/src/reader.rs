//! Text pathline file reader.
//!
//! MODPATH 7 layout after `END HEADER`, per particle:
//!
//! ```text
//! SequenceNumber Group ParticleID PointCount
//! CellNumber X Y Z Time LocalX LocalY LocalZ Layer StressPeriod TimeStep   (PointCount lines)
//! ```
//!
//! MODPATH 6 writes one point per line, particles interleaved:
//!
//! ```text
//! ParticleID Group TimePointIndex CumulativeTimeStep Time X Y Z Layer Row Column Grid LocalX LocalY LocalZ LineSegmentIndex
//! ```

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ModpathError, Result};
use crate::types::{Pathline, PathlineFile, PathlineHeader, PathlinePoint, TrackingDirection};

const SIGNATURE: &str = "MODPATH_PATHLINE_FILE";

/// Read and parse a pathline file.
pub fn read_pathlines(path: impl AsRef<Path>) -> Result<PathlineFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ModpathError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_pathlines(&text)?;
    info!(
        path = %path.display(),
        version = file.header.version,
        pathlines = file.pathlines.len(),
        points = file.total_points(),
        "Read pathline file"
    );
    Ok(file)
}

/// Parse pathline file text.
pub fn parse_pathlines(text: &str) -> Result<PathlineFile> {
    // (1-based line number, trimmed content), blank lines dropped
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (_, first) = lines
        .next()
        .ok_or_else(|| ModpathError::UnknownFormat("empty file".to_string()))?;
    let mut header = PathlineHeader {
        version: parse_signature(first)?,
        ..Default::default()
    };

    let mut saw_end = false;
    for (line_no, line) in lines.by_ref() {
        if line.eq_ignore_ascii_case("END HEADER") {
            saw_end = true;
            break;
        }
        apply_header_values(&mut header, line, line_no);
    }
    if !saw_end {
        return Err(ModpathError::malformed(0, "missing END HEADER"));
    }

    let pathlines = match header.version {
        7 => parse_mp7_records(&mut lines)?,
        6 => parse_mp6_records(&mut lines)?,
        other => return Err(ModpathError::UnsupportedVersion(other)),
    };

    Ok(PathlineFile { header, pathlines })
}

fn parse_signature(line: &str) -> Result<u32> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(SIGNATURE) {
        return Err(ModpathError::UnknownFormat(line.chars().take(60).collect()));
    }
    let version: u32 = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ModpathError::malformed(1, "missing version after signature"))?;
    match version {
        6 | 7 => Ok(version),
        other => Err(ModpathError::UnsupportedVersion(other)),
    }
}

/// Pick up tracking direction, reference time and grid origin from a header line.
///
/// Non-numeric header lines are ignored.
fn apply_header_values(header: &mut PathlineHeader, line: &str, line_no: usize) {
    let values: Option<Vec<f64>> = line.split_whitespace().map(parse_real).collect();
    let Some(values) = values else {
        return;
    };
    let rest = match values.len() {
        5 => {
            header.direction = if values[0] as i64 == 2 {
                TrackingDirection::Backward
            } else {
                TrackingDirection::Forward
            };
            &values[1..]
        }
        4 => &values[..],
        _ => return,
    };
    header.reference_time = rest[0];
    header.x_origin = rest[1];
    header.y_origin = rest[2];
    header.rotation = rest[3];
    debug!(line = line_no, ?header, "Parsed pathline header values");
}

fn parse_mp7_records<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> Result<Vec<Pathline>> {
    let mut pathlines = Vec::new();

    while let Some((line_no, line)) = lines.next() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ModpathError::malformed(line_no, "expected pathline header with 4 fields"));
        }
        let group = parse_int(fields[1], line_no)?;
        let particle_id = parse_int(fields[2], line_no)?;
        let count = parse_int(fields[3], line_no)? as usize;

        // The count is untrusted until the points are actually read.
        let mut points = Vec::with_capacity(count.min(MAX_PREALLOCATED_POINTS));
        for _ in 0..count {
            let (pt_line_no, pt_line) = lines.next().ok_or_else(|| {
                ModpathError::malformed(line_no, format!("particle {} ends before {} points", particle_id, count))
            })?;
            let f: Vec<&str> = pt_line.split_whitespace().collect();
            if f.len() < 9 {
                return Err(ModpathError::malformed(pt_line_no, "expected at least 9 point fields"));
            }
            points.push(PathlinePoint {
                x: parse_field(f[1], pt_line_no)?,
                y: parse_field(f[2], pt_line_no)?,
                z: parse_field(f[3], pt_line_no)?,
                time: parse_field(f[4], pt_line_no)?,
                layer: parse_int(f[8], pt_line_no)?,
            });
        }

        pathlines.push(Pathline {
            particle_id,
            group,
            points,
        });
    }

    Ok(pathlines)
}

fn parse_mp6_records<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> Result<Vec<Pathline>> {
    let mut pathlines: Vec<Pathline> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for (line_no, line) in lines {
        let f: Vec<&str> = line.split_whitespace().collect();
        if f.len() < 9 {
            return Err(ModpathError::malformed(line_no, "expected at least 9 point fields"));
        }
        let particle_id = parse_int(f[0], line_no)?;
        let group = parse_int(f[1], line_no)?;
        let point = PathlinePoint {
            time: parse_field(f[4], line_no)?,
            x: parse_field(f[5], line_no)?,
            y: parse_field(f[6], line_no)?,
            z: parse_field(f[7], line_no)?,
            layer: parse_int(f[8], line_no)?,
        };

        let slot = *index.entry(particle_id).or_insert_with(|| {
            pathlines.push(Pathline {
                particle_id,
                group,
                points: Vec::new(),
            });
            pathlines.len() - 1
        });
        pathlines[slot].points.push(point);
    }

    Ok(pathlines)
}

/// Parse a real, accepting Fortran `D` exponents.
fn parse_real(token: &str) -> Option<f64> {
    if token.contains(['D', 'd']) {
        token.replace(['D', 'd'], "E").parse().ok()
    } else {
        token.parse().ok()
    }
}

fn parse_field(token: &str, line_no: usize) -> Result<f64> {
    parse_real(token).ok_or_else(|| ModpathError::malformed(line_no, format!("invalid number '{}'", token)))
}

/// Upper bound on points reserved from a record header before reading them.
const MAX_PREALLOCATED_POINTS: usize = 1024;

fn parse_int(token: &str, line_no: usize) -> Result<u32> {
    token
        .parse()
        .map_err(|_| ModpathError::malformed(line_no, format!("invalid integer '{}'", token)))
}
