//! Pathline data types.

/// One tracked position of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathlinePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Tracking time at this point.
    pub time: f64,
    /// Model layer (1-based).
    pub layer: u32,
}

/// The full track of one particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Pathline {
    pub particle_id: u32,
    pub group: u32,
    pub points: Vec<PathlinePoint>,
}

impl Pathline {
    /// First tracked point.
    pub fn start(&self) -> Option<&PathlinePoint> {
        self.points.first()
    }

    /// Last tracked point.
    pub fn end(&self) -> Option<&PathlinePoint> {
        self.points.last()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the pathline has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Tracking direction recorded in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingDirection {
    #[default]
    Forward,
    Backward,
}

/// Values from the pathline file header.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathlineHeader {
    /// MODPATH major version (6 or 7).
    pub version: u32,
    pub direction: TrackingDirection,
    pub reference_time: f64,
    pub x_origin: f64,
    pub y_origin: f64,
    /// Grid rotation in degrees.
    pub rotation: f64,
}

/// A parsed pathline file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathlineFile {
    pub header: PathlineHeader,
    pub pathlines: Vec<Pathline>,
}

impl PathlineFile {
    /// Length of the longest pathline.
    pub fn max_points(&self) -> usize {
        self.pathlines.iter().map(Pathline::len).max().unwrap_or(0)
    }

    /// Total number of points over all pathlines.
    pub fn total_points(&self) -> usize {
        self.pathlines.iter().map(Pathline::len).sum()
    }
}
