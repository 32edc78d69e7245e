//! MODPATH particle pathline reader.
//!
//! Parses the text pathline output of MODPATH 6 and 7 into [`PathlineFile`]:
//! one [`Pathline`] per particle, points in tracking order.
//!
//! # Example
//!
//! ```ignore
//! use modpath_parser::read_pathlines;
//!
//! let file = read_pathlines("model.mppth")?;
//! for line in &file.pathlines {
//!     println!("particle {} has {} points", line.particle_id, line.len());
//! }
//! ```

pub mod error;
pub mod reader;
pub mod types;

pub use error::{ModpathError, Result};
pub use reader::{parse_pathlines, read_pathlines};
pub use types::{Pathline, PathlineFile, PathlineHeader, PathlinePoint, TrackingDirection};
