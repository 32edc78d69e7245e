//! Options for raster and pathline conversion.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with mesh vertices whose texture coordinates fall outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TexturePolicy {
    /// Clamp to the image border and log how many vertices were affected.
    #[default]
    Clamp,
    /// Keep the raw projected coordinates.
    Extrapolate,
    /// Fail the conversion.
    Reject,
}

impl FromStr for TexturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "extrapolate" => Ok(Self::Extrapolate),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown texture policy '{}' (clamp, extrapolate, reject)", other)),
        }
    }
}

impl fmt::Display for TexturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clamp => "clamp",
            Self::Extrapolate => "extrapolate",
            Self::Reject => "reject",
        })
    }
}

/// Data section encoding of VTK legacy files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VtkEncoding {
    /// Big-endian binary.
    #[default]
    Binary,
    Ascii,
}

impl FromStr for VtkEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "ascii" => Ok(Self::Ascii),
            other => Err(format!("unknown VTK encoding '{}' (binary, ascii)", other)),
        }
    }
}

/// Options for [`convert`](crate::convert::convert).
///
/// Band numbers are 1-based, as in GDAL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Multiplier applied to elevation samples when warping the surface.
    pub height_scale: f64,

    /// Nodata sentinel overriding the one declared by the elevation file.
    pub nodata: Option<f64>,

    /// Elevation band to use. Required when the raster has several bands.
    pub elevation_band: Option<usize>,

    /// Image bands to encode into the texture (1 to 4 of them).
    pub image_bands: Option<Vec<usize>>,

    /// Coordinate reference system label written into the mesh header.
    pub crs: Option<String>,

    /// Name of the per-vertex elevation attribute.
    pub scalar_name: String,

    /// Handling of vertices outside the image extent.
    pub texture_policy: TexturePolicy,

    /// VTK data encoding.
    pub encoding: VtkEncoding,

    /// Mesh output path.
    pub mesh_output: PathBuf,

    /// Texture output path, used only when an image raster is given.
    pub texture_output: PathBuf,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            height_scale: 1.0,
            nodata: None,
            elevation_band: None,
            image_bands: None,
            crs: None,
            scalar_name: "Elevation".to_string(),
            texture_policy: TexturePolicy::Clamp,
            encoding: VtkEncoding::Binary,
            mesh_output: PathBuf::from("output.vtk"),
            texture_output: PathBuf::from("satellite.png"),
        }
    }
}

impl ConversionOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), String> {
        if !self.height_scale.is_finite() {
            return Err("height_scale must be finite".to_string());
        }

        if self.scalar_name.is_empty() || self.scalar_name.chars().any(char::is_whitespace) {
            return Err("scalar_name must be a non-empty name without whitespace".to_string());
        }

        if self.elevation_band == Some(0) {
            return Err("elevation_band is 1-based".to_string());
        }

        if let Some(bands) = &self.image_bands {
            if bands.is_empty() || bands.len() > 4 {
                return Err("image_bands must select 1-4 bands".to_string());
            }
            if bands.contains(&0) {
                return Err("image_bands are 1-based".to_string());
            }
        }

        if self.mesh_output == self.texture_output {
            return Err("mesh_output and texture_output must differ".to_string());
        }

        Ok(())
    }
}

/// Options for pathline export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathlineExportOptions {
    /// Keep every n-th pathline in the line output.
    pub divider: usize,

    /// Added to every point (x, y, z).
    pub offset: [f64; 3],

    /// VTK data encoding.
    pub encoding: VtkEncoding,
}

impl Default for PathlineExportOptions {
    fn default() -> Self {
        Self {
            divider: 1,
            offset: [0.0; 3],
            encoding: VtkEncoding::Binary,
        }
    }
}

impl PathlineExportOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), String> {
        if self.divider == 0 {
            return Err("divider must be > 0".to_string());
        }

        if self.offset.iter().any(|v| !v.is_finite()) {
            return Err("offset must be finite".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let opts = ConversionOptions::default();
        assert_eq!(opts.height_scale, 1.0);
        assert_eq!(opts.scalar_name, "Elevation");
        assert_eq!(opts.texture_policy, TexturePolicy::Clamp);
        assert!(opts.validate().is_ok());
        assert!(PathlineExportOptions::default().validate().is_ok());
    }

    #[test]
    fn test_zero_and_negative_scale_allowed() {
        for scale in [0.0, -3.5] {
            let opts = ConversionOptions {
                height_scale: scale,
                ..Default::default()
            };
            assert!(opts.validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_options() {
        let nan_scale = ConversionOptions {
            height_scale: f64::NAN,
            ..Default::default()
        };
        assert!(nan_scale.validate().is_err());

        let bad_name = ConversionOptions {
            scalar_name: "ground level".to_string(),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());

        let too_many = ConversionOptions {
            image_bands: Some(vec![1, 2, 3, 4, 5]),
            ..Default::default()
        };
        assert!(too_many.validate().is_err());

        let same_output = ConversionOptions {
            texture_output: PathBuf::from("output.vtk"),
            ..Default::default()
        };
        assert!(same_output.validate().is_err());

        let no_divider = PathlineExportOptions {
            divider: 0,
            ..Default::default()
        };
        assert!(no_divider.validate().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Reject".parse::<TexturePolicy>(), Ok(TexturePolicy::Reject));
        assert_eq!("ascii".parse::<VtkEncoding>(), Ok(VtkEncoding::Ascii));
        assert!("wrap".parse::<TexturePolicy>().is_err());
        assert_eq!(TexturePolicy::Extrapolate.to_string(), "extrapolate");
    }
}
