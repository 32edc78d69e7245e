//! GeoTIFF reading and writing through the `tiff` crate.
//!
//! Georeferencing is taken from (and written to) the model tags:
//! - `ModelTransformationTag` (full 4x4 affine), or
//! - `ModelTiepointTag` + `ModelPixelScaleTag` (north-up).
//!
//! The nodata value comes from the `GDAL_NODATA` ASCII tag. Raster-space
//! registration (PixelIsArea) is assumed, matching GDAL's default.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::{ColorType, TiffResult};
use tracing::{debug, warn};

use crate::error::{RasterError, Result};
use crate::transform::GeoTransform;
use crate::types::{Raster, SampleType};

/// Read the first image of a (Geo)TIFF file.
pub fn read_geotiff(path: &Path) -> Result<Raster> {
    let file = File::open(path).map_err(|e| RasterError::not_found(path, e))?;
    let decode_err = |e: tiff::TiffError| RasterError::decode(path, e.to_string());

    let mut decoder = Decoder::new(BufReader::new(file)).map_err(decode_err)?;
    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let (width, height) = (width as usize, height as usize);

    let band_count = match decoder.colortype().map_err(decode_err)? {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
        ColorType::Multiband { num_samples, .. } => num_samples as usize,
        other => {
            return Err(RasterError::unsupported_shape(format!(
                "unsupported TIFF color type {:?} in {}",
                other,
                path.display()
            )))
        }
    };

    let transformation = find_f64_tag(&mut decoder, Tag::ModelTransformationTag, path)?;
    let tiepoint = find_f64_tag(&mut decoder, Tag::ModelTiepointTag, path)?;
    let pixel_scale = find_f64_tag(&mut decoder, Tag::ModelPixelScaleTag, path)?;
    let nodata = match decoder.find_tag(Tag::GdalNodata).map_err(decode_err)? {
        Some(value) => parse_gdal_nodata(&value.into_string().map_err(decode_err)?),
        None => None,
    };

    let transform = match transform_from_tags(
        transformation.as_deref(),
        tiepoint.as_deref(),
        pixel_scale.as_deref(),
    ) {
        Some(t) => t,
        None => {
            warn!(path = %path.display(), "TIFF has no georeferencing tags, using pixel coordinates");
            GeoTransform::pixel_space(height)
        }
    };

    let (interleaved, sample_type) = match decoder.read_image().map_err(decode_err)? {
        DecodingResult::U8(v) => (widen(&v), SampleType::U8),
        DecodingResult::U16(v) => (widen(&v), SampleType::U16),
        DecodingResult::U32(v) => (v.iter().map(|&x| x as f32).collect(), SampleType::U32),
        DecodingResult::U64(v) => (v.iter().map(|&x| x as f32).collect(), SampleType::U64),
        DecodingResult::I8(v) => (widen(&v), SampleType::I8),
        DecodingResult::I16(v) => (widen(&v), SampleType::I16),
        DecodingResult::I32(v) => (v.iter().map(|&x| x as f32).collect(), SampleType::I32),
        DecodingResult::I64(v) => (v.iter().map(|&x| x as f32).collect(), SampleType::I64),
        DecodingResult::F16(v) => (v.iter().map(|x| x.to_f32()).collect(), SampleType::F32),
        DecodingResult::F32(v) => (v, SampleType::F32),
        DecodingResult::F64(v) => (v.iter().map(|&x| x as f32).collect(), SampleType::F64),
    };

    debug!(
        path = %path.display(),
        width,
        height,
        band_count,
        sample_type = ?sample_type,
        nodata = ?nodata,
        "Decoded GeoTIFF"
    );

    Ok(
        Raster::from_interleaved(width, height, band_count, &interleaved, transform)?
            .with_nodata(nodata)
            .with_sample_type(sample_type),
    )
}

fn widen<T: Copy + Into<f32>>(values: &[T]) -> Vec<f32> {
    values.iter().map(|&v| v.into()).collect()
}

fn find_f64_tag<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
    path: &Path,
) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(tag) {
        Ok(Some(value)) => value
            .into_f64_vec()
            .map(Some)
            .map_err(|e| RasterError::decode(path, e.to_string())),
        Ok(None) => Ok(None),
        Err(e) => Err(RasterError::decode(path, e.to_string())),
    }
}

/// Derive an affine transform from GeoTIFF model tags.
///
/// `transformation` is the 16-value row-major matrix of
/// `ModelTransformationTag`; `tiepoint` is `(I, J, K, X, Y, Z)` and
/// `pixel_scale` is `(ScaleX, ScaleY, ScaleZ)`. Returns `None` when neither
/// combination is present.
pub fn transform_from_tags(
    transformation: Option<&[f64]>,
    tiepoint: Option<&[f64]>,
    pixel_scale: Option<&[f64]>,
) -> Option<GeoTransform> {
    if let Some(m) = transformation.filter(|m| m.len() >= 16) {
        return Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
    }

    match (tiepoint, pixel_scale) {
        (Some(tp), Some(scale)) if tp.len() >= 6 && scale.len() >= 2 => {
            let (i, j, x, y) = (tp[0], tp[1], tp[3], tp[4]);
            let (sx, sy) = (scale[0], scale[1]);
            Some(GeoTransform::north_up(x - i * sx, y + j * sy, sx, sy))
        }
        _ => None,
    }
}

/// Georeferencing tags for one output image.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTags {
    pub pixel_scale: Option<[f64; 3]>,
    pub tiepoint: Option<[f64; 6]>,
    pub transformation: Option<[f64; 16]>,
    pub nodata: Option<String>,
}

impl GeoTags {
    /// Tie point + pixel scale for north-up rasters, the full matrix otherwise.
    pub fn for_raster(raster: &Raster) -> Self {
        let t = &raster.transform;
        let (pixel_scale, tiepoint, transformation) = if !t.is_rotated() && t.pixel_height < 0.0 {
            (
                Some([t.pixel_width, -t.pixel_height, 0.0]),
                Some([0.0, 0.0, 0.0, t.origin_x, t.origin_y, 0.0]),
                None,
            )
        } else {
            let m = [
                t.pixel_width, t.row_rotation, 0.0, t.origin_x, //
                t.col_rotation, t.pixel_height, 0.0, t.origin_y, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            (None, None, Some(m))
        };

        Self {
            pixel_scale,
            tiepoint,
            transformation,
            nodata: raster.nodata.map(format_gdal_nodata),
        }
    }
}

/// Key directory header plus GTRasterTypeGeoKey = RasterPixelIsArea.
const GEO_KEY_DIRECTORY: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 1];

/// Encode a raster as a GeoTIFF in memory.
///
/// The TIFF sample format follows `raster.sample_type`:
/// - one band keeps U8, U16, I16, I32, F32 and F64; other types become F32,
/// - three or four bands are written as 8-bit RGB(A) for U8 sources and as
///   32-bit float RGB(A) otherwise.
///
/// Integer outputs round samples and write NaN as the nodata value (or 0).
pub fn encode_geotiff(raster: &Raster) -> Result<Vec<u8>> {
    let tags = GeoTags::for_raster(raster);
    let (w, h) = (raster.width as u32, raster.height as u32);
    let fill = raster.nodata.unwrap_or(0.0) as f32;
    let samples = interleave(raster);
    let int = |v: f32| if v.is_nan() { fill.round() } else { v.round() };

    let encoded = match (raster.band_count, raster.sample_type) {
        (1, SampleType::U8) => {
            let data: Vec<u8> = samples.iter().map(|&v| int(v) as u8).collect();
            encode_image::<colortype::Gray8>(w, h, &data, &tags)
        }
        (1, SampleType::U16) => {
            let data: Vec<u16> = samples.iter().map(|&v| int(v) as u16).collect();
            encode_image::<colortype::Gray16>(w, h, &data, &tags)
        }
        (1, SampleType::I16) => {
            let data: Vec<i16> = samples.iter().map(|&v| int(v) as i16).collect();
            encode_image::<colortype::GrayI16>(w, h, &data, &tags)
        }
        (1, SampleType::I32) => {
            let data: Vec<i32> = samples.iter().map(|&v| int(v) as i32).collect();
            encode_image::<colortype::GrayI32>(w, h, &data, &tags)
        }
        (1, SampleType::F64) => {
            let data: Vec<f64> = samples.iter().map(|&v| v as f64).collect();
            encode_image::<colortype::Gray64Float>(w, h, &data, &tags)
        }
        (1, _) => encode_image::<colortype::Gray32Float>(w, h, &samples, &tags),
        (3, SampleType::U8) => {
            let data: Vec<u8> = samples.iter().map(|&v| int(v) as u8).collect();
            encode_image::<colortype::RGB8>(w, h, &data, &tags)
        }
        (4, SampleType::U8) => {
            let data: Vec<u8> = samples.iter().map(|&v| int(v) as u8).collect();
            encode_image::<colortype::RGBA8>(w, h, &data, &tags)
        }
        (3, _) => encode_image::<colortype::RGB32Float>(w, h, &samples, &tags),
        (4, _) => encode_image::<colortype::RGBA32Float>(w, h, &samples, &tags),
        (n, _) => {
            return Err(RasterError::unsupported_shape(format!(
                "GeoTIFF output needs 1, 3 or 4 bands, raster has {}",
                n
            )))
        }
    };

    encoded.map_err(|e| RasterError::Encode(format!("GeoTIFF: {}", e)))
}

fn encode_image<C>(width: u32, height: u32, data: &[C::Inner], tags: &GeoTags) -> TiffResult<Vec<u8>>
where
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor)?;
        let mut image = encoder.new_image::<C>(width, height)?;
        let dir = image.encoder();
        dir.write_tag(Tag::GeoKeyDirectoryTag, &GEO_KEY_DIRECTORY[..])?;
        if let Some(scale) = &tags.pixel_scale {
            dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
        }
        if let Some(tiepoint) = &tags.tiepoint {
            dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
        }
        if let Some(matrix) = &tags.transformation {
            dir.write_tag(Tag::ModelTransformationTag, &matrix[..])?;
        }
        if let Some(nodata) = &tags.nodata {
            dir.write_tag(Tag::GdalNodata, nodata.as_str())?;
        }
        image.write_data(data)?;
    }
    Ok(cursor.into_inner())
}

fn interleave(raster: &Raster) -> Vec<f32> {
    let pixels = raster.pixel_count();
    let mut out = Vec::with_capacity(pixels * raster.band_count);
    for pixel in 0..pixels {
        for band in 0..raster.band_count {
            out.push(raster.data[band * pixels + pixel]);
        }
    }
    out
}

/// Format a nodata value the way GDAL writes the `GDAL_NODATA` tag.
pub fn format_gdal_nodata(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        value.to_string()
    }
}

/// Parse the `GDAL_NODATA` tag text (may carry trailing NULs or spaces).
pub fn parse_gdal_nodata(text: &str) -> Option<f64> {
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse()
        .ok()
}
