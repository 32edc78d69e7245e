//! PNG encoding for 8-bit image data.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: Used for RGB/RGBA images with ≤256
//!   unique colors. Produces smaller files and encodes faster.
//! - **Direct PNG**: grayscale (0), RGB (2), grayscale + alpha (4) and
//!   RGBA (6).
//!
//! Use `encode_png_auto` for automatic mode selection, or `encode_png` for
//! explicit direct encoding.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{RasterError, Result};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Channel layout of interleaved 8-bit pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngColor {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PngColor {
    /// Layout for a given number of channels.
    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Gray),
            2 => Some(Self::GrayAlpha),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// IHDR color type byte.
    fn color_type(&self) -> u8 {
        match self {
            Self::Gray => 0,
            Self::Rgb => 2,
            Self::GrayAlpha => 4,
            Self::Rgba => 6,
        }
    }
}

/// Create a PNG image with automatic format selection.
///
/// RGB and RGBA images with ≤256 unique colors are written as indexed PNG,
/// everything else as a direct PNG of the given layout.
pub fn encode_png_auto(pixels: &[u8], width: usize, height: usize, color: PngColor) -> Result<Vec<u8>> {
    check_len(pixels, width, height, color)?;
    let palette = match color {
        PngColor::Rgb | PngColor::Rgba => extract_palette(pixels, color.channels()),
        PngColor::Gray | PngColor::GrayAlpha => None,
    };

    match palette {
        Some((palette, indices)) => encode_png_indexed(width, height, &palette, &indices),
        None => encode_png(pixels, width, height, color),
    }
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Palette extraction; `None` when there are more than 256 colors.
fn extract_palette(pixels: &[u8], channels: usize) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / channels);

    for chunk in pixels.chunks_exact(channels) {
        let alpha = if channels == 4 { chunk[3] } else { 255 };
        let packed = pack_color(chunk[0], chunk[1], chunk[2], alpha);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], alpha));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn encode_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>> {
    if indices.len() != width * height {
        return Err(RasterError::Encode(format!(
            "expected {} palette indices, got {}",
            width * height,
            indices.len()
        )));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.push(*r);
        plte_data.push(*g);
        plte_data.push(*b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS chunk (transparency) - only if any color has alpha < 255
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height, 1)
        .map_err(|e| RasterError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a direct-color PNG from interleaved 8-bit pixels.
pub fn encode_png(pixels: &[u8], width: usize, height: usize, color: PngColor) -> Result<Vec<u8>> {
    check_len(pixels, width, height, color)?;

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, color.color_type()));

    let idat_data = deflate_scanlines(pixels, width, height, color.channels())
        .map_err(|e| RasterError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(pixels: &[u8], width: usize, height: usize, color: PngColor) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RasterError::Encode(format!("cannot encode a {}x{} image", width, height)));
    }
    let expected = width * height * color.channels();
    if pixels.len() != expected {
        return Err(RasterError::Encode(format!(
            "expected {} bytes for {}x{} {:?}, got {}",
            expected,
            width,
            height,
            color,
            pixels.len()
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    ihdr_data
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate image rows for the IDAT chunk, prefixing each with filter type 0.
fn deflate_scanlines(
    bytes: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> std::result::Result<Vec<u8>, std::io::Error> {
    let stride = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));

    for row in bytes.chunks_exact(stride).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        // 4 pixels: red, green, blue, red (3 unique colors)
        let pixels = [
            255, 0, 0, //
            0, 255, 0, //
            0, 0, 255, //
            255, 0, 0,
        ];

        let (palette, indices) = extract_palette(&pixels, 3).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices.len(), 4);
        assert_eq!(indices[0], indices[3]);
        assert!(palette.iter().all(|(_, _, _, a)| *a == 255));
    }

    #[test]
    fn test_extract_palette_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0])
            .collect();
        assert!(extract_palette(&pixels, 3).is_none());
    }

    #[test]
    fn test_png_signature_and_ihdr() {
        let png = encode_png(&[10, 20, 30, 40, 50, 60], 2, 1, PngColor::Rgb).unwrap();
        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(&png[12..16], b"IHDR");
        // width, height
        assert_eq!(&png[16..20], &2u32.to_be_bytes());
        assert_eq!(&png[20..24], &1u32.to_be_bytes());
        assert_eq!(png[25], 2);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        let err = encode_png(&[0u8; 5], 2, 1, PngColor::Rgb).unwrap_err();
        assert!(matches!(err, RasterError::Encode(_)));
    }

    #[test]
    fn test_color_from_channels() {
        assert_eq!(PngColor::from_channels(2), Some(PngColor::GrayAlpha));
        assert_eq!(PngColor::from_channels(5), None);
        assert_eq!(PngColor::Rgba.channels(), 4);
    }
}
