//! VTK legacy serialization.
//!
//! Files are written with a `5.0` version header and the classic cell layout
//! (count-prefixed vertex lists), which every VTK 5+ reader accepts.

use vtkio::model::{
    Attribute, Attributes, ByteOrder, DataArray, DataSet, ElementType, Extent, IOBuffer, PolyDataPiece,
    StructuredGridPiece, Version, Vtk,
};

use crate::error::{ConvertError, Result, Stage};
use crate::options::VtkEncoding;
use crate::surface::StructuredSurface;

/// Legacy header version written to every file.
pub const LEGACY_VERSION: Version = Version { major: 5, minor: 0 };

/// Name of the texture coordinate array.
pub const TCOORDS_NAME: &str = "TextureCoordinates";

/// Build a `STRUCTURED_GRID` dataset from a surface.
pub fn surface_to_vtk(surface: &StructuredSurface, title: &str) -> Vtk {
    let points: Vec<f64> = surface.points.iter().flatten().copied().collect();

    let mut point_data =
        vec![Attribute::scalars(surface.scalar_name.as_str(), 1).with_data(IOBuffer::F64(surface.scalars.clone()))];
    if let Some(coords) = &surface.texture_coords {
        let flat: Vec<f32> = coords.iter().flatten().map(|&t| t as f32).collect();
        point_data.push(Attribute::DataArray(DataArray {
            name: TCOORDS_NAME.to_string(),
            elem: ElementType::TCoords(2),
            data: IOBuffer::F32(flat),
        }));
    }

    legacy(
        title,
        DataSet::inline(StructuredGridPiece {
            extent: Extent::Dims(surface.dimensions()),
            points: IOBuffer::F64(points),
            data: Attributes {
                point: point_data,
                cell: Vec::new(),
            },
        }),
    )
}

/// Wrap a `POLYDATA` piece.
pub fn polydata_to_vtk(piece: PolyDataPiece, title: &str) -> Vtk {
    legacy(title, DataSet::inline(piece))
}

fn legacy(title: &str, data: DataSet) -> Vtk {
    Vtk {
        version: LEGACY_VERSION,
        // The title is a single header line.
        title: title.replace(['\n', '\r'], " "),
        byte_order: ByteOrder::BigEndian,
        file_path: None,
        data,
    }
}

/// Serialize a dataset into legacy file bytes.
pub fn encode_vtk(vtk: Vtk, encoding: VtkEncoding) -> Result<Vec<u8>> {
    match encoding {
        VtkEncoding::Binary => {
            let mut buf = Vec::new();
            vtk.write_legacy(&mut buf)
                .map_err(|e| ConvertError::vtk(Stage::Encode, e.to_string()))?;
            Ok(buf)
        }
        VtkEncoding::Ascii => {
            let mut text = String::new();
            vtk.write_legacy_ascii(&mut text)
                .map_err(|e| ConvertError::vtk(Stage::Encode, e.to_string()))?;
            Ok(text.into_bytes())
        }
    }
}
