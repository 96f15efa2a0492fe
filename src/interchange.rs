//! Row interchange: positional field tuples received across a runtime or
//! process boundary are rebuilt into shapes.

use serde::{de::DeserializeOwned, Serialize};

use crate::codec::{PointCodec, PolyLineCodec, PolygonCodec, ShapeCodec};
use crate::datum::Datum;
use crate::error::Result;
use crate::shape::{Geometry, ShapeType};

/// Byte encoding used on the boundary.
pub trait WireFormat {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T>;
}

// MessagePack format (compact, the default between processes)
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackFormat;

impl WireFormat for MsgPackFormat {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let buf = rmp_serde::to_vec(value)?;
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        let value = rmp_serde::from_slice(data)?;
        Ok(value)
    }
}

// JSON format for debugging
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl WireFormat for JsonFormat {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Conversion function for one column of the codec's shape type.
pub fn create_row_inbound_converter<C>(codec: C) -> impl Fn(Vec<Datum>) -> Result<C::Shape>
where
    C: ShapeCodec,
{
    move |fields| codec.deserialize(Datum::Row(fields))
}

/// Per-column converter chosen at run time from the column's shape type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowConverter {
    shape_type: ShapeType,
}

impl RowConverter {
    pub fn for_type(shape_type: ShapeType) -> Self {
        Self { shape_type }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn convert(&self, fields: Vec<Datum>) -> Result<Geometry> {
        let row = Datum::Row(fields);
        let geometry: Geometry = match self.shape_type {
            ShapeType::Point => PointCodec.deserialize(row)?.into(),
            ShapeType::PolyLine => PolyLineCodec::default().deserialize(row)?.into(),
            ShapeType::Polygon => PolygonCodec::default().deserialize(row)?.into(),
        };
        Ok(geometry)
    }

    /// Decode an encoded field tuple and convert it.
    pub fn convert_bytes<F: WireFormat>(&self, format: &F, data: &[u8]) -> Result<Geometry> {
        let fields: Vec<Datum> = format.decode(data)?;
        tracing::debug!(shape = %self.shape_type, bytes = data.len(), "decoding inbound row");
        self.convert(fields)
    }
}

/// Flatten a shape into the field tuple [`RowConverter`] expects.
pub fn outbound_row(geometry: &Geometry) -> Vec<Datum> {
    match geometry {
        Geometry::Point(p) => PointCodec.fields(p),
        Geometry::PolyLine(l) => PolyLineCodec::default().fields(l),
        Geometry::Polygon(p) => PolygonCodec::default().fields(p),
    }
}
