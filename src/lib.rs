//! Geometric column types for a tabular query engine.
//!
//! Points, polylines and polygons with a fixed integer discriminant each, and
//! codecs that move them between native values, engine datums
//! (`(tag, field1, field2)` rows) and JSON.
//!
//! ```
//! use magellan_types::prelude::*;
//!
//! let datum = Datum::Row(vec![Datum::Int(1), Datum::Double(3.5), Datum::Double(-2.0)]);
//! let point = PointCodec.deserialize(datum).unwrap();
//! assert_eq!(point.to_string(), "Point (3.5,-2.0)");
//! ```

pub mod bridge;
pub mod codec;
pub mod datum;
pub mod error;
pub mod interchange;
pub mod register;
pub mod shape;
pub mod types;

pub use error::{Result, ShapeError};

pub mod prelude {
    pub use crate::bridge::{inbound_shape_converter, resolve_class};
    pub use crate::codec::{PointCodec, PolyLineCodec, PolygonCodec, ShapeCodec};
    pub use crate::datum::Datum;
    pub use crate::error::ShapeError;
    pub use crate::interchange::{create_row_inbound_converter, MsgPackFormat, RowConverter, WireFormat};
    pub use crate::register::{Registration, RuntimeBridge};
    pub use crate::shape::{Geometry, Point, PolyLine, Polygon, Shape, ShapeType, UdtDescriptor};
}
