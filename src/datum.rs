//! Engine-native values as they sit in a column or cross a runtime boundary.

use serde::{Deserialize, Serialize};

use crate::shape::Geometry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
    List(Vec<Datum>),
    /// Positional struct fields, e.g. the `(tag, field1, field2)` shape triple.
    Row(Vec<Datum>),
    Shape(Geometry),
}

impl Datum {
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Null => "null",
            Datum::Int(_) => "int",
            Datum::Double(_) => "double",
            Datum::Text(_) => "string",
            Datum::List(_) => "list",
            Datum::Row(_) => "row",
            Datum::Shape(g) => g.type_name(),
        }
    }

    /// Numeric value widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Datum::Double(v) => Some(v),
            Datum::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Datum::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Geometry> for Datum {
    fn from(g: Geometry) -> Self {
        Datum::Shape(g)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Double(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_string())
    }
}
