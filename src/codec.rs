//! Per-shape codecs between native shapes, engine datums and JSON.

use serde_json::Value;

use crate::datum::Datum;
use crate::error::{Result, ShapeError};
use crate::shape::{Point, PolyLine, Polygon, Shape, ShapeType, MODULE_NAME};
use crate::types::{validate, FieldDef, TypeDef};

/// Conversion contract between a shape, its engine datum and its JSON form.
pub trait ShapeCodec {
    type Shape: Shape;

    /// Zero-valued instance the host engine inspects to lay out the column.
    fn sql_type(&self) -> Self::Shape {
        Self::Shape::default()
    }

    /// Flattened struct layout of the column.
    fn storage_layout(&self) -> TypeDef;

    /// Layout of the JSON object form.
    fn json_layout() -> TypeDef;

    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    /// Name of the paired engine-native type.
    fn wire_type_name(&self) -> &'static str;

    fn simple_string(&self) -> &'static str;

    /// Only the matching native shape is accepted; it is stored as-is.
    fn serialize(&self, value: Datum) -> Result<Datum> {
        match value {
            Datum::Shape(g) if g.shape_type() == Self::Shape::SHAPE_TYPE => Ok(Datum::Shape(g)),
            other => Err(ShapeError::InvalidArgument {
                value: format!("{other:?}"),
                kind: other.kind(),
            }),
        }
    }

    /// Accepts the native shape or a `(tag, field1, field2)` triple.
    fn deserialize(&self, datum: Datum) -> Result<Self::Shape> {
        let expected = Self::Shape::SHAPE_TYPE;
        let fields = match datum {
            Datum::Shape(g) => {
                return Self::Shape::from_geometry(g).map_err(|g| {
                    ShapeError::Validation(format!("expected {expected}, got {}", g.type_name()))
                })
            }
            Datum::Row(fields) | Datum::List(fields) => fields,
            other => {
                return Err(ShapeError::Validation(format!(
                    "{expected} cannot be read from a {} datum",
                    other.kind()
                )))
            }
        };

        let [tag, first, second] = <[Datum; 3]>::try_from(fields).map_err(|fields| {
            ShapeError::Validation(format!(
                "{expected} datum has length {} but requires 3",
                fields.len()
            ))
        })?;
        if tag.as_i64() != Some(i64::from(expected.tag())) {
            return Err(ShapeError::Validation(format!(
                "{expected} should have type = {}, got {tag:?}",
                expected.tag()
            )));
        }

        let shape = self.from_fields(first, second)?;
        tracing::debug!(shape = %expected, "decoded shape datum");
        Ok(shape)
    }

    /// Rebuild the shape from the two payload fields of a triple.
    fn from_fields(&self, first: Datum, second: Datum) -> Result<Self::Shape>;

    /// Positional `(tag, field1, field2)` fields of the shape.
    fn fields(&self, shape: &Self::Shape) -> Vec<Datum>;

    /// The shape's fields wrapped in a [`Datum::Row`].
    fn flatten(&self, shape: &Self::Shape) -> Datum {
        Datum::Row(self.fields(shape))
    }

    fn from_json(json: &Value) -> Result<Self::Shape>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PointCodec;

impl ShapeCodec for PointCodec {
    type Shape = Point;

    fn storage_layout(&self) -> TypeDef {
        TypeDef::Object(vec![
            FieldDef::new("type", TypeDef::Int),
            FieldDef::new("x", TypeDef::Double),
            FieldDef::new("y", TypeDef::Double),
        ])
    }

    fn json_layout() -> TypeDef {
        TypeDef::Object(vec![
            FieldDef::new("x", TypeDef::Double),
            FieldDef::new("y", TypeDef::Double),
        ])
    }

    fn wire_type_name(&self) -> &'static str {
        "magellan.PointUDT"
    }

    fn simple_string(&self) -> &'static str {
        "point"
    }

    fn from_fields(&self, first: Datum, second: Datum) -> Result<Point> {
        Ok(Point::new(coordinate(&first, "x")?, coordinate(&second, "y")?))
    }

    fn fields(&self, shape: &Point) -> Vec<Datum> {
        vec![
            Datum::Int(ShapeType::Point.tag().into()),
            Datum::Double(shape.x),
            Datum::Double(shape.y),
        ]
    }

    fn from_json(json: &Value) -> Result<Point> {
        validate(&Self::json_layout(), json)?;
        Ok(Point::new(json_f64(json, "x")?, json_f64(json, "y")?))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolyLineCodec {
    points: PointCodec,
}

impl ShapeCodec for PolyLineCodec {
    type Shape = PolyLine;

    fn storage_layout(&self) -> TypeDef {
        parts_storage_layout(&self.points)
    }

    fn json_layout() -> TypeDef {
        parts_json_layout()
    }

    fn wire_type_name(&self) -> &'static str {
        "magellan.PolyLineUDT"
    }

    fn simple_string(&self) -> &'static str {
        "polyline"
    }

    fn from_fields(&self, first: Datum, second: Datum) -> Result<PolyLine> {
        Ok(PolyLine::new(indices(first)?, points(&self.points, second)?))
    }

    fn fields(&self, shape: &PolyLine) -> Vec<Datum> {
        part_fields(&self.points, ShapeType::PolyLine, &shape.indices, &shape.points)
    }

    fn from_json(json: &Value) -> Result<PolyLine> {
        let (indices, points) = parts_from_json(json)?;
        Ok(PolyLine::new(indices, points))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonCodec {
    points: PointCodec,
}

impl ShapeCodec for PolygonCodec {
    type Shape = Polygon;

    fn storage_layout(&self) -> TypeDef {
        parts_storage_layout(&self.points)
    }

    fn json_layout() -> TypeDef {
        parts_json_layout()
    }

    fn wire_type_name(&self) -> &'static str {
        "magellan.PolygonUDT"
    }

    fn simple_string(&self) -> &'static str {
        "polygon"
    }

    fn from_fields(&self, first: Datum, second: Datum) -> Result<Polygon> {
        Ok(Polygon::new(indices(first)?, points(&self.points, second)?))
    }

    fn fields(&self, shape: &Polygon) -> Vec<Datum> {
        part_fields(&self.points, ShapeType::Polygon, &shape.indices, &shape.points)
    }

    fn from_json(json: &Value) -> Result<Polygon> {
        let (indices, points) = parts_from_json(json)?;
        Ok(Polygon::new(indices, points))
    }
}

fn coordinate(datum: &Datum, name: &str) -> Result<f64> {
    datum.as_f64().ok_or_else(|| {
        ShapeError::Validation(format!("{name} must be numeric, got {}", datum.kind()))
    })
}

fn indices(datum: Datum) -> Result<Vec<i32>> {
    let items = match datum {
        Datum::List(items) => items,
        other => {
            return Err(ShapeError::Validation(format!(
                "indices must be a list, got {}",
                other.kind()
            )))
        }
    };
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| ShapeError::Validation(format!("invalid index {item:?}")))
        })
        .collect()
}

fn points(codec: &PointCodec, datum: Datum) -> Result<Vec<Point>> {
    let items = match datum {
        Datum::List(items) => items,
        other => {
            return Err(ShapeError::Validation(format!(
                "points must be a list, got {}",
                other.kind()
            )))
        }
    };
    items.into_iter().map(|p| codec.deserialize(p)).collect()
}

fn part_fields(codec: &PointCodec, tag: ShapeType, indices: &[i32], points: &[Point]) -> Vec<Datum> {
    vec![
        Datum::Int(tag.tag().into()),
        Datum::List(indices.iter().map(|&i| Datum::Int(i.into())).collect()),
        Datum::List(points.iter().map(|p| codec.flatten(p)).collect()),
    ]
}

fn parts_storage_layout(codec: &PointCodec) -> TypeDef {
    TypeDef::Object(vec![
        FieldDef::new("type", TypeDef::Int),
        FieldDef::new("indices", TypeDef::list(TypeDef::Int)),
        FieldDef::new("points", TypeDef::list(codec.storage_layout())),
    ])
}

fn parts_json_layout() -> TypeDef {
    TypeDef::Object(vec![
        FieldDef::new("indices", TypeDef::list(TypeDef::Int)),
        FieldDef::new("points", TypeDef::list(PointCodec::json_layout())),
    ])
}

fn parts_from_json(json: &Value) -> Result<(Vec<i32>, Vec<Point>)> {
    validate(&parts_json_layout(), json)?;

    let indices = json_array(json, "indices")?
        .iter()
        .map(|v| {
            v.as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| ShapeError::Validation(format!("index {v} out of range")))
        })
        .collect::<Result<Vec<_>>>()?;
    let points = json_array(json, "points")?
        .iter()
        .map(PointCodec::from_json)
        .collect::<Result<Vec<_>>>()?;

    Ok((indices, points))
}

fn json_f64(json: &Value, key: &str) -> Result<f64> {
    json.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ShapeError::Validation(format!("{key} must be a number")))
}

fn json_array<'a>(json: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    json.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError::Validation(format!("{key} must be an array")))
}
