//! Shape entities: Point, PolyLine and Polygon.
//!
//! Each shape carries a fixed integer discriminant agreed with the host engine
//! (`1` point, `3` polyline, `5` polygon). Lines and polygons store their
//! vertices in one flat `points` vector; `indices` holds the start offset of
//! every part (ring, for polygons).

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::codec::{PointCodec, PolyLineCodec, PolygonCodec, ShapeCodec};
use crate::error::{Result, ShapeError};

/// Namespace the codecs are published under.
pub const MODULE_NAME: &str = "magellan.types";

/// Wire discriminant of a shape variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
}

impl ShapeType {
    pub const ALL: [ShapeType; 3] = [ShapeType::Point, ShapeType::PolyLine, ShapeType::Polygon];

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(ShapeType::Point),
            3 => Some(ShapeType::PolyLine),
            5 => Some(ShapeType::Polygon),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
        }
    }

    /// Self-description published to the host engine's catalog.
    pub fn descriptor(self) -> UdtDescriptor {
        let (py_class, class, sql_type) = match self {
            ShapeType::Point => ("magellan.types.PointUDT", "magellan.PointUDT", "magellan.Point"),
            ShapeType::PolyLine => (
                "magellan.types.PolyLineUDT",
                "magellan.PolyLine",
                "magellan.PolyLine",
            ),
            ShapeType::Polygon => (
                "magellan.types.PolygonUDT",
                "magellan.Polygon",
                "magellan.Polygon",
            ),
        };
        UdtDescriptor {
            kind: "udt".to_string(),
            py_class: py_class.to_string(),
            class: class.to_string(),
            sql_type: sql_type.to_string(),
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON metadata a shape column publishes about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdtDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "pyClass")]
    pub py_class: String,
    pub class: String,
    #[serde(rename = "sqlType")]
    pub sql_type: String,
}

/// Capability shared by every shape variant.
pub trait Shape:
    fmt::Debug + fmt::Display + Clone + PartialEq + Default + Serialize + Into<Geometry>
{
    const SHAPE_TYPE: ShapeType;

    fn shape_type(&self) -> ShapeType {
        Self::SHAPE_TYPE
    }

    /// JSON object form (`{"x":..,"y":..}` or `{"indices":[..],"points":[..]}`).
    ///
    /// JSON has no NaN or infinity: such coordinates are written as `null`
    /// and [`Shape::from_json`] rejects them with a validation error.
    fn to_json(&self) -> Value;

    fn from_json(json: &Value) -> Result<Self>;

    /// Pure catalog metadata. Use [`crate::register::Registration::json_value`]
    /// when the runtime bridge must be registered first.
    fn json_value(&self) -> UdtDescriptor {
        Self::SHAPE_TYPE.descriptor()
    }

    /// Take the matching variant out of a [`Geometry`], handing any other
    /// variant back unchanged.
    fn from_geometry(geometry: Geometry) -> std::result::Result<Self, Geometry>;
}

/// A zero dimensional shape.
///
/// For geographic coordinate systems `x` is the longitude and `y` the latitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point ({},{})", Coord(self.x), Coord(self.y))
    }
}

impl Shape for Point {
    const SHAPE_TYPE: ShapeType = ShapeType::Point;

    fn to_json(&self) -> Value {
        json!({ "x": self.x, "y": self.y })
    }

    fn from_json(json: &Value) -> Result<Self> {
        PointCodec::from_json(json)
    }

    fn from_geometry(geometry: Geometry) -> std::result::Result<Self, Geometry> {
        match geometry {
            Geometry::Point(p) => Ok(p),
            other => Err(other),
        }
    }
}

/// An ordered set of vertices made of one or more parts.
///
/// A part is a connected sequence of two or more points. Parts may be
/// disjoint and may intersect one another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pub indices: Vec<i32>,
    pub points: Vec<Point>,
}

impl PolyLine {
    pub fn new(indices: Vec<i32>, points: Vec<Point>) -> Self {
        Self { indices, points }
    }

    /// Build a line and check the part invariant.
    pub fn try_new(indices: Vec<i32>, points: Vec<Point>) -> Result<Self> {
        let line = Self::new(indices, points);
        line.validate()?;
        Ok(line)
    }

    pub fn parts(&self) -> impl Iterator<Item = &[Point]> + '_ {
        part_ranges(&self.indices, self.points.len()).map(move |r| &self.points[r])
    }

    /// At least two points overall, and every part holds two or more points.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() < 2 {
            return Err(ShapeError::Validation(format!(
                "PolyLine requires at least 2 points, got {}",
                self.points.len()
            )));
        }
        check_offsets(&self.indices, self.points.len())?;
        for (part, range) in part_ranges(&self.indices, self.points.len()).enumerate() {
            if range.len() < 2 {
                return Err(ShapeError::Validation(format!(
                    "PolyLine part {part} has {} points, requires at least 2",
                    range.len()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_parts(f, "PolyLine", &self.indices, &self.points)
    }
}

impl Shape for PolyLine {
    const SHAPE_TYPE: ShapeType = ShapeType::PolyLine;

    fn to_json(&self) -> Value {
        parts_json(&self.indices, &self.points)
    }

    fn from_json(json: &Value) -> Result<Self> {
        PolyLineCodec::from_json(json)
    }

    fn from_geometry(geometry: Geometry) -> std::result::Result<Self, Geometry> {
        match geometry {
            Geometry::PolyLine(l) => Ok(l),
            other => Err(other),
        }
    }
}

/// One or more rings; each ring is a closed loop of four or more points.
///
/// Orientation marks the interior: outer rings run clockwise, holes
/// counter-clockwise. Orientation is never checked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub indices: Vec<i32>,
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(indices: Vec<i32>, points: Vec<Point>) -> Self {
        Self { indices, points }
    }

    /// Build a polygon and check the ring invariant.
    pub fn try_new(indices: Vec<i32>, points: Vec<Point>) -> Result<Self> {
        let polygon = Self::new(indices, points);
        polygon.validate()?;
        Ok(polygon)
    }

    pub fn rings(&self) -> impl Iterator<Item = &[Point]> + '_ {
        part_ranges(&self.indices, self.points.len()).map(move |r| &self.points[r])
    }

    /// Every ring holds four or more points and ends where it starts.
    pub fn validate(&self) -> Result<()> {
        check_offsets(&self.indices, self.points.len())?;
        for (ring, points) in self.rings().enumerate() {
            if points.len() < 4 {
                return Err(ShapeError::Validation(format!(
                    "Polygon ring {ring} has {} points, requires at least 4",
                    points.len()
                )));
            }
            if points.first() != points.last() {
                return Err(ShapeError::Validation(format!("Polygon ring {ring} is not closed")));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_parts(f, "Polygon", &self.indices, &self.points)
    }
}

impl Shape for Polygon {
    const SHAPE_TYPE: ShapeType = ShapeType::Polygon;

    fn to_json(&self) -> Value {
        parts_json(&self.indices, &self.points)
    }

    fn from_json(json: &Value) -> Result<Self> {
        PolygonCodec::from_json(json)
    }

    fn from_geometry(geometry: Geometry) -> std::result::Result<Self, Geometry> {
        match geometry {
            Geometry::Polygon(p) => Ok(p),
            other => Err(other),
        }
    }
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    PolyLine(PolyLine),
    Polygon(Polygon),
}

impl Geometry {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::Point(_) => ShapeType::Point,
            Geometry::PolyLine(_) => ShapeType::PolyLine,
            Geometry::Polygon(_) => ShapeType::Polygon,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.shape_type().name()
    }

    pub fn to_json(&self) -> Value {
        match self {
            Geometry::Point(p) => p.to_json(),
            Geometry::PolyLine(l) => l.to_json(),
            Geometry::Polygon(p) => p.to_json(),
        }
    }

    pub fn json_value(&self) -> UdtDescriptor {
        self.shape_type().descriptor()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Point(p) => fmt::Display::fmt(p, f),
            Geometry::PolyLine(l) => fmt::Display::fmt(l, f),
            Geometry::Polygon(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<PolyLine> for Geometry {
    fn from(l: PolyLine) -> Self {
        Geometry::PolyLine(l)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

/// Renders a coordinate the way the host runtime prints floats: shortest
/// round-trip digits, a trailing `.0` on integral values, and exponent form
/// (`1e+16`, `1e-05`) below 1e-4 or from 1e16 upwards.
struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
        }

        let sci = format!("{v:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        if v != 0.0 && !(-4..16).contains(&exp) {
            return write!(f, "{mantissa}e{exp:+03}");
        }

        let plain = v.to_string();
        if plain.contains('.') {
            f.write_str(&plain)
        } else {
            write!(f, "{plain}.0")
        }
    }
}

fn render_parts(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    indices: &[i32],
    points: &[Point],
) -> fmt::Result {
    let inds = indices.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    let pts = points.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    write!(f, "{prefix} ([{inds}],[{pts}])")
}

fn parts_json(indices: &[i32], points: &[Point]) -> Value {
    json!({
        "indices": indices,
        "points": points.iter().map(Point::to_json).collect::<Vec<_>>(),
    })
}

/// Offsets must start at 0, never decrease and stay inside `len`.
fn check_offsets(indices: &[i32], len: usize) -> Result<()> {
    match indices.first() {
        None => return Err(ShapeError::Validation("indices must not be empty".to_string())),
        Some(&first) if first != 0 => {
            return Err(ShapeError::Validation(format!(
                "first part must start at offset 0, got {first}"
            )))
        }
        Some(_) => {}
    }
    for pair in indices.windows(2) {
        if pair[1] < pair[0] {
            return Err(ShapeError::Validation(format!(
                "indices must be non-decreasing, got {} after {}",
                pair[1], pair[0]
            )));
        }
    }
    for &idx in indices {
        if idx as i64 >= len as i64 {
            return Err(ShapeError::Validation(format!(
                "index {idx} out of range for {len} points"
            )));
        }
    }
    Ok(())
}

/// Point ranges named by `indices`, clamped to `len` so malformed offsets
/// never slice out of bounds.
fn part_ranges(indices: &[i32], len: usize) -> impl Iterator<Item = Range<usize>> + '_ {
    let clamp = move |i: i32| usize::try_from(i).unwrap_or(0).min(len);
    indices.iter().enumerate().map(move |(n, &start)| {
        let start = clamp(start);
        let end = indices.get(n + 1).map_or(len, |&next| clamp(next)).max(start);
        start..end
    })
}
