//! JSON envelope dispatch.
//!
//! An envelope names its shape through `pyClass` (`"<module>.<Class>"`). The
//! set of shapes is closed, so the name is looked up in a fixed table instead
//! of being resolved dynamically.

use serde_json::Value;

use crate::codec::{PointCodec, PolyLineCodec, PolygonCodec, ShapeCodec};
use crate::error::{Result, ShapeError};
use crate::shape::{Geometry, ShapeType, MODULE_NAME};

/// Class names accepted inside [`MODULE_NAME`]: the codec class, its
/// `*Codec` alias and the entity class itself.
const REGISTRY: &[(&str, ShapeType)] = &[
    ("PointUDT", ShapeType::Point),
    ("PointCodec", ShapeType::Point),
    ("Point", ShapeType::Point),
    ("PolyLineUDT", ShapeType::PolyLine),
    ("PolyLineCodec", ShapeType::PolyLine),
    ("PolyLine", ShapeType::PolyLine),
    ("PolygonUDT", ShapeType::Polygon),
    ("PolygonCodec", ShapeType::Polygon),
    ("Polygon", ShapeType::Polygon),
];

/// Resolve a fully qualified class name to its shape type.
pub fn resolve_class(qualified: &str) -> Result<ShapeType> {
    let (module, class) = qualified
        .rsplit_once('.')
        .ok_or_else(|| ShapeError::Resolution(format!("{qualified:?} is not a qualified name")))?;

    if module != MODULE_NAME {
        return Err(ShapeError::Resolution(format!("unknown module {module:?}")));
    }

    REGISTRY
        .iter()
        .find(|(name, _)| *name == class)
        .map(|&(_, shape_type)| shape_type)
        .ok_or_else(|| ShapeError::Resolution(format!("no class {class:?} in module {module:?}")))
}

/// Decode an envelope such as
/// `{"pyClass":"magellan.types.PointUDT","x":1.0,"y":2.0}`.
pub fn inbound_shape_converter(json: &str) -> Result<Geometry> {
    let envelope: Value = serde_json::from_str(json)?;
    convert_envelope(&envelope)
}

/// Same as [`inbound_shape_converter`] for an already parsed envelope.
pub fn convert_envelope(envelope: &Value) -> Result<Geometry> {
    let py_class = envelope
        .get("pyClass")
        .and_then(Value::as_str)
        .ok_or_else(|| ShapeError::Resolution("envelope has no pyClass string".to_string()))?;

    let shape_type = resolve_class(py_class).inspect_err(|e| {
        tracing::warn!(py_class, error = %e, "unresolvable shape envelope");
    })?;
    tracing::debug!(py_class, shape = %shape_type, "decoding shape envelope");

    let geometry: Geometry = match shape_type {
        ShapeType::Point => PointCodec::from_json(envelope)?.into(),
        ShapeType::PolyLine => PolyLineCodec::from_json(envelope)?.into(),
        ShapeType::Polygon => PolygonCodec::from_json(envelope)?.into(),
    };
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Point, Polygon};

    #[test]
    fn resolves_every_known_alias() {
        assert_eq!(resolve_class("magellan.types.PointUDT").unwrap(), ShapeType::Point);
        assert_eq!(resolve_class("magellan.types.PolyLine").unwrap(), ShapeType::PolyLine);
        assert_eq!(resolve_class("magellan.types.PolygonCodec").unwrap(), ShapeType::Polygon);
    }

    #[test]
    fn unknown_names_fail_to_resolve() {
        for name in ["magellan.types.Circle", "other.PointUDT", "PointUDT", ""] {
            assert!(
                matches!(resolve_class(name), Err(ShapeError::Resolution(_))),
                "{name} should not resolve"
            );
        }
    }

    #[test]
    fn converts_point_envelope() {
        let g = inbound_shape_converter(
            r#"{"pyClass":"magellan.types.PointUDT","x":3.5,"y":-2.0}"#,
        )
        .unwrap();
        assert_eq!(g, Geometry::Point(Point::new(3.5, -2.0)));
    }

    #[test]
    fn converts_polygon_envelope() {
        let g = inbound_shape_converter(
            r#"{
                "pyClass": "magellan.types.PolygonCodec",
                "indices": [0],
                "points": [
                    {"x": 1.0, "y": 1.0}, {"x": 1.0, "y": -1.0},
                    {"x": -1.0, "y": -1.0}, {"x": 1.0, "y": 1.0}
                ]
            }"#,
        )
        .unwrap();
        let (indices, points) = match g {
            Geometry::Polygon(Polygon { indices, points }) => (indices, points),
            other => panic!("expected a polygon, got {other}"),
        };
        assert_eq!(indices, vec![0]);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(inbound_shape_converter("{pyClass"), Err(ShapeError::Parse(_))));
    }

    #[test]
    fn missing_py_class_is_a_resolution_error() {
        assert!(matches!(
            inbound_shape_converter(r#"{"x":1.0,"y":2.0}"#),
            Err(ShapeError::Resolution(_))
        ));
    }

    #[test]
    fn resolved_envelope_with_bad_payload_is_a_validation_error() {
        assert!(matches!(
            inbound_shape_converter(r#"{"pyClass":"magellan.types.PointUDT","x":1.0}"#),
            Err(ShapeError::Validation(_))
        ));
    }
}
