//! Property-based round-trip tests for the shape codecs.
//!
//! Coordinates are generated from raw bit patterns as well as finite ranges
//! so the triple and MessagePack paths are checked to be bit-exact.

use magellan_types::interchange::outbound_row;
use magellan_types::prelude::*;
use proptest::prelude::*;

fn finite_f64() -> impl Strategy<Value = f64> {
    (-1.0e6..1.0e6).prop_filter("must be finite", |x: &f64| x.is_finite())
}

fn non_nan_f64() -> impl Strategy<Value = f64> {
    any::<u64>()
        .prop_map(f64::from_bits)
        .prop_filter("NaN never compares equal", |x| !x.is_nan())
}

fn point() -> impl Strategy<Value = Point> {
    (finite_f64(), finite_f64()).prop_map(|(x, y)| Point::new(x, y))
}

/// Part offsets plus a point list long enough for every part.
fn parts() -> impl Strategy<Value = (Vec<i32>, Vec<Point>)> {
    prop::collection::vec(2usize..6, 1..4).prop_flat_map(|sizes| {
        let total: usize = sizes.iter().sum();
        let mut indices = Vec::with_capacity(sizes.len());
        let mut offset = 0i32;
        for size in &sizes {
            indices.push(offset);
            offset += *size as i32;
        }
        (Just(indices), prop::collection::vec(point(), total))
    })
}

proptest! {
    /// Property: a point survives its triple bit for bit.
    #[test]
    fn prop_point_triple_round_trip(x in non_nan_f64(), y in non_nan_f64()) {
        let point = Point::new(x, y);
        let decoded = PointCodec.deserialize(PointCodec.flatten(&point)).unwrap();
        prop_assert_eq!(decoded.x.to_bits(), x.to_bits());
        prop_assert_eq!(decoded.y.to_bits(), y.to_bits());
    }

    /// Property: decoded lines keep indices unchanged and points in order.
    #[test]
    fn prop_polyline_triple_round_trip((indices, points) in parts()) {
        let line = PolyLine::new(indices.clone(), points);
        prop_assert!(line.validate().is_ok());

        let codec = PolyLineCodec::default();
        let decoded = codec.deserialize(codec.flatten(&line)).unwrap();
        prop_assert_eq!(&decoded.indices, &indices);
        prop_assert_eq!(decoded, line);
    }

    /// Property: polygons survive JSON and the envelope dispatcher.
    #[test]
    fn prop_polygon_json_round_trip((indices, points) in parts()) {
        let polygon = Polygon::new(indices, points);
        let mut envelope = polygon.to_json();
        envelope["pyClass"] = serde_json::json!("magellan.types.PolygonUDT");

        let decoded = inbound_shape_converter(&envelope.to_string()).unwrap();
        prop_assert_eq!(decoded, Geometry::Polygon(polygon));
    }

    /// Property: MessagePack rows reproduce the shape exactly.
    #[test]
    fn prop_msgpack_row_round_trip(p in point()) {
        let geometry: Geometry = p.into();
        let bytes = MsgPackFormat.encode(&outbound_row(&geometry)).unwrap();
        let decoded = RowConverter::for_type(ShapeType::Point)
            .convert_bytes(&MsgPackFormat, &bytes)
            .unwrap();
        prop_assert_eq!(decoded, geometry);
    }

    /// Property: any tag other than the point discriminant is rejected.
    #[test]
    fn prop_point_rejects_foreign_tags(tag in any::<i64>().prop_filter("not a point", |t| *t != 1)) {
        let datum = Datum::Row(vec![Datum::Int(tag), Datum::Double(0.0), Datum::Double(0.0)]);
        prop_assert!(matches!(PointCodec.deserialize(datum), Err(ShapeError::Validation(_))));
    }
}
