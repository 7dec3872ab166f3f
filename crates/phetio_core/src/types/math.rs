//! Geometry value types.

use crate::io_type::{Field, IOType};
use phetio_data::{Bounds3, Dimension3, Vector3};
use std::rc::Rc;

pub fn vector3_io(number: &Rc<IOType<f64>>) -> Rc<IOType<Vector3>> {
    IOType::<Vector3>::builder("Vector3IO")
        .documentation("Basic 3-dimensional vector, represented as (x,y,z)")
        .value_check(|v: &Vector3| v.is_finite())
        .field(Field::value("x", number, |v: &Vector3| v.x, |v: &mut Vector3, x| v.x = x))
        .field(Field::value("y", number, |v: &Vector3| v.y, |v: &mut Vector3, y| v.y = y))
        .field(Field::value("z", number, |v: &Vector3| v.z, |v: &mut Vector3, z| v.z = z))
        .default_constructor()
        .build()
}

/// Every coordinate may be infinite (`Bounds3::EVERYTHING`), so the fields
/// use the infinity-aware number type.
pub fn bounds3_io(infinite: &Rc<IOType<f64>>) -> Rc<IOType<Bounds3>> {
    IOType::<Bounds3>::builder("Bounds3IO")
        .documentation("A 3-dimensional bounds (bounding box)")
        .value_check(|b: &Bounds3| {
            [b.min_x, b.min_y, b.min_z, b.max_x, b.max_y, b.max_z]
                .iter()
                .all(|c| !c.is_nan())
        })
        .field(Field::value("minX", infinite, |b: &Bounds3| b.min_x, |b: &mut Bounds3, v| b.min_x = v))
        .field(Field::value("minY", infinite, |b: &Bounds3| b.min_y, |b: &mut Bounds3, v| b.min_y = v))
        .field(Field::value("minZ", infinite, |b: &Bounds3| b.min_z, |b: &mut Bounds3, v| b.min_z = v))
        .field(Field::value("maxX", infinite, |b: &Bounds3| b.max_x, |b: &mut Bounds3, v| b.max_x = v))
        .field(Field::value("maxY", infinite, |b: &Bounds3| b.max_y, |b: &mut Bounds3, v| b.max_y = v))
        .field(Field::value("maxZ", infinite, |b: &Bounds3| b.max_z, |b: &mut Bounds3, v| b.max_z = v))
        .constructor(|| Bounds3::NOTHING)
        .build()
}

pub fn dimension3_io(infinite: &Rc<IOType<f64>>) -> Rc<IOType<Dimension3>> {
    IOType::<Dimension3>::builder("Dimension3IO")
        .documentation("A dimension with width, height, and depth")
        .field(Field::value(
            "width",
            infinite,
            |d: &Dimension3| d.width,
            |d: &mut Dimension3, v| d.width = v,
        ))
        .field(Field::value(
            "height",
            infinite,
            |d: &Dimension3| d.height,
            |d: &mut Dimension3, v| d.height = v,
        ))
        .field(Field::value(
            "depth",
            infinite,
            |d: &Dimension3| d.depth,
            |d: &mut Dimension3, v| d.depth = v,
        ))
        .default_constructor()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::Assertions;
    use crate::io_type::AnyIOType;
    use crate::types::primitives::{infinite_number_io, number_io};
    use serde_json::json;

    #[test]
    fn test_bounds_round_trip_with_infinities() {
        let io = bounds3_io(&infinite_number_io());
        for bounds in [
            Bounds3::new(-1.0, -2.0, -3.0, 4.0, 5.0, 6.5),
            Bounds3::EVERYTHING,
            Bounds3::NOTHING,
        ] {
            let state = io.to_state_object(&bounds, Assertions::Enabled).unwrap();
            let restored = io.from_state_object(&state, Assertions::Enabled).unwrap();
            assert_eq!(restored, bounds);
        }
        let state = io
            .to_state_object(&Bounds3::EVERYTHING, Assertions::Enabled)
            .unwrap();
        assert_eq!(state["minX"], json!("NEGATIVE_INFINITY"));
        assert_eq!(state["maxZ"], json!("POSITIVE_INFINITY"));
    }

    #[test]
    fn test_dimension_wire_shape() {
        let io = dimension3_io(&infinite_number_io());
        let state = io
            .to_state_object(&Dimension3::new(1.0, 2.0, f64::INFINITY), Assertions::Enabled)
            .unwrap();
        assert_eq!(
            state,
            json!({ "width": 1.0, "height": 2.0, "depth": "POSITIVE_INFINITY" })
        );
        assert!(io.validate_state(&json!({ "width": 1, "height": 2 })).is_err());
    }

    #[test]
    fn test_vector_rejects_infinite_when_asserting() {
        let io = vector3_io(&number_io());
        let v = Vector3::new(f64::INFINITY, 0.0, 0.0);
        assert!(io.to_state_object(&v, Assertions::Enabled).is_err());
        let state = io
            .to_state_object(&Vector3::new(1.0, 2.0, 3.0), Assertions::Enabled)
            .unwrap();
        assert_eq!(state, json!({ "x": 1.0, "y": 2.0, "z": 3.0 }));
    }
}
