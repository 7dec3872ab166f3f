use crate::error::{PhetioError, Result};
use crate::io_type::{Field, IOType, StateObject};
use phetio_data::Color;
use serde_json::{json, Map};
use std::rc::Rc;

fn channel(state: &Map<String, StateObject>, key: &str) -> Result<f64> {
    state
        .get(key)
        .and_then(StateObject::as_f64)
        .ok_or_else(|| PhetioError::validation(format!("ColorIO state needs a numeric {key}")))
}

fn color_from_state(state: &StateObject) -> Result<Color> {
    let object = state
        .as_object()
        .ok_or_else(|| PhetioError::validation(format!("{state} is not a color object")))?;
    Ok(Color::new(
        channel(object, "r")?,
        channel(object, "g")?,
        channel(object, "b")?,
        channel(object, "a")?,
    ))
}

fn validate_color_state(state: &StateObject) -> std::result::Result<(), String> {
    let object = state
        .as_object()
        .ok_or_else(|| format!("{state} is not a color object"))?;
    for key in ["r", "g", "b"] {
        match object.get(key).and_then(StateObject::as_u64) {
            Some(v) if v <= 255 => {}
            _ => return Err(format!("{key} must be an integer in [0,255]")),
        }
    }
    match object.get("a").and_then(StateObject::as_f64) {
        Some(a) if (0.0..=1.0).contains(&a) => Ok(()),
        _ => Err("a must be a number in [0,1]".to_string()),
    }
}

/// Custom hooks around a private representation; the schema fields are
/// declared for validation and the generated API only.
pub fn color_io(number: &Rc<IOType<f64>>) -> Rc<IOType<Color>> {
    let documented = |key: &str| Field::<Color>::documented(key, number.erased());
    IOType::<Color>::builder("ColorIO")
        .documentation("A color, with rgba")
        .field(documented("r"))
        .field(documented("g"))
        .field(documented("b"))
        .field(documented("a"))
        .state_validator(validate_color_state)
        .to_state_object(|color: &Color, _| {
            Ok(json!({
                "r": color.red(),
                "g": color.green(),
                "b": color.blue(),
                "a": color.alpha(),
            }))
        })
        .from_state_object(|state: &StateObject, _| color_from_state(state))
        .apply_state(|color: &mut Color, state: &StateObject, assertions| {
            let parsed = assertions.tolerate(color_from_state(state).map(Some), || None)?;
            if let Some(parsed) = parsed {
                *color = parsed;
            }
            Ok(())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::Assertions;
    use crate::io_type::AnyIOType;
    use crate::types::primitives::number_io;

    #[test]
    fn test_color_round_trip() {
        let io = color_io(&number_io());
        let color = Color::new(12.0, 200.0, 255.0, 0.25);
        let state = io.to_state_object(&color, Assertions::Enabled).unwrap();
        assert_eq!(state, json!({ "r": 12, "g": 200, "b": 255, "a": 0.25 }));
        assert_eq!(io.from_state_object(&state, Assertions::Enabled).unwrap(), color);
    }

    #[test]
    fn test_color_state_validation() {
        let io = color_io(&number_io());
        assert!(io.validate_state(&json!({ "r": 1, "g": 2, "b": 3, "a": 1 })).is_ok());
        assert!(io.validate_state(&json!({ "r": 256, "g": 2, "b": 3, "a": 1 })).is_err());
        assert!(io.validate_state(&json!({ "r": 1.5, "g": 2, "b": 3, "a": 1 })).is_err());
        assert!(io.validate_state(&json!({ "r": 1, "g": 2, "b": 3, "a": 2 })).is_err());
    }

    #[test]
    fn test_apply_state_keeps_color_on_bad_input_in_production() {
        let io = color_io(&number_io());
        let mut color = Color::WHITE;
        io.apply_state(&mut color, &json!({ "r": "red" }), Assertions::Disabled)
            .unwrap();
        assert_eq!(color, Color::WHITE);
        assert!(io
            .apply_state(&mut color, &json!({ "r": "red" }), Assertions::Enabled)
            .is_err());
        io.apply_state(
            &mut color,
            &json!({ "r": 0, "g": 0, "b": 0, "a": 0 }),
            Assertions::Enabled,
        )
        .unwrap();
        assert_eq!(color, Color::TRANSPARENT);
    }
}
