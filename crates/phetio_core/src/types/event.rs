//! Serializer for native input events, a shape this crate does not own.

use crate::error::PhetioError;
use crate::io_type::{Field, IOType, IOTypeRef, StateObject};
use phetio_data::NativeEvent;
use std::rc::Rc;

/// Nullable types used to document and validate the event fields.
pub struct EventFieldTypes {
    pub number: IOTypeRef,
    pub boolean: IOTypeRef,
    pub string: IOTypeRef,
}

fn field_type<'a>(types: &'a EventFieldTypes, key: &str) -> &'a IOTypeRef {
    match key {
        "altKey" | "ctrlKey" | "metaKey" | "shiftKey" => &types.boolean,
        "constructorName" | "code" | "key" | "pointerType" | "relatedTarget" | "target"
        | "type" => &types.string,
        _ => &types.number,
    }
}

pub fn event_io(types: &EventFieldTypes) -> Rc<IOType<NativeEvent>> {
    let mut builder = IOType::<NativeEvent>::builder("EventIO")
        .documentation("Serializes a native input event; absent fields are null");
    for key in NativeEvent::FIELD_NAMES {
        builder = builder.field(Field::documented(key, field_type(types, key).clone()));
    }
    builder
        .to_state_object(|event: &NativeEvent, _| Ok(serde_json::to_value(event)?))
        .from_state_object(|state: &StateObject, _| {
            serde_json::from_value(state.clone())
                .map_err(|err| PhetioError::validation(format!("malformed event state: {err}")))
        })
        .apply_state(|event: &mut NativeEvent, state: &StateObject, assertions| {
            let parsed = serde_json::from_value::<NativeEvent>(state.clone())
                .map(Some)
                .map_err(|err| PhetioError::validation(format!("malformed event state: {err}")));
            if let Some(parsed) = assertions.tolerate(parsed, || None)? {
                *event = parsed;
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
    use crate::registry::TypeRegistry;
    use crate::types::parametric::nullable_io;
    use crate::types::primitives::{boolean_io, number_io, string_io};
    use serde_json::json;

    fn event_type() -> Rc<IOType<NativeEvent>> {
        let mut registry = TypeRegistry::new();
        let types = EventFieldTypes {
            number: nullable_io(&mut registry, &number_io()).unwrap().erased(),
            boolean: nullable_io(&mut registry, &boolean_io()).unwrap().erased(),
            string: nullable_io(&mut registry, &string_io()).unwrap().erased(),
        };
        event_io(&types)
    }

    #[test]
    fn test_event_state_has_every_field() {
        let io = event_type();
        let event = NativeEvent::pointer_down(3, 10.0, 20.0);
        let state = io.to_state_object(&event, Assertions::Enabled).unwrap();
        assert!(io.validate_state(&state).is_ok());
        assert_eq!(state["pointerId"], json!(3));
        assert_eq!(state["type"], json!("pointerdown"));
        assert!(state["key"].is_null());
        assert_eq!(io.from_state_object(&state, Assertions::Enabled).unwrap(), event);
    }

    #[test]
    fn test_event_validation_checks_field_types() {
        let io = event_type();
        let mut state = io
            .to_state_object(&NativeEvent::key_down("a", "KeyA"), Assertions::Enabled)
            .unwrap();
        state["altKey"] = json!("yes");
        assert!(io.validate_state(&state).is_err());
    }
}
