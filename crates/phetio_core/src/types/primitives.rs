//! Leaf value types whose state is the value itself.

use crate::error::{PhetioError, Result};
use crate::io_type::{IOType, StateObject, OBJECT_IO};
use serde_json::Number;
use std::rc::Rc;

/// Wire sentinel for `+∞`.
pub const POSITIVE_INFINITY: &str = "POSITIVE_INFINITY";
/// Wire sentinel for `-∞`.
pub const NEGATIVE_INFINITY: &str = "NEGATIVE_INFINITY";

pub fn object_io() -> Rc<IOType<()>> {
    IOType::<()>::builder(OBJECT_IO)
        .documentation("The root of the IOType hierarchy")
        .build()
}

pub fn void_io() -> Rc<IOType<()>> {
    IOType::<()>::builder("VoidIO")
        .documentation("Type for which there is no instance, marks functions without a return value")
        .state_validator(|state: &StateObject| {
            if state.is_null() {
                Ok(())
            } else {
                Err(format!("expected null, got {state}"))
            }
        })
        .from_state_object(|_: &StateObject, _| Ok(()))
        .build()
}

pub(crate) fn finite_number(value: f64) -> Result<StateObject> {
    Number::from_f64(value)
        .map(StateObject::Number)
        .ok_or_else(|| PhetioError::validation(format!("{value} cannot be represented in JSON")))
}

pub fn number_io() -> Rc<IOType<f64>> {
    IOType::<f64>::builder("NumberIO")
        .documentation("Wrapper for the built-in number type (float, integer)")
        .value_check(|value: &f64| value.is_finite())
        .value_schema("number")
        .state_validator(|state: &StateObject| {
            if state.is_number() {
                Ok(())
            } else {
                Err(format!("{state} is not a number"))
            }
        })
        .to_state_object(|value: &f64, _| finite_number(*value))
        .from_state_object(|state: &StateObject, _| {
            state
                .as_f64()
                .ok_or_else(|| PhetioError::validation(format!("{state} is not a number")))
        })
        .build()
}

pub fn boolean_io() -> Rc<IOType<bool>> {
    IOType::<bool>::builder("BooleanIO")
        .documentation("Wrapper for the built-in boolean type")
        .value_schema("boolean")
        .state_validator(|state: &StateObject| {
            if state.is_boolean() {
                Ok(())
            } else {
                Err(format!("{state} is not a boolean"))
            }
        })
        .to_state_object(|value: &bool, _| Ok(StateObject::Bool(*value)))
        .from_state_object(|state: &StateObject, _| {
            state
                .as_bool()
                .ok_or_else(|| PhetioError::validation(format!("{state} is not a boolean")))
        })
        .build()
}

pub fn string_io() -> Rc<IOType<String>> {
    IOType::<String>::builder("StringIO")
        .documentation("Wrapper for the built-in string type")
        .value_schema("string")
        .state_validator(|state: &StateObject| {
            if state.is_string() {
                Ok(())
            } else {
                Err(format!("{state} is not a string"))
            }
        })
        .to_state_object(|value: &String, _| Ok(StateObject::String(value.clone())))
        .from_state_object(|state: &StateObject, _| {
            state
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| PhetioError::validation(format!("{state} is not a string")))
        })
        .build()
}

pub fn infinite_number_to_state(value: f64) -> Result<StateObject> {
    if value == f64::INFINITY {
        Ok(StateObject::String(POSITIVE_INFINITY.to_string()))
    } else if value == f64::NEG_INFINITY {
        Ok(StateObject::String(NEGATIVE_INFINITY.to_string()))
    } else {
        finite_number(value)
    }
}

pub fn infinite_number_from_state(state: &StateObject) -> Result<f64> {
    match state {
        StateObject::Number(number) => number
            .as_f64()
            .ok_or_else(|| PhetioError::validation(format!("{number} is not a float"))),
        StateObject::String(s) if s == POSITIVE_INFINITY => Ok(f64::INFINITY),
        StateObject::String(s) if s == NEGATIVE_INFINITY => Ok(f64::NEG_INFINITY),
        other => Err(PhetioError::validation(format!(
            "{other} is neither a number nor an infinity sentinel"
        ))),
    }
}

/// Number that may be infinite, encoded with string sentinels since JSON
/// has no infinities.
pub fn infinite_number_io() -> Rc<IOType<f64>> {
    IOType::<f64>::builder("InfiniteNumberIO")
        .documentation("Number that may be infinite; infinities use string sentinels")
        .value_check(|value: &f64| !value.is_nan())
        .value_schema("number | 'POSITIVE_INFINITY' | 'NEGATIVE_INFINITY'")
        .state_validator(|state: &StateObject| {
            infinite_number_from_state(state)
                .map(|_| ())
                .map_err(|err| err.to_string())
        })
        .to_state_object(|value: &f64, _| infinite_number_to_state(*value))
        .from_state_object(|state: &StateObject, _| infinite_number_from_state(state))
        .build()
}
