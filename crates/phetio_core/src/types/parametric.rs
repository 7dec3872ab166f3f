//! Types parameterized by other types.
//!
//! Each constructor derives the concrete name from its parameters and is
//! served from the registry after the first call.

use crate::callbacks::CallbackId;
use crate::error::{PhetioError, Result};
use crate::io_type::{AnyIOType, IOType, IOTypeRef, StateObject};
use crate::registry::TypeRegistry;
use std::rc::Rc;

/// `NullableIO<T>`: `null` or a state of `T`.
pub fn nullable_io<T: 'static>(
    registry: &mut TypeRegistry,
    inner: &Rc<IOType<T>>,
) -> Result<Rc<IOType<Option<T>>>> {
    let name = format!("NullableIO<{}>", inner.type_name());
    registry.get_or_register(&name, || {
        let check = inner.clone();
        let from_state = inner.clone();
        let validator = inner.clone();
        IOType::<Option<T>>::builder(&name)
            .documentation(&format!("A wrapper for {} that also allows null", inner.type_name()))
            .value_schema(&format!("{} | null", inner.type_name()))
            .value_check(move |value: &Option<T>| {
                value.as_ref().map_or(true, |v| check.is_valid_value(v))
            })
            .to_state_object({
                let inner = inner.clone();
                move |value: &Option<T>, assertions| match value {
                    Some(v) => inner.to_state_object(v, assertions),
                    None => Ok(StateObject::Null),
                }
            })
            .from_state_object(move |state: &StateObject, assertions| {
                if state.is_null() {
                    Ok(None)
                } else {
                    from_state.from_state_object(state, assertions).map(Some)
                }
            })
            .state_validator(move |state: &StateObject| {
                if state.is_null() {
                    return Ok(());
                }
                validator.validate_state(state).map_err(|err| err.to_string())
            })
            .build()
    })
}

/// `ArrayIO<T>`: a JSON array of `T` states.
pub fn array_io<T: 'static>(
    registry: &mut TypeRegistry,
    element: &Rc<IOType<T>>,
) -> Result<Rc<IOType<Vec<T>>>> {
    let name = format!("ArrayIO<{}>", element.type_name());
    registry.get_or_register(&name, || {
        let check = element.clone();
        let to_state = element.clone();
        let from_state = element.clone();
        let validator = element.clone();
        IOType::<Vec<T>>::builder(&name)
            .documentation(&format!("Array of {} elements", element.type_name()))
            .value_schema(&format!("Array<{}>", element.type_name()))
            .value_check(move |values: &Vec<T>| values.iter().all(|v| check.is_valid_value(v)))
            .to_state_object(move |values: &Vec<T>, assertions| {
                values
                    .iter()
                    .map(|v| to_state.to_state_object(v, assertions))
                    .collect::<Result<Vec<_>>>()
                    .map(StateObject::Array)
            })
            .from_state_object(move |state: &StateObject, assertions| {
                let items = state
                    .as_array()
                    .ok_or_else(|| PhetioError::validation(format!("{state} is not an array")))?;
                items
                    .iter()
                    .map(|item| from_state.from_state_object(item, assertions))
                    .collect()
            })
            .state_validator(move |state: &StateObject| {
                let items = state
                    .as_array()
                    .ok_or_else(|| format!("{state} is not an array"))?;
                for (index, item) in items.iter().enumerate() {
                    validator
                        .validate_state(item)
                        .map_err(|err| format!("element {index}: {err}"))?;
                }
                Ok(())
            })
            .build()
    })
}

/// Name of a function type, e.g. `FunctionIO(NumberIO)=>VoidIO`.
#[must_use]
pub fn function_type_name(return_type: &IOTypeRef, parameter_types: &[IOTypeRef]) -> String {
    let parameters: Vec<&str> = parameter_types.iter().map(|p| p.type_name()).collect();
    format!(
        "FunctionIO({})=>{}",
        parameters.join(","),
        return_type.type_name()
    )
}

/// A listener owned by the remote side. Its state is the callback id the
/// wrapper frame allocated for it.
pub fn function_io(
    registry: &mut TypeRegistry,
    return_type: &IOTypeRef,
    parameter_types: &[IOTypeRef],
) -> Result<Rc<IOType<CallbackId>>> {
    let name = function_type_name(return_type, parameter_types);
    registry.get_or_register(&name, || {
        IOType::<CallbackId>::builder(&name)
            .documentation("Wrapper for a remote function, passed by callback id")
            .value_schema("callback id")
            .to_state_object(|id: &CallbackId, _| Ok(StateObject::from(id.0)))
            .from_state_object(|state: &StateObject, _| {
                state
                    .as_u64()
                    .map(CallbackId)
                    .ok_or_else(|| PhetioError::validation(format!("{state} is not a callback id")))
            })
            .state_validator(|state: &StateObject| {
                if state.is_u64() {
                    Ok(())
                } else {
                    Err(format!("{state} is not a callback id"))
                }
            })
            .build()
    })
}
