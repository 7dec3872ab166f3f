//! Runtime type descriptors for instrumented values.
//!
//! An [`IOType`] names a wire format, checks live values, converts them to
//! and from JSON state objects and exposes a table of remotely invocable
//! methods. Default (de)serialization walks the declared state schema;
//! types with unusual wire shapes override the hooks.
//!
//! Supertypes are flattened when the child is built: the child starts from
//! a copy of the parent's fields, methods and hooks and then layers its own
//! declarations on top, so every lookup is a single table access.

mod field;
mod method;

pub use field::Field;
pub use method::Method;

use crate::assertions::Assertions;
use crate::error::{PhetioError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Plain JSON wire representation of a live value.
pub type StateObject = serde_json::Value;

/// Type-erased handle used wherever the value type does not matter.
pub type IOTypeRef = Rc<dyn AnyIOType>;

/// Name of the root of every supertype chain.
pub const OBJECT_IO: &str = "ObjectIO";

type ValueCheckFn<T> = Rc<dyn Fn(&T) -> bool>;
type StateValidatorFn = Rc<dyn Fn(&StateObject) -> std::result::Result<(), String>>;
type ToStateFn<T> = Rc<dyn Fn(&T, Assertions) -> Result<StateObject>>;
type FromStateFn<T> = Rc<dyn Fn(&StateObject, Assertions) -> Result<T>>;
type ApplyStateFn<T> = Rc<dyn Fn(&mut T, &StateObject, Assertions) -> Result<()>>;
type ConstructorFn<T> = Rc<dyn Fn() -> T>;

/// Shape of the state an IOType carries.
pub enum StateSchema<T: 'static> {
    /// No state; the type is behavioral only.
    None,
    /// A single primitive serialized as itself.
    Value { kind: String },
    /// Ordered wire keys bound to nested types and accessors.
    Fields(Vec<Field<T>>),
}

impl<T: 'static> Clone for StateSchema<T> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Value { kind } => Self::Value { kind: kind.clone() },
            Self::Fields(fields) => Self::Fields(fields.clone()),
        }
    }
}

/// Generated API entry for one type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeApi {
    pub type_name: String,
    pub documentation: String,
    pub supertype: Option<String>,
    pub ancestry: Vec<String>,
    pub state_schema: Option<SchemaApi>,
    pub methods: BTreeMap<String, MethodApi>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SchemaApi {
    Value(String),
    Fields(BTreeMap<String, String>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodApi {
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub documentation: String,
}

/// Object-safe view of an IOType, independent of its value type.
pub trait AnyIOType {
    fn type_name(&self) -> &str;

    fn documentation(&self) -> &str;

    fn supertype_name(&self) -> Option<&str>;

    /// This type followed by each supertype, ending at `ObjectIO`.
    fn ancestry(&self) -> &[String];

    /// Whether instances carry state that a state save should capture.
    fn has_state(&self) -> bool;

    /// Structural check of a state object against this type's schema.
    fn validate_state(&self, state: &StateObject) -> Result<()>;

    fn api(&self) -> TypeApi;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;

    fn is_subtype_of(&self, type_name: &str) -> bool {
        self.ancestry().iter().any(|name| name == type_name)
    }
}

pub struct IOType<T: 'static> {
    type_name: String,
    documentation: String,
    supertype: Option<String>,
    ancestry: Vec<String>,
    value_check: Option<ValueCheckFn<T>>,
    schema: StateSchema<T>,
    state_validator: Option<StateValidatorFn>,
    to_state: Option<ToStateFn<T>>,
    from_state: Option<FromStateFn<T>>,
    apply_state: Option<ApplyStateFn<T>>,
    constructor: Option<ConstructorFn<T>>,
    methods: BTreeMap<String, Method<T>>,
}

impl<T: 'static> IOType<T> {
    pub fn builder(type_name: &str) -> IOTypeBuilder<T> {
        IOTypeBuilder::new(type_name)
    }

    /// Erased handle to this type.
    #[must_use]
    pub fn erased(self: &Rc<Self>) -> IOTypeRef {
        self.clone()
    }

    #[must_use]
    pub fn schema(&self) -> &StateSchema<T> {
        &self.schema
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method<T>> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Whether `value` passes this type's value check.
    #[must_use]
    pub fn is_valid_value(&self, value: &T) -> bool {
        self.value_check.as_ref().map_or(true, |check| check(value))
    }

    /// Serializes a live value.
    pub fn to_state_object(&self, value: &T, assertions: Assertions) -> Result<StateObject> {
        assertions.check(self.is_valid_value(value), || {
            format!("value is not a valid {}", self.type_name)
        })?;

        if let Some(hook) = &self.to_state {
            return hook(value, assertions);
        }

        match &self.schema {
            StateSchema::None => Ok(StateObject::Null),
            StateSchema::Value { .. } => assertions.tolerate(
                Err(PhetioError::assertion(format!(
                    "{} declares a value schema without a toStateObject hook",
                    self.type_name
                ))),
                || StateObject::Null,
            ),
            StateSchema::Fields(fields) => {
                let mut object = serde_json::Map::with_capacity(fields.len());
                for field in fields {
                    let state = assertions.tolerate(field.read(value, assertions), || {
                        StateObject::Null
                    })?;
                    object.insert(field.key().to_string(), state);
                }
                Ok(StateObject::Object(object))
            }
        }
    }

    /// Builds a fresh value from a state object.
    pub fn from_state_object(&self, state: &StateObject, assertions: Assertions) -> Result<T> {
        if let Some(hook) = &self.from_state {
            return hook(state, assertions);
        }
        match &self.constructor {
            Some(constructor) => {
                let mut value = constructor();
                self.apply_state(&mut value, state, assertions)?;
                Ok(value)
            }
            None => Err(PhetioError::assertion(format!(
                "{} cannot create instances from state",
                self.type_name
            ))),
        }
    }

    /// Writes a state object into an existing value.
    pub fn apply_state(&self, value: &mut T, state: &StateObject, assertions: Assertions) -> Result<()> {
        if let Some(hook) = &self.apply_state {
            return hook(value, state, assertions);
        }

        let fields = match &self.schema {
            StateSchema::None => return Ok(()),
            StateSchema::Value { .. } => {
                let replacement = self.from_state_object(state, assertions)?;
                *value = replacement;
                return Ok(());
            }
            StateSchema::Fields(fields) => fields,
        };

        let Some(object) = state.as_object() else {
            return assertions.check(false, || {
                format!("{} state must be an object, got {state}", self.type_name)
            });
        };

        for key in object.keys() {
            assertions.check(fields.iter().any(|f| f.key() == key), || {
                format!("{} has no schema key {key}", self.type_name)
            })?;
        }

        // Every check runs before the first write so a failure leaves the
        // value untouched.
        for field in fields {
            match object.get(field.key()) {
                Some(field_state) if field.is_writable() && assertions.is_enabled() => {
                    field.io_type().validate_state(field_state).map_err(|err| {
                        PhetioError::assertion(format!(
                            "{} key {}: {}",
                            self.type_name,
                            field.key(),
                            err
                        ))
                    })?;
                }
                Some(_) => {}
                None => assertions.check(!field.is_writable(), || {
                    format!("{} state is missing key {}", self.type_name, field.key())
                })?,
            }
        }

        for field in fields {
            if let Some(field_state) = object.get(field.key()) {
                assertions.tolerate(field.write(value, field_state, assertions), || false)?;
            }
        }
        Ok(())
    }

    /// Calls a method on `target` after validating arity and arguments.
    /// Validation failures are reported in every assertion mode, except for
    /// methods that check their own arguments.
    pub fn invoke(
        &self,
        target: &mut T,
        method_name: &str,
        args: &[StateObject],
        assertions: Assertions,
    ) -> Result<StateObject> {
        let method = self
            .methods
            .get(method_name)
            .ok_or_else(|| PhetioError::unknown_method(&self.type_name, method_name))?;

        if !method.checks_own_arguments() {
            self.check_method_arguments(method, method_name, args)?;
        }

        let result = method.call(target, args, assertions)?;
        method.return_type().validate_state(&result).map_err(|err| {
            PhetioError::validation(format!(
                "{}.{} returned an invalid value: {}",
                self.type_name, method_name, err
            ))
        })?;
        Ok(result)
    }

    fn check_method_arguments(
        &self,
        method: &Method<T>,
        method_name: &str,
        args: &[StateObject],
    ) -> Result<()> {
        let expected = method.parameter_types().len();
        if args.len() != expected {
            return Err(PhetioError::validation(format!(
                "{}.{} expects {} argument(s), got {}",
                self.type_name,
                method_name,
                expected,
                args.len()
            )));
        }
        for (index, (arg, parameter_type)) in args.iter().zip(method.parameter_types()).enumerate() {
            parameter_type.validate_state(arg).map_err(|err| {
                PhetioError::validation(format!(
                    "{}.{} argument {}: {}",
                    self.type_name, method_name, index, err
                ))
            })?;
        }
        Ok(())
    }
}

impl<T: 'static> AnyIOType for IOType<T> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn documentation(&self) -> &str {
        &self.documentation
    }

    fn supertype_name(&self) -> Option<&str> {
        self.supertype.as_deref()
    }

    fn ancestry(&self) -> &[String] {
        &self.ancestry
    }

    fn has_state(&self) -> bool {
        !matches!(self.schema, StateSchema::None)
    }

    fn validate_state(&self, state: &StateObject) -> Result<()> {
        if let Some(validator) = &self.state_validator {
            return validator(state).map_err(|reason| {
                PhetioError::validation(format!("{}: {}", self.type_name, reason))
            });
        }
        match &self.schema {
            StateSchema::None | StateSchema::Value { .. } => Ok(()),
            StateSchema::Fields(fields) => {
                let object = state.as_object().ok_or_else(|| {
                    PhetioError::validation(format!(
                        "{}: expected an object, got {}",
                        self.type_name, state
                    ))
                })?;
                for field in fields {
                    let value = object.get(field.key()).ok_or_else(|| {
                        PhetioError::validation(format!(
                            "{}: missing key {}",
                            self.type_name,
                            field.key()
                        ))
                    })?;
                    field.io_type().validate_state(value)?;
                }
                Ok(())
            }
        }
    }

    fn api(&self) -> TypeApi {
        let state_schema = match &self.schema {
            StateSchema::None => None,
            StateSchema::Value { kind } => Some(SchemaApi::Value(kind.clone())),
            StateSchema::Fields(fields) => Some(SchemaApi::Fields(
                fields
                    .iter()
                    .map(|f| (f.key().to_string(), f.io_type().type_name().to_string()))
                    .collect(),
            )),
        };
        let methods = self
            .methods
            .iter()
            .map(|(name, method)| {
                (
                    name.clone(),
                    MethodApi {
                        return_type: method.return_type().type_name().to_string(),
                        parameter_types: method
                            .parameter_types()
                            .iter()
                            .map(|p| p.type_name().to_string())
                            .collect(),
                        documentation: method.documentation().to_string(),
                    },
                )
            })
            .collect();
        TypeApi {
            type_name: self.type_name.clone(),
            documentation: self.documentation.clone(),
            supertype: self.supertype.clone(),
            ancestry: self.ancestry.clone(),
            state_schema,
            methods,
        }
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Collects an IOType's declarations; [`IOTypeBuilder::build`] freezes them.
pub struct IOTypeBuilder<T: 'static> {
    inner: IOType<T>,
}

impl<T: 'static> IOTypeBuilder<T> {
    fn new(type_name: &str) -> Self {
        let ancestry = if type_name == OBJECT_IO {
            vec![type_name.to_string()]
        } else {
            vec![type_name.to_string(), OBJECT_IO.to_string()]
        };
        Self {
            inner: IOType {
                type_name: type_name.to_string(),
                documentation: String::new(),
                supertype: (type_name != OBJECT_IO).then(|| OBJECT_IO.to_string()),
                ancestry,
                value_check: None,
                schema: StateSchema::None,
                state_validator: None,
                to_state: None,
                from_state: None,
                apply_state: None,
                constructor: None,
                methods: BTreeMap::new(),
            },
        }
    }

    #[must_use]
    pub fn documentation(mut self, documentation: &str) -> Self {
        self.inner.documentation = documentation.to_string();
        self
    }

    /// Inherits everything the parent declares. Call before adding the
    /// child's own fields and methods so they take precedence.
    #[must_use]
    pub fn supertype(mut self, parent: &Rc<IOType<T>>) -> Self {
        let inner = &mut self.inner;
        inner.supertype = Some(parent.type_name.clone());
        inner.ancestry = std::iter::once(inner.type_name.clone())
            .chain(parent.ancestry.iter().cloned())
            .collect();
        inner.value_check = parent.value_check.clone();
        inner.schema = parent.schema.clone();
        inner.state_validator = parent.state_validator.clone();
        inner.to_state = parent.to_state.clone();
        inner.from_state = parent.from_state.clone();
        inner.apply_state = parent.apply_state.clone();
        inner.constructor = parent.constructor.clone();
        inner.methods = parent.methods.clone();
        self
    }

    #[must_use]
    pub fn value_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.inner.value_check = Some(Rc::new(check));
        self
    }

    /// Primitive schema: the value is its own state.
    #[must_use]
    pub fn value_schema(mut self, kind: &str) -> Self {
        self.inner.schema = StateSchema::Value {
            kind: kind.to_string(),
        };
        self
    }

    /// Adds a schema field, replacing an inherited one with the same key.
    #[must_use]
    pub fn field(mut self, field: Field<T>) -> Self {
        if !matches!(self.inner.schema, StateSchema::Fields(_)) {
            self.inner.schema = StateSchema::Fields(Vec::new());
        }
        if let StateSchema::Fields(fields) = &mut self.inner.schema {
            match fields.iter_mut().find(|f| f.key() == field.key()) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }
        self
    }

    #[must_use]
    pub fn state_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&StateObject) -> std::result::Result<(), String> + 'static,
    {
        self.inner.state_validator = Some(Rc::new(validator));
        self
    }

    #[must_use]
    pub fn to_state_object<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T, Assertions) -> Result<StateObject> + 'static,
    {
        self.inner.to_state = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn from_state_object<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StateObject, Assertions) -> Result<T> + 'static,
    {
        self.inner.from_state = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn apply_state<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T, &StateObject, Assertions) -> Result<()> + 'static,
    {
        self.inner.apply_state = Some(Rc::new(hook));
        self
    }

    /// Enables the default `from_state_object`: construct, then apply.
    #[must_use]
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        self.inner.constructor = Some(Rc::new(constructor));
        self
    }

    #[must_use]
    pub fn method(mut self, name: &str, method: Method<T>) -> Self {
        self.inner.methods.insert(name.to_string(), method);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<IOType<T>> {
        Rc::new(self.inner)
    }
}

impl<T: Default + 'static> IOTypeBuilder<T> {
    /// Default `from_state_object` starting from `T::default()`.
    #[must_use]
    pub fn default_constructor(self) -> Self {
        self.constructor(T::default)
    }
}
