//! Session-scoped namespace of IOTypes.
//!
//! One registry lives inside each PhET-iO session and is dropped with it.
//! Type names are unique; parametric types (`NullableIO<NumberIO>`, ...)
//! are built once and then served from the registry.

use crate::error::{PhetioError, Result};
use crate::io_type::{AnyIOType, IOType, IOTypeRef, TypeApi};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, IOTypeRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. Registering the same `Rc` twice is a no-op; a
    /// different type under an existing name is rejected.
    pub fn register<T: 'static>(&mut self, io_type: &Rc<IOType<T>>) -> Result<()> {
        self.register_erased(io_type.erased())
    }

    pub fn register_erased(&mut self, io_type: IOTypeRef) -> Result<()> {
        let name = io_type.type_name().to_string();
        if let Some(existing) = self.types.get(&name) {
            if Rc::ptr_eq(existing, &io_type) {
                return Ok(());
            }
            return Err(PhetioError::DuplicateType(name));
        }
        tracing::debug!(type_name = %name, "Registered IOType");
        self.types.insert(name, io_type);
        Ok(())
    }

    /// Returns the type registered under `name`, building and registering
    /// it first when absent.
    pub fn get_or_register<T, F>(&mut self, name: &str, build: F) -> Result<Rc<IOType<T>>>
    where
        T: 'static,
        F: FnOnce() -> Rc<IOType<T>>,
    {
        if self.types.contains_key(name) {
            return self
                .get_typed::<T>(name)
                .ok_or_else(|| PhetioError::DuplicateType(name.to_string()));
        }
        let io_type = build();
        if io_type.type_name() != name {
            return Err(PhetioError::assertion(format!(
                "built type {} does not match requested name {}",
                io_type.type_name(),
                name
            )));
        }
        self.register(&io_type)?;
        Ok(io_type)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IOTypeRef> {
        self.types.get(name)
    }

    /// Typed handle, or `None` when absent or registered for another value
    /// type.
    #[must_use]
    pub fn get_typed<T: 'static>(&self, name: &str) -> Option<Rc<IOType<T>>> {
        let erased = self.types.get(name)?.clone();
        erased.into_any().downcast::<IOType<T>>().ok()
    }

    /// Looks a type up, failing with [`PhetioError::UnknownType`].
    pub fn require(&self, name: &str) -> Result<&IOTypeRef> {
        self.get(name)
            .ok_or_else(|| PhetioError::UnknownType(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Generated API for every registered type, keyed by type name.
    #[must_use]
    pub fn api(&self) -> BTreeMap<String, TypeApi> {
        self.types
            .iter()
            .map(|(name, io_type)| (name.clone(), io_type.api()))
            .collect()
    }
}
