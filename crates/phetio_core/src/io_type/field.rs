//! State schema entries.
//!
//! A [`Field`] binds one wire key to a nested IOType and to an explicit
//! accessor pair on the owning value. The key is emitted exactly as
//! written, so a private-looking key such as `_secretName` and a public key
//! backed by a private member are both just declarations; nothing is looked
//! up by name at (de)serialization time.

use super::{IOType, IOTypeRef, StateObject};
use crate::assertions::Assertions;
use crate::error::{PhetioError, Result};
use std::rc::Rc;

type ReadFn<T> = Rc<dyn Fn(&T, Assertions) -> Result<StateObject>>;
type WriteFn<T> = Rc<dyn Fn(&mut T, &StateObject, Assertions) -> Result<()>>;

pub struct Field<T: 'static> {
    key: String,
    io_type: IOTypeRef,
    read: Option<ReadFn<T>>,
    write: Option<WriteFn<T>>,
}

impl<T: 'static> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            io_type: self.io_type.clone(),
            read: self.read.clone(),
            write: self.write.clone(),
        }
    }
}

impl<T: 'static> Field<T> {
    /// Read/write field. Reads clone the member out through `get`; writes
    /// rebuild it with the nested type's `from_state_object` and hand it to
    /// `set`.
    pub fn value<U, G, S>(key: &str, io_type: &Rc<IOType<U>>, get: G, set: S) -> Self
    where
        U: 'static,
        G: Fn(&T) -> U + 'static,
        S: Fn(&mut T, U) + 'static,
    {
        let reader = io_type.clone();
        let writer = io_type.clone();
        Self {
            key: key.to_string(),
            io_type: io_type.erased(),
            read: Some(Rc::new(move |owner, assertions| {
                reader.to_state_object(&get(owner), assertions)
            })),
            write: Some(Rc::new(move |owner, state, assertions| {
                let value = writer.from_state_object(state, assertions)?;
                set(owner, value);
                Ok(())
            })),
        }
    }

    /// Derived field: serialized, never written by the default `apply_state`.
    pub fn read_only<U, G>(key: &str, io_type: &Rc<IOType<U>>, get: G) -> Self
    where
        U: 'static,
        G: Fn(&T) -> U + 'static,
    {
        let reader = io_type.clone();
        Self {
            key: key.to_string(),
            io_type: io_type.erased(),
            read: Some(Rc::new(move |owner, assertions| {
                reader.to_state_object(&get(owner), assertions)
            })),
            write: None,
        }
    }

    /// Composite member applied in place through the nested type's
    /// `apply_state`.
    pub fn nested<U, G, M>(key: &str, io_type: &Rc<IOType<U>>, get: G, get_mut: M) -> Self
    where
        U: 'static,
        G: Fn(&T) -> &U + 'static,
        M: Fn(&mut T) -> &mut U + 'static,
    {
        let reader = io_type.clone();
        let writer = io_type.clone();
        Self {
            key: key.to_string(),
            io_type: io_type.erased(),
            read: Some(Rc::new(move |owner, assertions| {
                reader.to_state_object(get(owner), assertions)
            })),
            write: Some(Rc::new(move |owner, state, assertions| {
                writer.apply_state(get_mut(owner), state, assertions)
            })),
        }
    }

    /// Schema entry without accessors, for types whose custom hooks do the
    /// (de)serialization. Still drives validation and the generated API.
    pub fn documented(key: &str, io_type: IOTypeRef) -> Self {
        Self {
            key: key.to_string(),
            io_type,
            read: None,
            write: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn io_type(&self) -> &IOTypeRef {
        &self.io_type
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    pub(crate) fn read(&self, owner: &T, assertions: Assertions) -> Result<StateObject> {
        match &self.read {
            Some(read) => read(owner, assertions),
            None => Err(PhetioError::assertion(format!(
                "schema key {} has no accessor",
                self.key
            ))),
        }
    }

    /// `Ok(false)` when the field is read-only.
    pub(crate) fn write(
        &self,
        owner: &mut T,
        state: &StateObject,
        assertions: Assertions,
    ) -> Result<bool> {
        match &self.write {
            Some(write) => write(owner, state, assertions).map(|()| true),
            None => Ok(false),
        }
    }
}
