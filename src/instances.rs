//! Instrumented instances addressed by phetioID.

use phetio_core::{AnyIOType, Assertions, IOType, PhetioError, Result, StateObject};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A live instrumented value together with its IOType.
pub trait PhetioObject {
    fn io_type(&self) -> &dyn AnyIOType;

    fn to_state(&self, assertions: Assertions) -> Result<StateObject>;

    fn apply_state(&self, state: &StateObject, assertions: Assertions) -> Result<()>;

    fn invoke(&self, method: &str, args: &[StateObject], assertions: Assertions) -> Result<StateObject>;
}

/// Binds a shared value to its typed IOType.
pub struct TypedInstance<T: 'static> {
    io_type: Rc<IOType<T>>,
    value: Rc<RefCell<T>>,
}

impl<T: 'static> TypedInstance<T> {
    pub fn new(io_type: &Rc<IOType<T>>, value: Rc<RefCell<T>>) -> Self {
        Self {
            io_type: io_type.clone(),
            value,
        }
    }

    fn busy(&self) -> PhetioError {
        PhetioError::validation(format!(
            "{} instance is already in use further up the call stack",
            self.io_type.type_name()
        ))
    }
}

impl<T: 'static> PhetioObject for TypedInstance<T> {
    fn io_type(&self) -> &dyn AnyIOType {
        self.io_type.as_ref()
    }

    fn to_state(&self, assertions: Assertions) -> Result<StateObject> {
        let value = self.value.try_borrow().map_err(|_| self.busy())?;
        self.io_type.to_state_object(&value, assertions)
    }

    fn apply_state(&self, state: &StateObject, assertions: Assertions) -> Result<()> {
        let mut value = self.value.try_borrow_mut().map_err(|_| self.busy())?;
        self.io_type.apply_state(&mut value, state, assertions)
    }

    fn invoke(&self, method: &str, args: &[StateObject], assertions: Assertions) -> Result<StateObject> {
        let mut value = self.value.try_borrow_mut().map_err(|_| self.busy())?;
        self.io_type.invoke(&mut value, method, args, assertions)
    }
}

/// phetioID → instance. Iteration is in phetioID order.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: RefCell<BTreeMap<String, Rc<dyn PhetioObject>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous instance under `phetio_id`, if any.
    pub fn insert(&self, phetio_id: &str, instance: Rc<dyn PhetioObject>) -> Option<Rc<dyn PhetioObject>> {
        self.instances
            .borrow_mut()
            .insert(phetio_id.to_string(), instance)
    }

    pub fn remove(&self, phetio_id: &str) -> Option<Rc<dyn PhetioObject>> {
        self.instances.borrow_mut().remove(phetio_id)
    }

    /// The returned handle outlives the registry borrow, so the instance
    /// may register or remove other instances while it runs.
    pub fn get(&self, phetio_id: &str) -> Option<Rc<dyn PhetioObject>> {
        self.instances.borrow().get(phetio_id).cloned()
    }

    pub fn contains(&self, phetio_id: &str) -> bool {
        self.instances.borrow().contains_key(phetio_id)
    }

    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> Vec<(String, Rc<dyn PhetioObject>)> {
        self.instances
            .borrow()
            .iter()
            .map(|(id, instance)| (id.clone(), instance.clone()))
            .collect()
    }
}
