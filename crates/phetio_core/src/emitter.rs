//! Listener notification with optional parameter validation.
//!
//! [`TinyEmitter`] is the bare add/remove/emit contract. [`Emitter`] layers
//! declared [`Parameter`]s on top and checks every emission against them.

use crate::assertions::Assertions;
use crate::error::{PhetioError, Result};
use crate::io_type::{IOTypeRef, StateObject};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by `add_listener`, used to remove the listener again.
pub type ListenerId = u64;

type Listener<A> = Rc<dyn Fn(&A)>;
type ValidatorFn = Rc<dyn Fn(&StateObject) -> bool>;

pub struct TinyEmitter<A: ?Sized + 'static> {
    listeners: RefCell<Vec<(ListenerId, Listener<A>)>>,
    next_id: Cell<ListenerId>,
    disposed: Cell<bool>,
}

impl<A: ?Sized + 'static> Default for TinyEmitter<A> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            disposed: Cell::new(false),
        }
    }
}

impl<A: ?Sized + 'static> TinyEmitter<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&A) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    #[must_use]
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|(listener_id, _)| *listener_id == id)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Notifies the listeners registered when the emission starts. Listeners
    /// may add or remove listeners (or emit again) while being notified.
    pub fn emit(&self, args: &A) {
        if self.disposed.get() {
            return;
        }
        let snapshot: Vec<Listener<A>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(args);
        }
    }

    /// Drops every listener. Later emissions are ignored.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.listeners.borrow_mut().clear();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

/// One positional parameter of an emitter or action.
#[derive(Clone)]
pub struct Parameter {
    pub name: String,
    pub phetio_type: IOTypeRef,
    validator: Option<ValidatorFn>,
}

impl Parameter {
    pub fn new(name: &str, phetio_type: IOTypeRef) -> Self {
        Self {
            name: name.to_string(),
            phetio_type,
            validator: None,
        }
    }

    /// Replaces the type's own validation for this parameter.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&StateObject) -> bool + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }

    /// `None` when `value` is acceptable for this parameter.
    #[must_use]
    pub fn validation_error(&self, value: &StateObject) -> Option<String> {
        match &self.validator {
            Some(validator) => (!validator(value))
                .then(|| format!("{} rejected by validator: {}", self.name, value)),
            None => self
                .phetio_type
                .validate_state(value)
                .err()
                .map(|err| format!("{}: {}", self.name, err)),
        }
    }
}

/// One slot per parameter: `None` when the argument at that position is
/// valid, otherwise a description of the problem.
#[must_use]
pub fn validation_errors(parameters: &[Parameter], args: &[StateObject]) -> Vec<Option<String>> {
    parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| match args.get(index) {
            Some(arg) => parameter.validation_error(arg),
            None => Some(format!("{}: missing argument", parameter.name)),
        })
        .collect()
}

/// Checks arity and every argument. Failures are validation errors when
/// assertions are enabled and are logged and accepted otherwise.
pub fn check_arguments(
    context: &str,
    parameters: &[Parameter],
    args: &[StateObject],
    assertions: Assertions,
) -> Result<()> {
    let mut problems: Vec<String> = validation_errors(parameters, args)
        .into_iter()
        .flatten()
        .collect();
    if args.len() > parameters.len() {
        problems.push(format!(
            "expected {} argument(s), got {}",
            parameters.len(),
            args.len()
        ));
    }
    if problems.is_empty() {
        return Ok(());
    }
    let message = format!("{}: {}", context, problems.join("; "));
    match assertions {
        Assertions::Enabled => Err(PhetioError::Validation(message)),
        Assertions::Disabled => {
            tracing::warn!(context = %context, problems = %message, "Accepting invalid arguments");
            Ok(())
        }
    }
}

/// Emitter whose emissions are validated against declared parameters.
pub struct Emitter {
    name: String,
    parameters: Vec<Parameter>,
    assertions: Assertions,
    listeners: TinyEmitter<[StateObject]>,
}

impl Emitter {
    pub fn new(name: &str, parameters: Vec<Parameter>, assertions: Assertions) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            assertions,
            listeners: TinyEmitter::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn emit(&self, args: &[StateObject]) -> Result<()> {
        check_arguments(&self.name, &self.parameters, args, self.assertions)?;
        self.listeners.emit(args);
        Ok(())
    }

    /// Emits arguments that were already checked by the caller.
    pub(crate) fn emit_validated(&self, args: &[StateObject]) {
        self.listeners.emit(args);
    }

    #[must_use]
    pub fn get_validation_errors(&self, args: &[StateObject]) -> Vec<Option<String>> {
        validation_errors(&self.parameters, args)
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&[StateObject]) + 'static,
    {
        self.listeners.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove_listener(id)
    }

    #[must_use]
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.has_listener(id)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    pub fn dispose(&self) {
        self.listeners.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.listeners.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_type::IOType;
    use serde_json::json;

    fn number_type() -> IOTypeRef {
        IOType::<f64>::builder("NumberIO")
            .state_validator(|s: &StateObject| {
                if s.is_number() {
                    Ok(())
                } else {
                    Err(format!("{s} is not a number"))
                }
            })
            .build()
            .erased()
    }

    #[test]
    fn test_listener_may_remove_itself_during_emit() {
        let emitter: Rc<TinyEmitter<u32>> = Rc::new(TinyEmitter::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let id = Rc::new(Cell::new(0));

        let (inner, seen_inner, id_inner) = (emitter.clone(), seen.clone(), id.clone());
        id.set(emitter.add_listener(move |v: &u32| {
            seen_inner.borrow_mut().push(*v);
            inner.remove_listener(id_inner.get());
        }));

        emitter.emit(&1);
        emitter.emit(&2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_dispose_clears_listeners() {
        let emitter: TinyEmitter<()> = TinyEmitter::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let id = emitter.add_listener(move |_: &()| counter.set(counter.get() + 1));
        emitter.emit(&());
        emitter.dispose();
        emitter.emit(&());
        assert_eq!(calls.get(), 1);
        assert!(!emitter.has_listener(id));
    }

    #[test]
    fn test_emitter_rejects_wrong_type() {
        let emitter = Emitter::new(
            "valueChanged",
            vec![Parameter::new("x", number_type())],
            Assertions::Enabled,
        );
        assert!(emitter.emit(&[json!(4)]).is_ok());
        let err = emitter.emit(&[json!("hello")]).unwrap_err();
        assert!(matches!(err, PhetioError::Validation(_)));
        assert!(emitter.emit(&[json!(1), json!(2)]).is_err());
    }

    #[test]
    fn test_validator_overrides_type() {
        let parameter =
            Parameter::new("x", number_type()).with_validator(|v: &StateObject| {
                v.as_f64().is_some_and(|n| n < 3.0)
            });
        assert!(parameter.validation_error(&json!(2)).is_none());
        assert!(parameter.validation_error(&json!(4)).is_some());

        let errors = validation_errors(&[parameter], &[]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_deref().unwrap_or("").contains("missing"));
    }

    #[test]
    fn test_production_accepts_invalid_arguments() {
        let emitter = Emitter::new(
            "valueChanged",
            vec![Parameter::new("x", number_type())],
            Assertions::Disabled,
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        emitter.add_listener(move |args: &[StateObject]| sink.borrow_mut().push(args.to_vec()));
        emitter.emit(&[json!("oops")]).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }
}
