//! Instrumented callable with validated parameters and an
//! executed-notification.
//!
//! Disposal may be requested from inside the action or one of its
//! listeners. The request is recorded and teardown happens once the
//! outermost `execute` returns, so everything still running on the stack
//! sees a live action.

use crate::assertions::Assertions;
use crate::emitter::{check_arguments, validation_errors, Emitter, Parameter};
use crate::error::{PhetioError, Result};
use crate::io_type::{AnyIOType, IOType, Method, StateObject};
use crate::registry::TypeRegistry;
use crate::types::Builtins;
use std::cell::Cell;
use std::rc::Rc;

type ActionFn = Box<dyn Fn(&PhetioAction, &[StateObject]) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalState {
    Active,
    /// Disposal was requested while an `execute` was on the stack.
    PendingDisposal,
    Disposed,
}

struct ActionInner {
    name: String,
    action: ActionFn,
    parameters: Vec<Parameter>,
    executed_emitter: Emitter,
    assertions: Assertions,
    depth: Cell<usize>,
    state: Cell<DisposalState>,
}

/// Shared handle; clones refer to the same action.
#[derive(Clone)]
pub struct PhetioAction {
    inner: Rc<ActionInner>,
}

/// Tracks one in-flight `execute` and finishes a pending disposal when the
/// last one unwinds, including on error.
struct ExecutionGuard<'a> {
    action: &'a PhetioAction,
}

impl<'a> ExecutionGuard<'a> {
    fn enter(action: &'a PhetioAction) -> Self {
        let depth = &action.inner.depth;
        depth.set(depth.get() + 1);
        Self { action }
    }
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        let inner = &self.action.inner;
        inner.depth.set(inner.depth.get().saturating_sub(1));
        if inner.depth.get() == 0 && inner.state.get() == DisposalState::PendingDisposal {
            self.action.tear_down();
        }
    }
}

impl PhetioAction {
    /// `action` receives the action itself so it can execute or dispose it
    /// reentrantly without holding a strong self reference.
    pub fn new<F>(name: &str, parameters: Vec<Parameter>, assertions: Assertions, action: F) -> Self
    where
        F: Fn(&PhetioAction, &[StateObject]) -> Result<()> + 'static,
    {
        let executed_emitter = Emitter::new(
            &format!("{name}.executedEmitter"),
            parameters.clone(),
            assertions,
        );
        Self {
            inner: Rc::new(ActionInner {
                name: name.to_string(),
                action: Box::new(action),
                parameters,
                executed_emitter,
                assertions,
                depth: Cell::new(0),
                state: Cell::new(DisposalState::Active),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.inner.parameters
    }

    /// Fires after each execution with the same arguments.
    #[must_use]
    pub fn executed_emitter(&self) -> &Emitter {
        &self.inner.executed_emitter
    }

    /// Validates `args`, runs the action, then notifies the executed
    /// emitter. A reentrant `execute` from inside the action completes,
    /// notification included, before the outer call notifies.
    pub fn execute(&self, args: &[StateObject]) -> Result<()> {
        let inner = &self.inner;
        if inner.state.get() == DisposalState::Disposed {
            return inner
                .assertions
                .check(false, || format!("{} executed after disposal", inner.name));
        }
        check_arguments(&inner.name, &inner.parameters, args, inner.assertions)?;

        let _guard = ExecutionGuard::enter(self);
        (inner.action)(self, args)?;
        inner.executed_emitter.emit_validated(args);
        Ok(())
    }

    #[must_use]
    pub fn get_validation_errors(&self, args: &[StateObject]) -> Vec<Option<String>> {
        validation_errors(&self.inner.parameters, args)
    }

    /// Completes immediately when idle, otherwise when the outermost
    /// `execute` returns.
    pub fn dispose(&self) -> Result<()> {
        let inner = &self.inner;
        match inner.state.get() {
            DisposalState::Active if inner.depth.get() > 0 => {
                tracing::debug!(action = %inner.name, depth = inner.depth.get(), "Deferring disposal");
                inner.state.set(DisposalState::PendingDisposal);
                Ok(())
            }
            DisposalState::Active => {
                self.tear_down();
                Ok(())
            }
            DisposalState::PendingDisposal | DisposalState::Disposed => inner
                .assertions
                .check(false, || format!("{} disposed twice", inner.name)),
        }
    }

    /// False until teardown has completed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.get() == DisposalState::Disposed
    }

    #[must_use]
    pub fn disposal_state(&self) -> DisposalState {
        self.inner.state.get()
    }

    fn tear_down(&self) {
        let inner = &self.inner;
        inner.state.set(DisposalState::Disposed);
        inner.executed_emitter.dispose();
        tracing::debug!(action = %inner.name, "Disposed action");
    }
}

/// `PhetioActionIO<P1, P2, ...>` for the given parameters.
pub fn phetio_action_io(
    registry: &mut TypeRegistry,
    builtins: &Builtins,
    parameters: &[Parameter],
) -> Result<Rc<IOType<PhetioAction>>> {
    let parameter_types: Vec<_> = parameters.iter().map(|p| p.phetio_type.clone()).collect();
    let names: Vec<&str> = parameter_types.iter().map(|t| t.type_name()).collect();
    let name = format!("PhetioActionIO<{}>", names.join(", "));
    let void = builtins.void.erased();
    let object = builtins.object.erased();
    let errors = builtins.validation_errors.erased();

    registry.get_or_register(&name, || {
        IOType::<PhetioAction>::builder(&name)
            .documentation("An action that can be executed and listened to")
            .method(
                "execute",
                Method::new(
                    void,
                    parameter_types.clone(),
                    |action: &mut PhetioAction, args: &[StateObject], _| {
                        action.execute(args)?;
                        Ok(StateObject::Null)
                    },
                )
                .with_documentation("Executes the function the action is wrapping.")
                .checking_own_arguments(),
            )
            .method(
                "getValidationErrors",
                Method::new(
                    errors,
                    vec![object; parameter_types.len()],
                    |action: &mut PhetioAction, args: &[StateObject], _| {
                        let errors = action.get_validation_errors(args);
                        serde_json::to_value(errors).map_err(PhetioError::from)
                    },
                )
                .with_documentation(
                    "Checks the arguments without executing. Returns null or an error message for each parameter.",
                ),
            )
            .build()
    })
}
