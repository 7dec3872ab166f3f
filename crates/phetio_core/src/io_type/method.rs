use super::{IOTypeRef, StateObject};
use crate::assertions::Assertions;
use crate::error::Result;
use std::rc::Rc;

type MethodFn<T> = Rc<dyn Fn(&mut T, &[StateObject], Assertions) -> Result<StateObject>>;

/// Remotely invocable operation on instances of an IOType.
///
/// Arguments arrive as state objects and are validated against
/// `parameter_types` before the implementation runs, unless the method
/// checks its own arguments. The return value is always validated against
/// `return_type` before it is handed back.
pub struct Method<T: 'static> {
    return_type: IOTypeRef,
    parameter_types: Vec<IOTypeRef>,
    implementation: MethodFn<T>,
    documentation: String,
    checks_own_arguments: bool,
}

impl<T: 'static> Clone for Method<T> {
    fn clone(&self) -> Self {
        Self {
            return_type: self.return_type.clone(),
            parameter_types: self.parameter_types.clone(),
            implementation: self.implementation.clone(),
            documentation: self.documentation.clone(),
            checks_own_arguments: self.checks_own_arguments,
        }
    }
}

impl<T: 'static> Method<T> {
    pub fn new<F>(return_type: IOTypeRef, parameter_types: Vec<IOTypeRef>, implementation: F) -> Self
    where
        F: Fn(&mut T, &[StateObject], Assertions) -> Result<StateObject> + 'static,
    {
        Self {
            return_type,
            parameter_types,
            implementation: Rc::new(implementation),
            documentation: String::new(),
            checks_own_arguments: false,
        }
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.to_string();
        self
    }

    /// Leaves arity and argument validation to the implementation, whose
    /// parameters may carry validators that replace the declared types.
    #[must_use]
    pub fn checking_own_arguments(mut self) -> Self {
        self.checks_own_arguments = true;
        self
    }

    #[must_use]
    pub fn checks_own_arguments(&self) -> bool {
        self.checks_own_arguments
    }

    #[must_use]
    pub fn return_type(&self) -> &IOTypeRef {
        &self.return_type
    }

    #[must_use]
    pub fn parameter_types(&self) -> &[IOTypeRef] {
        &self.parameter_types
    }

    #[must_use]
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub(crate) fn call(
        &self,
        target: &mut T,
        args: &[StateObject],
        assertions: Assertions,
    ) -> Result<StateObject> {
        (self.implementation)(target, args, assertions)
    }
}
