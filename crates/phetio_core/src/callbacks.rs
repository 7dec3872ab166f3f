//! Remote listener plumbing.
//!
//! A wrapper frame cannot hand a closure across the wire, so methods that
//! accept a listener (`FunctionIO` parameters) receive a numeric callback id
//! instead. Invocations of that listener are queued here until the host
//! drains them.

use crate::io_type::StateObject;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Identifier of a listener owned by the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(pub u64);

/// A queued invocation of a remote listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCallback {
    pub callback_id: CallbackId,
    pub args: Vec<StateObject>,
}

#[derive(Debug, Default)]
pub struct CallbackOutbox {
    pending: RefCell<Vec<RemoteCallback>>,
}

impl CallbackOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, callback_id: CallbackId, args: Vec<StateObject>) {
        tracing::trace!(callback = callback_id.0, "Queued remote callback");
        self.pending
            .borrow_mut()
            .push(RemoteCallback { callback_id, args });
    }

    /// Removes and returns every queued invocation, oldest first.
    pub fn drain(&self) -> Vec<RemoteCallback> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}
