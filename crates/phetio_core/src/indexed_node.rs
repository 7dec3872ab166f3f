//! Position of a node among its siblings as PhET-iO state.
//!
//! Restoring an index swaps the node with whatever occupies the target slot
//! instead of removing and reinserting it. A shift would move every node in
//! between and break indices already restored for those siblings; a swap
//! only displaces the single node in the way, which is corrected when its
//! own state is applied. Siblings can therefore be restored in any order.

use crate::assertions::Assertions;
use crate::callbacks::{CallbackId, CallbackOutbox};
use crate::emitter::ListenerId;
use crate::error::{PhetioError, Result};
use crate::io_type::{Field, IOType, Method, StateObject};
use crate::scene::{Node, WeakNode};
use crate::types::Builtins;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Behavior switches for [`apply_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexedNodeOptions {
    /// Restore a recorded index of 0. Off by default, where an index of 0
    /// is treated like a missing index and the node stays where it is.
    pub apply_zero_index: bool,
}

/// `{ "index": n }`, or `{ "index": null }` for a parentless node.
pub fn to_state_object(node: &Node, assertions: Assertions) -> Result<StateObject> {
    let parents = node.parents();
    assertions.check(parents.len() <= 1, || {
        format!("IndexedNodeIO supports a single parent, {node:?} has {}", parents.len())
    })?;
    let index = parents.first().and_then(|parent| parent.index_of_child(node));
    Ok(json!({ "index": index }))
}

/// Moves `node` to the recorded index by swapping it with the current
/// occupant of that slot.
pub fn apply_state(
    node: &Node,
    state: &StateObject,
    options: IndexedNodeOptions,
    assertions: Assertions,
) -> Result<()> {
    let index = match state.get("index") {
        None | Some(StateObject::Null) => return Ok(()),
        Some(value) => value.as_u64().and_then(|index| usize::try_from(index).ok()),
    };
    let Some(index) = index else {
        return assertions.check(false, || {
            format!("IndexedNodeIO index must be a non-negative integer that fits in usize, got {state}")
        });
    };
    if index == 0 && !options.apply_zero_index {
        tracing::trace!(node = node.name(), "Skipping zero index");
        return Ok(());
    }

    let parents = node.parents();
    assertions.check(parents.len() <= 1, || {
        format!("IndexedNodeIO supports a single parent, {node:?} has {}", parents.len())
    })?;
    let Some(parent) = parents.first() else {
        return Ok(());
    };

    let mut children = parent.children();
    let Some(current) = children.iter().position(|c| c == node) else {
        return assertions.check(false, || format!("{node:?} missing from its parent"));
    };
    if index >= children.len() {
        return assertions.check(false, || {
            format!(
                "IndexedNodeIO index {index} out of range for {} children",
                children.len()
            )
        });
    }
    if index == current {
        return Ok(());
    }
    children.swap(current, index);
    tracing::debug!(node = node.name(), from = current, to = index, "Restored node index");
    parent.set_children(children)
}

/// Index of the next visible sibling after (`forward`) or before `from`.
fn next_visible_index(children: &[Node], from: usize, forward: bool) -> Option<usize> {
    if forward {
        (from + 1..children.len()).find(|&i| children[i].is_visible())
    } else {
        (0..from).rev().find(|&i| children[i].is_visible())
    }
}

fn step(node: &Node, forward: bool) -> Result<()> {
    for parent in node.parents() {
        let children = parent.children();
        let Some(current) = children.iter().position(|c| c == node) else {
            continue;
        };
        if let Some(target) = next_visible_index(&children, current, forward) {
            parent.move_child_to_index(node, target)?;
        }
    }
    Ok(())
}

/// Moves the node one visible step toward the front of its parent's
/// rendering order. A no-op past the last visible sibling.
pub fn move_forward(node: &Node) -> Result<()> {
    step(node, true)
}

/// Mirror of [`move_forward`].
pub fn move_backward(node: &Node) -> Result<()> {
    step(node, false)
}

struct IndexLink {
    parent: Option<WeakNode>,
    listener: Option<ListenerId>,
}

/// Session-owned table of live `linkIndex` subscriptions.
#[derive(Default)]
pub struct IndexLinkRegistry {
    next_handle: Cell<u64>,
    links: RefCell<BTreeMap<u64, IndexLink>>,
}

impl IndexLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `listener` with the node's current index now and again after
    /// every change to its parent's children. Returns the handle for
    /// [`IndexLinkRegistry::unlink_index`].
    pub fn link_index<F>(&self, node: &Node, listener: F, assertions: Assertions) -> Result<u64>
    where
        F: Fn(Option<usize>) + 'static,
    {
        let parents = node.parents();
        assertions.check(parents.len() == 1, || {
            format!("linkIndex needs exactly one parent, {node:?} has {}", parents.len())
        })?;

        let listener = Rc::new(listener);
        listener(node.index_in_parent());

        let link = match parents.first() {
            Some(parent) => {
                let watched = node.downgrade();
                let notify = listener.clone();
                let id = parent.children_changed().add_listener(move |_: &()| {
                    if let Some(node) = watched.upgrade() {
                        notify(node.index_in_parent());
                    }
                });
                IndexLink {
                    parent: Some(parent.downgrade()),
                    listener: Some(id),
                }
            }
            None => IndexLink {
                parent: None,
                listener: None,
            },
        };

        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.links.borrow_mut().insert(handle, link);
        tracing::debug!(node = node.name(), handle, "Linked index listener");
        Ok(handle)
    }

    pub fn unlink_index(&self, handle: u64, assertions: Assertions) -> Result<()> {
        let link = self.links.borrow_mut().remove(&handle);
        let Some(link) = link else {
            return assertions.check(false, || format!("no index link with handle {handle}"));
        };
        if let (Some(parent), Some(listener)) = (link.parent.and_then(|p| p.upgrade()), link.listener)
        {
            parent.children_changed().remove_listener(listener);
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.borrow().is_empty()
    }
}

fn index_to_state(index: Option<usize>) -> StateObject {
    index.map_or(StateObject::Null, StateObject::from)
}

/// `NodeIO`: the supertype of every node type. Nodes expose their state
/// through separately instrumented properties, so it carries none itself.
pub fn node_io() -> Rc<IOType<Node>> {
    IOType::<Node>::builder("NodeIO")
        .documentation("The base type for graphical and potentially interactive objects")
        .build()
}

/// `IndexedNodeIO`, bound to the session's link registry and callback
/// outbox so remote listeners can subscribe.
pub fn indexed_node_io(
    builtins: &Builtins,
    links: &Rc<IndexLinkRegistry>,
    outbox: &Rc<CallbackOutbox>,
    options: IndexedNodeOptions,
) -> Rc<IOType<Node>> {
    let void = builtins.void.erased();
    let number = builtins.number.erased();

    let link_method = {
        let links = links.clone();
        let outbox = outbox.clone();
        Method::new(
            number.clone(),
            vec![builtins.index_listener.erased()],
            move |node: &mut Node, args: &[StateObject], assertions| {
                let callback = args
                    .first()
                    .and_then(StateObject::as_u64)
                    .map(CallbackId)
                    .ok_or_else(|| PhetioError::validation("linkIndex needs a callback id"))?;
                let outbox = outbox.clone();
                let handle = links.link_index(
                    node,
                    move |index| outbox.push(callback, vec![index_to_state(index)]),
                    assertions,
                )?;
                Ok(StateObject::from(handle))
            },
        )
        .with_documentation(
            "Calls the listener with this node's index now and whenever its parent's children \
             change. Returns a handle for unlinkIndex.",
        )
    };

    let unlink_method = {
        let links = links.clone();
        Method::new(
            void.clone(),
            vec![number.clone()],
            move |_: &mut Node, args: &[StateObject], assertions| {
                let handle = args
                    .first()
                    .and_then(StateObject::as_u64)
                    .ok_or_else(|| PhetioError::validation("unlinkIndex needs a handle"))?;
                links.unlink_index(handle, assertions)?;
                Ok(StateObject::Null)
            },
        )
        .with_documentation("Removes a listener added with linkIndex.")
    };

    IOType::<Node>::builder("IndexedNodeIO")
        .supertype(&builtins.node)
        .documentation("Node that can be moved forward/back by index, and whose index is part of its state")
        .field(Field::documented("index", builtins.nullable_number.erased()))
        .to_state_object(to_state_object)
        .apply_state(move |node: &mut Node, state: &StateObject, assertions| {
            apply_state(node, state, options, assertions)
        })
        .method("linkIndex", link_method)
        .method("unlinkIndex", unlink_method)
        .method(
            "moveForward",
            Method::new(void.clone(), Vec::new(), |node: &mut Node, _: &[StateObject], _| {
                move_forward(node)?;
                Ok(StateObject::Null)
            })
            .with_documentation("Move this node one index forward in each of its parents, skipping invisible siblings."),
        )
        .method(
            "moveBackward",
            Method::new(void, Vec::new(), |node: &mut Node, _: &[StateObject], _| {
                move_backward(node)?;
                Ok(StateObject::Null)
            })
            .with_documentation("Move this node one index backward in each of its parents, skipping invisible siblings."),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_type::AnyIOType;
    use crate::registry::TypeRegistry;

    fn family(names: &[&str]) -> (Node, Vec<Node>) {
        let parent = Node::new("parent");
        let children: Vec<Node> = names.iter().map(|n| Node::new(n)).collect();
        parent.set_children(children.clone()).unwrap();
        (parent, children)
    }

    fn order(parent: &Node) -> Vec<String> {
        parent.children().iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_state_records_index() {
        let (_parent, kids) = family(&["a", "b"]);
        assert_eq!(
            to_state_object(&kids[1], Assertions::Enabled).unwrap(),
            json!({ "index": 1 })
        );
        let orphan = Node::new("orphan");
        assert_eq!(
            to_state_object(&orphan, Assertions::Enabled).unwrap(),
            json!({ "index": null })
        );
    }

    #[test]
    fn test_multiple_parents_assert() {
        let (_p1, kids) = family(&["a"]);
        let p2 = Node::new("p2");
        p2.add_child(&kids[0]).unwrap();
        assert!(to_state_object(&kids[0], Assertions::Enabled).is_err());
        assert!(to_state_object(&kids[0], Assertions::Disabled).is_ok());
    }

    #[test]
    fn test_swap_keeps_permutation_with_legacy_zero_gate() {
        let (parent, kids) = family(&["A", "B", "C", "D"]);
        let options = IndexedNodeOptions::default();
        apply_state(&kids[0], &json!({ "index": 2 }), options, Assertions::Enabled).unwrap();
        assert_eq!(order(&parent), ["C", "B", "A", "D"]);
        // index 0 is skipped under the legacy gate
        apply_state(&kids[2], &json!({ "index": 0 }), options, Assertions::Enabled).unwrap();
        assert_eq!(order(&parent), ["C", "B", "A", "D"]);
    }

    #[test]
    fn test_swap_applies_zero_when_enabled() {
        let (parent, kids) = family(&["A", "B", "C", "D"]);
        let options = IndexedNodeOptions {
            apply_zero_index: true,
        };
        apply_state(&kids[2], &json!({ "index": 0 }), options, Assertions::Enabled).unwrap();
        apply_state(&kids[0], &json!({ "index": 2 }), options, Assertions::Enabled).unwrap();
        assert_eq!(order(&parent), ["C", "B", "A", "D"]);
    }

    #[test]
    fn test_out_of_range_index() {
        let (parent, kids) = family(&["A", "B"]);
        let options = IndexedNodeOptions::default();
        assert!(apply_state(&kids[0], &json!({ "index": 5 }), options, Assertions::Enabled).is_err());
        apply_state(&kids[0], &json!({ "index": 5 }), options, Assertions::Disabled).unwrap();
        assert_eq!(order(&parent), ["A", "B"]);
    }

    #[test]
    fn test_unrepresentable_index() {
        let (parent, kids) = family(&["A", "B"]);
        let options = IndexedNodeOptions {
            apply_zero_index: true,
        };
        for index in [json!(-1), json!(1.5), json!(u64::MAX)] {
            let state = json!({ "index": index });
            let err = apply_state(&kids[1], &state, options, Assertions::Enabled).unwrap_err();
            assert!(err.is_assertion());
            apply_state(&kids[1], &state, options, Assertions::Disabled).unwrap();
        }
        assert_eq!(order(&parent), ["A", "B"]);
    }

    #[test]
    fn test_move_forward_skips_invisible() {
        let (parent, kids) = family(&["A", "B", "C"]);
        kids[1].set_visible(false);
        move_forward(&kids[0]).unwrap();
        assert_eq!(parent.index_of_child(&kids[0]), Some(2));
        move_backward(&kids[0]).unwrap();
        assert_eq!(order(&parent), ["B", "A", "C"]);
    }

    #[test]
    fn test_moves_at_boundary_are_noops() {
        let (parent, kids) = family(&["A", "B", "C"]);
        kids[2].set_visible(false);
        move_forward(&kids[1]).unwrap();
        assert_eq!(order(&parent), ["A", "B", "C"]);
        move_backward(&kids[0]).unwrap();
        assert_eq!(order(&parent), ["A", "B", "C"]);
    }

    #[test]
    fn test_link_index_follows_changes() {
        let (parent, kids) = family(&["A", "B"]);
        let links = IndexLinkRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handle = links
            .link_index(&kids[0], move |i| sink.borrow_mut().push(i), Assertions::Enabled)
            .unwrap();
        move_forward(&kids[0]).unwrap();
        links.unlink_index(handle, Assertions::Enabled).unwrap();
        move_backward(&kids[0]).unwrap();
        assert_eq!(*seen.borrow(), vec![Some(0), Some(1)]);
        assert!(links.is_empty());
        assert_eq!(parent.children_changed().listener_count(), 0);
        assert!(links.unlink_index(handle, Assertions::Enabled).is_err());
    }

    #[test]
    fn test_remote_methods_queue_callbacks() {
        let mut registry = TypeRegistry::new();
        let builtins = Builtins::register(&mut registry).unwrap();
        let links = Rc::new(IndexLinkRegistry::new());
        let outbox = Rc::new(CallbackOutbox::new());
        let io = indexed_node_io(&builtins, &links, &outbox, IndexedNodeOptions::default());
        assert_eq!(io.ancestry(), ["IndexedNodeIO", "NodeIO", "ObjectIO"]);

        let (_parent, mut kids) = family(&["A", "B", "C"]);
        let handle = io
            .invoke(&mut kids[0], "linkIndex", &[json!(9)], Assertions::Enabled)
            .unwrap();
        io.invoke(&mut kids[0], "moveForward", &[], Assertions::Enabled)
            .unwrap();
        let calls = outbox.drain();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].callback_id, CallbackId(9));
        assert_eq!(calls[1].args, vec![json!(1)]);

        io.invoke(&mut kids[0], "unlinkIndex", &[handle], Assertions::Enabled)
            .unwrap();
        assert!(links.is_empty());
        assert!(io
            .invoke(&mut kids[0], "linkIndex", &[json!("cb")], Assertions::Disabled)
            .is_err());
    }
}
