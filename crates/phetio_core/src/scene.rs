//! Minimal scene graph: ordered children, weak parent links, visibility
//! and a children-changed notification.

use crate::emitter::TinyEmitter;
use crate::error::{PhetioError, Result};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

struct NodeInner {
    name: String,
    visible: Cell<bool>,
    parents: RefCell<Vec<Weak<NodeInner>>>,
    children: RefCell<Vec<Node>>,
    children_changed: TinyEmitter<()>,
}

/// Shared handle to a scene-graph node. Clones refer to the same node;
/// equality is identity.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

/// Non-owning handle, used by listeners that must not keep a node alive.
#[derive(Clone)]
pub struct WeakNode {
    inner: Weak<NodeInner>,
}

impl WeakNode {
    #[must_use]
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.inner.name)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("node")
    }
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                name: name.to_string(),
                visible: Cell::new(true),
                parents: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                children_changed: TinyEmitter::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Rc::downgrade(&self.inner),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.set(visible);
    }

    /// Live parents, in the order they adopted this node.
    #[must_use]
    pub fn parents(&self) -> Vec<Node> {
        self.inner
            .parents
            .borrow()
            .iter()
            .filter_map(|weak| weak.upgrade().map(|inner| Node { inner }))
            .collect()
    }

    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    #[must_use]
    pub fn index_of_child(&self, child: &Node) -> Option<usize> {
        self.inner.children.borrow().iter().position(|c| c == child)
    }

    #[must_use]
    pub fn has_child(&self, child: &Node) -> bool {
        self.index_of_child(child).is_some()
    }

    /// Index within the first parent.
    #[must_use]
    pub fn index_in_parent(&self) -> Option<usize> {
        self.parents()
            .first()
            .and_then(|parent| parent.index_of_child(self))
    }

    pub fn children_changed(&self) -> &TinyEmitter<()> {
        &self.inner.children_changed
    }

    pub fn add_child(&self, child: &Node) -> Result<()> {
        let index = self.child_count();
        self.insert_child(index, child)
    }

    pub fn insert_child(&self, index: usize, child: &Node) -> Result<()> {
        if child == self {
            return Err(PhetioError::validation(format!("{self:?} cannot be its own child")));
        }
        if self.has_child(child) {
            return Err(PhetioError::validation(format!(
                "{child:?} is already a child of {self:?}"
            )));
        }
        {
            let mut children = self.inner.children.borrow_mut();
            if index > children.len() {
                return Err(PhetioError::validation(format!(
                    "insert index {index} out of range for {} children",
                    children.len()
                )));
            }
            children.insert(index, child.clone());
        }
        child.add_parent(self);
        self.inner.children_changed.emit(&());
        Ok(())
    }

    pub fn remove_child(&self, child: &Node) -> Result<()> {
        let index = self.index_of_child(child).ok_or_else(|| {
            PhetioError::validation(format!("{child:?} is not a child of {self:?}"))
        })?;
        self.inner.children.borrow_mut().remove(index);
        child.remove_parent(self);
        self.inner.children_changed.emit(&());
        Ok(())
    }

    /// Replaces the whole child list, updating parent links for nodes that
    /// join or leave.
    pub fn set_children(&self, children: Vec<Node>) -> Result<()> {
        for (i, child) in children.iter().enumerate() {
            if child == self || children[..i].contains(child) {
                return Err(PhetioError::validation(format!(
                    "{child:?} appears twice or is the parent itself"
                )));
            }
        }
        let old = std::mem::replace(&mut *self.inner.children.borrow_mut(), children.clone());
        for removed in old.iter().filter(|c| !children.contains(c)) {
            removed.remove_parent(self);
        }
        for added in children.iter().filter(|c| !old.contains(c)) {
            added.add_parent(self);
        }
        self.inner.children_changed.emit(&());
        Ok(())
    }

    /// Removes `child` and reinserts it at `index`, shifting the nodes in
    /// between.
    pub fn move_child_to_index(&self, child: &Node, index: usize) -> Result<()> {
        let current = self.index_of_child(child).ok_or_else(|| {
            PhetioError::validation(format!("{child:?} is not a child of {self:?}"))
        })?;
        {
            let mut children = self.inner.children.borrow_mut();
            if index >= children.len() {
                return Err(PhetioError::validation(format!(
                    "index {index} out of range for {} children",
                    children.len()
                )));
            }
            if current == index {
                return Ok(());
            }
            let moved = children.remove(current);
            children.insert(index, moved);
        }
        self.inner.children_changed.emit(&());
        Ok(())
    }

    fn add_parent(&self, parent: &Node) {
        self.inner
            .parents
            .borrow_mut()
            .push(Rc::downgrade(&parent.inner));
    }

    fn remove_parent(&self, parent: &Node) {
        self.inner
            .parents
            .borrow_mut()
            .retain(|weak| !std::ptr::eq(weak.as_ptr(), Rc::as_ptr(&parent.inner)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(parent: &Node) -> Vec<String> {
        parent.children().iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_parent_links_follow_children() {
        let parent = Node::new("parent");
        let a = Node::new("a");
        let b = Node::new("b");
        parent.add_child(&a).unwrap();
        parent.add_child(&b).unwrap();
        assert_eq!(a.parents(), vec![parent.clone()]);
        assert_eq!(b.index_in_parent(), Some(1));

        parent.set_children(vec![b.clone()]).unwrap();
        assert!(a.parents().is_empty());
        assert_eq!(names(&parent), ["b"]);
        assert!(parent.add_child(&b).is_err());
    }

    #[test]
    fn test_move_child_shifts_between() {
        let parent = Node::new("parent");
        let kids: Vec<Node> = ["a", "b", "c", "d"].iter().map(|n| Node::new(n)).collect();
        parent.set_children(kids.clone()).unwrap();
        parent.move_child_to_index(&kids[0], 2).unwrap();
        assert_eq!(names(&parent), ["b", "c", "a", "d"]);
        assert!(parent.move_child_to_index(&kids[0], 4).is_err());
    }

    #[test]
    fn test_children_changed_fires_after_mutation() {
        let parent = Node::new("parent");
        let child = Node::new("child");
        let seen = Rc::new(Cell::new(0usize));
        let (observer, count) = (parent.downgrade(), seen.clone());
        parent.children_changed().add_listener(move |_: &()| {
            if let Some(p) = observer.upgrade() {
                count.set(p.child_count());
            }
        });
        parent.add_child(&child).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_set_children_rejects_duplicates() {
        let parent = Node::new("parent");
        let a = Node::new("a");
        assert!(parent.set_children(vec![a.clone(), a.clone()]).is_err());
        assert_eq!(parent.child_count(), 0);
    }
}
