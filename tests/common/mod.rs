pub mod macros;

use phetio_lib::core::{Node, PhetioConfig};
use phetio_lib::PhetioSession;

#[allow(dead_code)]
pub struct SessionBuilder {
    config: PhetioConfig,
}

#[allow(dead_code)]
impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: PhetioConfig::default(),
        }
    }

    pub fn production(mut self) -> Self {
        self.config.assertions.enabled = false;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut PhetioConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn build(self) -> PhetioSession {
        PhetioSession::new(self.config).expect("Failed to start session")
    }
}

/// A parent with one child per name, in order.
#[allow(dead_code)]
pub fn family(names: &[&str]) -> (Node, Vec<Node>) {
    let parent = Node::new("parent");
    let children: Vec<Node> = names.iter().map(|name| Node::new(name)).collect();
    parent
        .set_children(children.clone())
        .expect("Failed to set children");
    (parent, children)
}

/// Registers every child as `IndexedNodeIO` under `sim.<name>`.
#[allow(dead_code)]
pub fn instrument(session: &PhetioSession, children: &[Node]) {
    for child in children {
        session
            .register_node(&format!("sim.{}", child.name()), child)
            .expect("Failed to register node");
    }
}

#[allow(dead_code)]
pub fn child_names(parent: &Node) -> Vec<String> {
    parent
        .children()
        .iter()
        .map(|child| child.name().to_string())
        .collect()
}
