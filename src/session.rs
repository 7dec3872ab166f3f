//! The PhET-iO engine for one simulation.
//!
//! A session owns every registry a running simulation needs: IOTypes,
//! instrumented instances, index links and the remote callback outbox.
//! Types are registered during setup (`&mut self`); instances, state and
//! method calls go through `&self` so they can happen while another
//! instance's method is running.

use crate::instances::{InstanceRegistry, TypedInstance};
use anyhow::Context;
use phetio_core::{
    indexed_node_io, phetio_action_io, AnyIOType, Assertions, Builtins, CallbackOutbox, IOType,
    IOTypeRef, IndexLinkRegistry, Metrics, Node, Parameter, PhetioAction, PhetioConfig,
    PhetioError, RemoteCallback, Result, StateObject, TypeApi, TypeRegistry,
};
use phetio_io::StateSnapshot;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

pub struct PhetioSession {
    config: PhetioConfig,
    assertions: Assertions,
    registry: TypeRegistry,
    builtins: Builtins,
    indexed_node: Rc<IOType<Node>>,
    instances: InstanceRegistry,
    links: Rc<IndexLinkRegistry>,
    outbox: Rc<CallbackOutbox>,
    metrics: Metrics,
}

impl PhetioSession {
    pub fn new(config: PhetioConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let mut registry = TypeRegistry::new();
        let builtins = Builtins::register(&mut registry)?;
        let links = Rc::new(IndexLinkRegistry::new());
        let outbox = Rc::new(CallbackOutbox::new());
        let indexed_node = indexed_node_io(&builtins, &links, &outbox, config.indexed_node_options());
        registry.register(&indexed_node)?;

        tracing::info!(
            assertions = ?config.assertions(),
            apply_zero_index = config.state.apply_zero_index,
            types = registry.len(),
            "Started PhET-iO session"
        );
        Ok(Self {
            assertions: config.assertions(),
            config,
            registry,
            builtins,
            indexed_node,
            instances: InstanceRegistry::new(),
            links,
            outbox,
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PhetioConfig {
        &self.config
    }

    #[must_use]
    pub fn assertions(&self) -> Assertions {
        self.assertions
    }

    #[must_use]
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    /// `IndexedNodeIO`, bound to this session's links and outbox.
    #[must_use]
    pub fn indexed_node_type(&self) -> &Rc<IOType<Node>> {
        &self.indexed_node
    }

    #[must_use]
    pub fn index_links(&self) -> &IndexLinkRegistry {
        &self.links
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn register_type<T: 'static>(&mut self, io_type: &Rc<IOType<T>>) -> Result<()> {
        self.registry.register(io_type)?;
        tracing::debug!(type_name = io_type.type_name(), "Registered IOType");
        Ok(())
    }

    /// `PhetioActionIO<...>` for these parameters, registered on first use.
    pub fn action_type(&mut self, parameters: &[Parameter]) -> Result<Rc<IOType<PhetioAction>>> {
        phetio_action_io(&mut self.registry, &self.builtins, parameters)
    }

    /// Creates an action and registers it under `phetio_id`.
    pub fn create_action<F>(
        &mut self,
        phetio_id: &str,
        parameters: Vec<Parameter>,
        action: F,
    ) -> Result<PhetioAction>
    where
        F: Fn(&PhetioAction, &[StateObject]) -> Result<()> + 'static,
    {
        let io_type = self.action_type(&parameters)?;
        let action = PhetioAction::new(phetio_id, parameters, self.assertions, action);
        self.register_instance(phetio_id, &io_type, Rc::new(RefCell::new(action.clone())))?;
        Ok(action)
    }

    /// Instruments `value` under `phetio_id`. The type must be registered
    /// in this session. Reusing a phetioID is an assertion failure; in
    /// production the new instance replaces the old one.
    pub fn register_instance<T: 'static>(
        &self,
        phetio_id: &str,
        io_type: &Rc<IOType<T>>,
        value: Rc<RefCell<T>>,
    ) -> Result<()> {
        let registered = self.registry.get_typed::<T>(io_type.type_name());
        if !registered.is_some_and(|registered| Rc::ptr_eq(&registered, io_type)) {
            return Err(PhetioError::UnknownType(io_type.type_name().to_string()));
        }
        self.assertions.check(!self.instances.contains(phetio_id), || {
            format!("phetioID {phetio_id} is already registered")
        })?;
        self.instances
            .insert(phetio_id, Rc::new(TypedInstance::new(io_type, value)));
        tracing::debug!(phetio_id, type_name = io_type.type_name(), "Registered instance");
        Ok(())
    }

    /// Instruments a node as `IndexedNodeIO`.
    pub fn register_node(&self, phetio_id: &str, node: &Node) -> Result<()> {
        let indexed_node = self.indexed_node.clone();
        self.register_instance(phetio_id, &indexed_node, Rc::new(RefCell::new(node.clone())))
    }

    pub fn unregister_instance(&self, phetio_id: &str) -> Result<()> {
        let removed = self.instances.remove(phetio_id);
        self.assertions.check(removed.is_some(), || {
            format!("phetioID {phetio_id} is not registered")
        })?;
        tracing::debug!(phetio_id, "Unregistered instance");
        Ok(())
    }

    #[must_use]
    pub fn has_instance(&self, phetio_id: &str) -> bool {
        self.instances.contains(phetio_id)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// State of every instance whose type carries state, by phetioID.
    pub fn get_state(&self) -> Result<BTreeMap<String, StateObject>> {
        let start = Instant::now();
        let mut state = BTreeMap::new();
        for (phetio_id, instance) in self.instances.entries() {
            if !instance.io_type().has_state() {
                continue;
            }
            let object = instance
                .to_state(self.assertions)
                .map_err(|err| with_phetio_id(&phetio_id, err))?;
            state.insert(phetio_id, object);
        }
        self.metrics.record_capture(state.len(), start.elapsed());
        Ok(state)
    }

    /// IOType name of every stateful instance, by phetioID.
    #[must_use]
    pub fn state_types(&self) -> BTreeMap<String, String> {
        self.instances
            .entries()
            .into_iter()
            .filter(|(_, instance)| instance.io_type().has_state())
            .map(|(phetio_id, instance)| (phetio_id, instance.io_type().type_name().to_string()))
            .collect()
    }

    /// Applies a whole-session state in phetioID order.
    pub fn set_state(&self, state: &BTreeMap<String, StateObject>) -> Result<()> {
        self.set_state_in_order(state.iter().map(|(id, object)| (id.as_str(), object)))
    }

    /// Applies entries in the given order. Unknown phetioIDs are an
    /// assertion failure; production skips them.
    pub fn set_state_in_order<'a, I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a StateObject)>,
    {
        let mut applied = 0;
        for (phetio_id, object) in entries {
            let Some(instance) = self.instances.get(phetio_id) else {
                self.assertions
                    .check(false, || format!("no instance for phetioID {phetio_id}"))?;
                tracing::warn!(phetio_id, "Skipped state for unknown instance");
                continue;
            };
            instance
                .apply_state(object, self.assertions)
                .map_err(|err| with_phetio_id(phetio_id, err))?;
            applied += 1;
        }
        self.metrics.record_applied(applied);
        tracing::debug!(entries = applied, "Applied state");
        Ok(())
    }

    /// Calls a method on the instance registered under `phetio_id`.
    pub fn invoke(&self, phetio_id: &str, method: &str, args: &[StateObject]) -> Result<StateObject> {
        let instance = self
            .instances
            .get(phetio_id)
            .ok_or_else(|| PhetioError::UnknownInstance(phetio_id.to_string()))?;
        self.metrics.record_invocation(phetio_id, method);
        instance.invoke(method, args, self.assertions)
    }

    /// The generated API of every registered type.
    #[must_use]
    pub fn api(&self) -> BTreeMap<String, TypeApi> {
        self.registry.api()
    }

    /// Type-erased lookup.
    #[must_use]
    pub fn get_type(&self, type_name: &str) -> Option<IOTypeRef> {
        self.registry.get(type_name).cloned()
    }

    /// Queued invocations of remote listeners, oldest first.
    pub fn drain_callbacks(&self) -> Vec<RemoteCallback> {
        self.outbox.drain()
    }

    pub fn save_state<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<StateSnapshot> {
        let state = self.get_state().context("Failed to capture state")?;
        let snapshot = StateSnapshot::new(state, self.state_types())?
            .with_config_fingerprint(self.config.fingerprint());
        snapshot
            .save(&path)
            .with_context(|| format!("Failed to save state to {:?}", path.as_ref()))?;
        Ok(snapshot)
    }

    /// Loads a snapshot and applies it. Returns the number of entries.
    pub fn load_state<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<usize> {
        let snapshot = StateSnapshot::load(&path)
            .with_context(|| format!("Failed to load state from {:?}", path.as_ref()))?;
        if let Some(recorded) = &snapshot.config_fingerprint {
            if *recorded != self.config.fingerprint() {
                tracing::warn!(
                    recorded = %recorded,
                    current = %self.config.fingerprint(),
                    "Snapshot was saved under different state settings"
                );
            }
        }
        for (phetio_id, type_name) in &snapshot.types {
            if let Some(instance) = self.instances.get(phetio_id) {
                anyhow::ensure!(
                    instance.io_type().is_subtype_of(type_name),
                    "{} is a {}, snapshot recorded {}",
                    phetio_id,
                    instance.io_type().type_name(),
                    type_name
                );
            }
        }
        self.set_state(&snapshot.state).context("Failed to apply state")?;
        Ok(snapshot.len())
    }
}

fn with_phetio_id(phetio_id: &str, err: PhetioError) -> PhetioError {
    match err {
        PhetioError::Assertion(msg) => PhetioError::Assertion(format!("{phetio_id}: {msg}")),
        PhetioError::Validation(msg) => PhetioError::Validation(format!("{phetio_id}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> PhetioSession {
        PhetioSession::new(PhetioConfig::default()).unwrap()
    }

    #[test]
    fn test_unregistered_type_is_rejected() {
        let session = session();
        let stray = IOType::<f64>::builder("StrayIO").build();
        let err = session
            .register_instance("sim.stray", &stray, Rc::new(RefCell::new(0.0)))
            .unwrap_err();
        assert!(matches!(err, PhetioError::UnknownType(_)));
    }

    #[test]
    fn test_duplicate_phetio_id() {
        let session = session();
        let number = session.builtins().number.clone();
        session
            .register_instance("sim.value", &number, Rc::new(RefCell::new(1.0)))
            .unwrap();
        assert!(session
            .register_instance("sim.value", &number, Rc::new(RefCell::new(2.0)))
            .unwrap_err()
            .is_assertion());
    }

    #[test]
    fn test_unknown_phetio_id_in_state() {
        let session = session();
        let state = BTreeMap::from([("sim.missing".to_string(), json!(1))]);
        assert!(session.set_state(&state).unwrap_err().is_assertion());

        let production = PhetioSession::new(PhetioConfig::production()).unwrap();
        production.set_state(&state).unwrap();
        assert_eq!(production.metrics().entries_applied(), 0);
    }

    #[test]
    fn test_invoke_unknown_instance() {
        let session = session();
        let err = session.invoke("sim.nothing", "moveForward", &[]).unwrap_err();
        assert!(matches!(err, PhetioError::UnknownInstance(_)));
    }

    #[test]
    fn test_stateless_types_are_not_captured() {
        let mut session = session();
        session
            .create_action("sim.reset", Vec::new(), |_: &PhetioAction, _: &[StateObject]| Ok(()))
            .unwrap();
        let number = session.builtins().number.clone();
        session
            .register_instance("sim.value", &number, Rc::new(RefCell::new(4.0)))
            .unwrap();
        let state = session.get_state().unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state["sim.value"], json!(4.0));
        assert_eq!(session.state_types()["sim.value"], "NumberIO");
    }
}
