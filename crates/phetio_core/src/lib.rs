//! # PhET-iO Core
//!
//! Runtime type descriptors and state (de)serialization for instrumented
//! simulation objects.
//!
//! This crate contains:
//! - The IOType engine: schema-driven state walks, custom hooks, supertype
//!   flattening and remotely invocable methods
//! - Builtin leaf, parametric and value types
//! - `PhetioAction`, with reentrancy-safe disposal
//! - `IndexedNodeIO`, which restores sibling order through swaps
//! - Configuration, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use phetio_core::{Assertions, Builtins, TypeRegistry};
//! use phetio_data::Color;
//!
//! let mut registry = TypeRegistry::new();
//! let builtins = Builtins::register(&mut registry).unwrap();
//!
//! let color = Color::new(255.0, 128.0, 0.0, 0.5);
//! let state = builtins.color.to_state_object(&color, Assertions::Enabled).unwrap();
//! assert_eq!(state["g"], 128);
//! ```

/// Instrumented callables with validated parameters
pub mod action;
/// Development vs production handling of failed checks
pub mod assertions;
/// Queue of invocations for listeners owned by the remote side
pub mod callbacks;
/// Configuration loaded from `phetio.toml`
pub mod config;
/// Listener notification and parameter validation
pub mod emitter;
pub mod error;
/// Sibling order as state, plus index links
pub mod indexed_node;
/// IOType descriptors and the default state walk
pub mod io_type;
/// Session counters and logging setup
pub mod metrics;
/// Session-scoped type namespace
pub mod registry;
/// Minimal scene graph used by `IndexedNodeIO`
pub mod scene;
/// Builtin IOTypes
pub mod types;

pub use action::{phetio_action_io, DisposalState, PhetioAction};
pub use assertions::Assertions;
pub use callbacks::{CallbackId, CallbackOutbox, RemoteCallback};
pub use config::PhetioConfig;
pub use emitter::{Emitter, ListenerId, Parameter, TinyEmitter};
pub use error::{PhetioError, Result};
pub use indexed_node::{indexed_node_io, IndexLinkRegistry, IndexedNodeOptions};
pub use io_type::{AnyIOType, Field, IOType, IOTypeRef, Method, StateObject, TypeApi};
pub use metrics::{init_logging, Metrics};
pub use registry::TypeRegistry;
pub use scene::Node;
pub use types::Builtins;
