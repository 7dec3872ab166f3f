//! # PhET-iO
//!
//! State capture, state application and remote method invocation for
//! instrumented simulation objects.
//!
//! [`PhetioSession`] ties the workspace together: it owns the IOType
//! registry from `phetio_core`, the instrumented instances addressed by
//! phetioID and the snapshot persistence from `phetio_io`.

pub mod instances;
pub mod session;

pub use instances::{InstanceRegistry, PhetioObject, TypedInstance};
pub use session::PhetioSession;

pub use phetio_core as core;
pub use phetio_data as data;
pub use phetio_io as io;
