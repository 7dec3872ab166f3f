//! # PhET-iO Data
//!
//! Value objects that the PhET-iO state layer serializes: 3D math
//! primitives, RGBA colors and native input-event snapshots. Each type is a
//! plain `Copy`/`Clone` value with serde derives matching its wire shape.

pub mod data;

pub use data::bounds3::Bounds3;
pub use data::color::{Color, ColorError};
pub use data::dimension3::Dimension3;
pub use data::event::NativeEvent;
pub use data::vector3::Vector3;
