//! Value objects shared by the PhET-iO layers.

pub mod bounds3;
pub mod color;
pub mod dimension3;
pub mod event;
pub mod vector3;
