//! Axis-aligned 3D bounding box.

use super::vector3::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its minimum and maximum corners.
///
/// Any component may be infinite; [`Bounds3::NOTHING`] is the inverted
/// infinite box used as the identity for [`Bounds3::union`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds3 {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Bounds3 {
    pub const NOTHING: Bounds3 = Bounds3 {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        min_z: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
        max_z: f64::NEG_INFINITY,
    };

    pub const EVERYTHING: Bounds3 = Bounds3 {
        min_x: f64::NEG_INFINITY,
        min_y: f64::NEG_INFINITY,
        min_z: f64::NEG_INFINITY,
        max_x: f64::INFINITY,
        max_y: f64::INFINITY,
        max_z: f64::INFINITY,
    };

    #[must_use]
    pub const fn new(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// Box spanning `[0, width] x [0, height] x [0, depth]`.
    #[must_use]
    pub const fn from_size(width: f64, height: f64, depth: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, width, height, depth)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() < 0.0 || self.height() < 0.0 || self.depth() < 0.0
    }

    #[must_use]
    pub fn center(&self) -> Vector3 {
        Vector3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    #[must_use]
    pub fn contains_point(&self, point: &Vector3) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
            && self.min_z <= point.z
            && point.z <= self.max_z
    }

    #[must_use]
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.min_z.min(other.min_z),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
            self.max_z.max(other.max_z),
        )
    }

    #[must_use]
    pub fn intersection(&self, other: &Bounds3) -> Bounds3 {
        Bounds3::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.min_z.max(other.min_z),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
            self.max_z.min(other.max_z),
        )
    }

    /// Expanded on every side by `amount`.
    #[must_use]
    pub fn dilated(&self, amount: f64) -> Bounds3 {
        Bounds3::new(
            self.min_x - amount,
            self.min_y - amount,
            self.min_z - amount,
            self.max_x + amount,
            self.max_y + amount,
            self.max_z + amount,
        )
    }
}
