use super::bounds3::Bounds3;
use serde::{Deserialize, Serialize};

/// Width, height and depth of a 3D extent. Components may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension3 {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimension3 {
    #[must_use]
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Bounds with the origin at the minimum corner.
    #[must_use]
    pub fn to_bounds(&self) -> Bounds3 {
        Bounds3::from_size(self.width, self.height, self.depth)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

impl From<&Bounds3> for Dimension3 {
    fn from(bounds: &Bounds3) -> Self {
        Dimension3::new(bounds.width(), bounds.height(), bounds.depth())
    }
}
