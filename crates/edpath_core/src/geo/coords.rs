use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A point in 3D space, in light years.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coords {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Builds coordinates from a component slice, which must hold exactly three
    /// finite values.
    pub fn from_components(components: &[f64]) -> Result<Self> {
        let [x, y, z] = components else {
            return Err(Error::invalid_input(format!(
                "coordinates need 3 components, got {}",
                components.len()
            )));
        };
        let coords = Self::new(*x, *y, *z);
        if !coords.is_valid() {
            return Err(Error::invalid_input(format!(
                "coordinates must be finite: {coords}"
            )));
        }
        Ok(coords)
    }

    /// Euclidean distance. Each squared term is the same regardless of operand
    /// order, so `a.dist(&b) == b.dist(&a)` holds bit for bit.
    #[inline]
    pub fn dist(&self, rhs: &Self) -> f64 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        let dz = self.z - rhs.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bx = ryu::Buffer::new();
        let mut by = ryu::Buffer::new();
        let mut bz = ryu::Buffer::new();
        write!(
            f,
            "{},{},{}",
            bx.format(self.x),
            by.format(self.y),
            bz.format(self.z)
        )
    }
}
