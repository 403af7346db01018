// Integer bounding box of a reflection in (pixel x, pixel y, frame z) space

use serde::{Deserialize, Serialize};

use crate::Result;

/// Half-open integer box `[x0, x1) x [y0, y1) x [z0, z1)`.
///
/// Always non-empty along every axis: construction rejects `x1 <= x0`, `y1 <= y0`
/// and `z1 <= z0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
    pub z0: i32,
    pub z1: i32,
}

impl BoundingBox {
    /// Create a new bounding box, checking the axis ordering.
    pub fn new(x0: i32, x1: i32, y0: i32, y1: i32, z0: i32, z1: i32) -> Result<Self> {
        ensure!(x1 > x0, "bounding box requires x1 > x0, got [{}, {})", x0, x1);
        ensure!(y1 > y0, "bounding box requires y1 > y0, got [{}, {})", y0, y1);
        ensure!(z1 > z0, "bounding box requires z1 > z0, got [{}, {})", z0, z1);
        Ok(Self { x0, x1, y0, y1, z0, z1 })
    }

    /// Create from `(x0, x1, y0, y1, z0, z1)` order.
    pub fn from_array(b: [i32; 6]) -> Result<Self> {
        Self::new(b[0], b[1], b[2], b[3], b[4], b[5])
    }

    pub fn as_array(&self) -> [i32; 6] {
        [self.x0, self.x1, self.y0, self.y1, self.z0, self.z1]
    }

    /// Array shape of a grid covering the box, `(nz, ny, nx)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            (self.z1 - self.z0) as usize,
            (self.y1 - self.y0) as usize,
            (self.x1 - self.x0) as usize,
        )
    }

    pub fn volume(&self) -> usize {
        let (nz, ny, nx) = self.shape();
        nz * ny * nx
    }

    /// Check whether a (fractional) point lies inside the box.
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        x >= self.x0 as f64
            && x < self.x1 as f64
            && y >= self.y0 as f64
            && y < self.y1 as f64
            && z >= self.z0 as f64
            && z < self.z1 as f64
    }
}
