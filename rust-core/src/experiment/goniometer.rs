use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Anything that can report the rotation axis of the scan.
pub trait Goniometer {
    fn rotation_axis(&self) -> Vector3<f64>;
}

/// A goniometer with one fixed rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleAxisGoniometer {
    pub axis: Vector3<f64>,
}

impl SingleAxisGoniometer {
    pub fn new(axis: Vector3<f64>) -> Result<Self> {
        ensure!(axis.norm() > 0.0, "rotation axis must have non-zero length");
        Ok(Self {
            axis: axis.normalize(),
        })
    }
}

impl Goniometer for SingleAxisGoniometer {
    fn rotation_axis(&self) -> Vector3<f64> {
        self.axis
    }
}
