use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Anything that can report the incident beam vector.
pub trait Beam {
    /// Incident beam vector; its length is the inverse wavelength.
    fn s0(&self) -> Vector3<f64>;
}

/// A monochromatic beam travelling along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonochromaticBeam {
    /// Direction of propagation (normalized on construction).
    pub direction: Vector3<f64>,
    /// Wavelength in Ångström.
    pub wavelength: f64,
}

impl MonochromaticBeam {
    pub fn new(direction: Vector3<f64>, wavelength: f64) -> Result<Self> {
        ensure!(direction.norm() > 0.0, "beam direction must have non-zero length");
        ensure!(wavelength > 0.0, "wavelength must be positive, got {}", wavelength);
        Ok(Self {
            direction: direction.normalize(),
            wavelength,
        })
    }

    /// Beam with the given incident vector `s0`; the wavelength is `1 / |s0|`.
    pub fn from_s0(s0: Vector3<f64>) -> Result<Self> {
        let length = s0.norm();
        ensure!(length > 0.0, "incident beam vector must have non-zero length");
        Self::new(s0, 1.0 / length)
    }
}

impl Beam for MonochromaticBeam {
    fn s0(&self) -> Vector3<f64> {
        self.direction.normalize() / self.wavelength
    }
}
