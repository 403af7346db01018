use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::Result;

/// The cap of a sphere subtended by a cone of half-angle `angle` around `axis`.
///
/// The sphere is centred on the origin and its radius is the length of the axis, so the
/// axis tip is the pole of the cap. Used to test whether a reciprocal lattice vector
/// lies within the shell a reflection sweeps out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalCap {
    axis: Vector3<f64>,
    angle: f64,
    a: f64,
    radius: f64,
    h1: f64,
    h2: f64,
}

impl SphericalCap {
    /// Construct a cap from its axis and cone half-angle.
    ///
    /// # Arguments
    /// * `axis` - Axis of the cone; its length is the sphere radius
    /// * `angle` - Cone half-angle in radians, in `[0, pi]`
    ///
    /// # Errors
    /// Precondition violation if the axis has zero length or the angle is out of range.
    pub fn new(axis: Vector3<f64>, angle: f64) -> Result<Self> {
        let a = axis.norm();
        ensure!(a > 0.0, "spherical cap axis must have non-zero length");
        ensure!(
            (0.0..=PI).contains(&angle),
            "spherical cap angle must lie in [0, pi], got {}",
            angle
        );
        let h1 = a * angle.cos();
        Ok(Self {
            axis,
            angle,
            a,
            radius: a * angle.sin(),
            h1,
            h2: a - h1,
        })
    }

    pub fn axis(&self) -> Vector3<f64> {
        self.axis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Radius of the sphere, `|axis|`.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Radius of the circle bounding the cap's base.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance from the sphere centre to the base plane, along the axis.
    pub fn h1(&self) -> f64 {
        self.h1
    }

    /// Height of the cap above its base plane.
    pub fn h2(&self) -> f64 {
        self.h2
    }

    /// Angle between `point` and the axis; zero for the origin.
    pub fn inclination(&self, point: Vector3<f64>) -> f64 {
        let length = point.norm();
        if length == 0.0 {
            return 0.0;
        }
        let cos_theta = (point.dot(&self.axis) / (length * self.a)).clamp(-1.0, 1.0);
        cos_theta.acos()
    }

    /// Distance from `point` to the nearest point on the curved cap surface.
    ///
    /// Points inside the cone are measured radially to the sphere; points outside it are
    /// measured to the rim circle, in the plane containing the axis and the point.
    pub fn distance(&self, point: Vector3<f64>) -> f64 {
        let length = point.norm();
        let theta = self.inclination(point);
        if theta <= self.angle {
            return (length - self.a).abs();
        }
        let d2 = length * length + self.a * self.a
            - 2.0 * length * self.a * (theta - self.angle).cos();
        d2.max(0.0).sqrt()
    }
}
