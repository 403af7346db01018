// Geometry module: Contains the geometric primitives the profile models are built on
// This module provides rotations, the spherical cap and the Ewald circle projection

// ======================== MODULE DECLARATIONS ========================
pub mod ewald_projection;
pub mod rotation;
pub mod spherical_cap;

// Test modules
mod _tests_ewald_projection;

// ======================== ROTATIONS & FRAMES ========================
pub use rotation::{
    axis_and_angle_as_matrix, // fn(axis: &Vector3<f64>, angle: f64) -> Matrix3<f64> - right-handed rotation about axis
    perpendicular_basis,      // fn(unit: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) - orthonormal completion of a unit vector
};

// ======================== SPHERICAL CAP ========================
pub use spherical_cap::SphericalCap; // struct - cap of a sphere cut by a cone around an axis
// SphericalCap impl methods:
//   new(axis: Vector3<f64>, angle: f64) -> Result<Self>   - validates |axis| > 0 and angle in [0, pi]
//   axis(&self) -> Vector3<f64>                           - axis vector (magnitude = sphere radius)
//   angle(&self) -> f64                                   - cone half-angle
//   a(&self) -> f64                                       - sphere radius |axis|
//   radius(&self) -> f64                                  - radius of the cap's base circle
//   h1(&self) -> f64                                      - height of the base plane above the centre
//   h2(&self) -> f64                                      - height of the cap itself
//   inclination(&self, p: Vector3<f64>) -> f64            - angle between p and the axis
//   distance(&self, p: Vector3<f64>) -> f64               - distance from p to the curved cap surface

// ======================== EWALD CIRCLE PROJECTION ========================
pub use ewald_projection::{
    ConicCoeffs,                // struct - implicit conic A x^2 + B xy + C y^2 + D x + E y + F = 0
    EwaldCirclePlaneProjection, // struct - detector-plane image of a diffraction-condition circle
};
// EwaldCirclePlaneProjection impl methods:
//   new(s0: Vector3<f64>, d_matrix: Matrix3<f64>) -> Result<Self> - precomputes the s0/D dot products
//   for_resolution(&self, rl: f64) -> ConicCoeffs                - conic of all s1 with |s1 - s0| = rl
//   for_diffracted_beam(&self, s1: Vector3<f64>) -> Result<ConicCoeffs> - conic through the cone of s1
