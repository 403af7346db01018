// Model module: Contains the two per-reflection profile models
// This module provides the rocking curve model and the covariance (Gaussian) profile model

// ======================== MODULE DECLARATIONS ========================
pub mod covariance;
pub mod rocking_curve;

mod _tests_rocking_curve;

// ======================== ROCKING CURVE ========================
pub use rocking_curve::RockingCurveModel; // struct - shell + cap model giving rocking width, phi range and partiality
// RockingCurveModel impl methods:
//   new(s0, s1, m2, phi, params, terms) -> Result<Self>   - validates vectors and parameters
//   thickness(&self) -> f64                               - 1/s (+ da/d when resolution thickness is on)
//   rocking_width(&self) -> f64                           - 2 atan(thickness / 2|r|) (+ w)
//   distance(&self, p) -> f64 / inside(&self, p) -> bool  - shell membership of a reciprocal space point
//   phi0/phi1/z0/z1(&self) -> f64                         - angular and axial extents
//   phi_range(&self) -> Result<(f64, f64)>                - rotation range over which r diffracts
//   intensity_fraction(&self, a, b) -> Result<f64>        - Gaussian rocking curve mass in [a, b]
//   ewald_intersection_angles(&self) -> Result<(f64, f64)> - shell / Ewald sphere meeting angles
//   minimum_box(&self) -> [Vector3<f64>; 8]               - shell bounding box corners in the lab frame

// ======================== COVARIANCE PROFILE ========================
pub use covariance::{
    CovarianceProfileModel, // struct - Gaussian profile with cached inverse covariance
    CovarianceTerms,        // struct - block, cell and angular covariance contributions
    ProfileGeometry,        // struct - D, A, s0 and m2 the model is evaluated in
};
// CovarianceProfileModel impl methods:
//   new(geometry, source: RlpSource, spread, terms) -> Result<Self> - fails if Sigma is not positive-definite
//   r(&self, x, y, phi) -> Result<Vector3<f64>>       - reciprocal point at detector mm (x, y), angle phi
//   h_frac(&self, x, y, phi) -> Result<Vector3<f64>>  - fractional Miller index at (x, y, phi)
//   dm(&self, x, y, phi) -> Result<f64>               - squared Mahalanobis distance, never negative
//   p(&self, x, y, phi) -> Result<f64>                - exp(-Dm / 2)
//   rotation(&self, phi) -> Matrix3<f64>              - rotation about m2
