use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::Result;

/// General conic: A x² + B xy + C y² + D x + E y + F = 0, stored as [A, B, C, D, E, F].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConicCoeffs(pub [f64; 6]);

impl ConicCoeffs {
    /// Value of the implicit form at (x, y); zero on the curve.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let [a, b, c, d, e, f] = self.0;
        a * x * x + b * x * y + c * y * y + d * x + e * y + f
    }

    /// Symmetric matrix `Q` with `[x y 1] Q [x y 1]^T` equal to [`Self::evaluate`].
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let [a, b, c, d, e, f] = self.0;
        Matrix3::new(
            a,
            b * 0.5,
            d * 0.5,
            b * 0.5,
            c,
            e * 0.5,
            d * 0.5,
            e * 0.5,
            f,
        )
    }
}

/// Projection of a diffraction-condition circle onto a detector plane.
///
/// All diffracted beams at a fixed scattering angle form a cone around the incident
/// beam. A panel whose pixel-to-ray matrix `D` maps millimetre coordinates `(X, Y, 1)`
/// to lab-frame rays sees that cone as a conic section; this type precomputes the dot
/// products needed to write the conic down in closed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EwaldCirclePlaneProjection {
    s0: Vector3<f64>,
    s0_length: f64,
    // s0 . d_i
    a: [f64; 3],
    // d_i . d_j
    gram: Matrix3<f64>,
}

impl EwaldCirclePlaneProjection {
    pub fn new(s0: Vector3<f64>, d_matrix: Matrix3<f64>) -> Result<Self> {
        let s0_length = s0.norm();
        ensure!(s0_length > 0.0, "incident beam vector must have non-zero length");
        let a = [
            d_matrix.column(0).dot(&s0),
            d_matrix.column(1).dot(&s0),
            d_matrix.column(2).dot(&s0),
        ];
        Ok(Self {
            s0,
            s0_length,
            a,
            gram: d_matrix.transpose() * d_matrix,
        })
    }

    /// Conic traced by diffracted beams whose scattering vector has length `rl`.
    pub fn for_resolution(&self, rl: f64) -> ConicCoeffs {
        // |s1 - s0|^2 = rl^2 with |s1| = |s0| gives s1.s0 = |s0|^2 - rl^2 / 2
        let c = (self.s0_length * self.s0_length - 0.5 * rl * rl) / self.s0_length;
        self.coefficients(c)
    }

    /// Conic traced by diffracted beams at the same scattering angle as `s1`.
    pub fn for_diffracted_beam(&self, s1: Vector3<f64>) -> Result<ConicCoeffs> {
        let s1_length = s1.norm();
        ensure!(s1_length > 0.0, "diffracted beam vector must have non-zero length");
        // |s0| cos(2 theta), the same quantity for_resolution derives from rl
        let c = s1.dot(&self.s0) / s1_length;
        Ok(self.coefficients(c))
    }

    pub fn s0(&self) -> Vector3<f64> {
        self.s0
    }

    // Squaring (v . s0) = c |v| with v = X d0 + Y d1 + d2.
    fn coefficients(&self, c: f64) -> ConicCoeffs {
        let c2 = c * c;
        let [a0, a1, a2] = self.a;
        let g = &self.gram;
        ConicCoeffs([
            a0 * a0 - c2 * g[(0, 0)],
            2.0 * (a0 * a1 - c2 * g[(0, 1)]),
            a1 * a1 - c2 * g[(1, 1)],
            2.0 * (a0 * a2 - c2 * g[(0, 2)]),
            2.0 * (a1 * a2 - c2 * g[(1, 2)]),
            a2 * a2 - c2 * g[(2, 2)],
        ])
    }
}
