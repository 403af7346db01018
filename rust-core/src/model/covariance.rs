use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::{axis_and_angle_as_matrix, perpendicular_basis};
use crate::interfaces::{ModelTerms, MosaicitySpread, RlpSource};
use crate::{ProfileError, Result};

fn precondition(message: &str) -> ProfileError {
    ProfileError::PreconditionViolated(message.to_string())
}

/// Fixed geometry a covariance model is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileGeometry {
    /// Panel matrix mapping `(x_mm, y_mm, 1)` to a lab vector.
    pub d_matrix: Matrix3<f64>,
    /// Crystal setting matrix mapping Miller indices to reciprocal space.
    pub a_matrix: Matrix3<f64>,
    pub s0: Vector3<f64>,
    pub m2: Vector3<f64>,
}

/// The three covariance contributions of a reflection, each zero when its term is off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceTerms {
    pub block: Matrix3<f64>,
    pub cell: Matrix3<f64>,
    pub angular: Matrix3<f64>,
}

impl CovarianceTerms {
    /// Build the contributions around the reciprocal lattice point `rlp = A * h`.
    ///
    /// * block: `A diag(sig_s^2) A^T`
    /// * cell: `A diag(h_i^2 sig_a_i^2) A^T`
    /// * angular: variance `|A diag(sig_w) rlp|^2` in the two directions perpendicular to
    ///   `rlp`, none along it
    pub fn new(
        a_matrix: &Matrix3<f64>,
        h: &Vector3<f64>,
        rlp: &Vector3<f64>,
        spread: &MosaicitySpread,
        terms: ModelTerms,
    ) -> Self {
        let a_t = a_matrix.transpose();
        let mut result = Self {
            block: Matrix3::zeros(),
            cell: Matrix3::zeros(),
            angular: Matrix3::zeros(),
        };

        if terms.mosaic_block {
            let variance = spread.sig_s.component_mul(&spread.sig_s);
            result.block = a_matrix * Matrix3::from_diagonal(&variance) * a_t;
        }

        if terms.cell_spread {
            let scaled = h.component_mul(&spread.sig_a);
            let variance = scaled.component_mul(&scaled);
            result.cell = a_matrix * Matrix3::from_diagonal(&variance) * a_t;
        }

        if terms.angular_spread {
            let rn = rlp.normalize();
            let (v2, v3) = perpendicular_basis(&rn);
            let w = (a_matrix * Matrix3::from_diagonal(&spread.sig_w) * rlp).norm();
            let q = Matrix3::from_columns(&[v2, v3, rn]);
            let variance = Vector3::new(w * w, w * w, 0.0);
            result.angular = q * Matrix3::from_diagonal(&variance) * q.transpose();
        }

        result
    }

    pub fn total(&self) -> Matrix3<f64> {
        self.block + self.cell + self.angular
    }
}

/// Gaussian profile of one reflection in reciprocal space.
///
/// The profile is centred on the predicted reciprocal lattice point with covariance
/// `Sigma`, the sum of the active [`CovarianceTerms`]. Detector pixels and rotation
/// angles are mapped back to the datum crystal orientation before being compared with
/// the centre, so one model covers every frame of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceProfileModel {
    geometry: ProfileGeometry,
    d_inverse: Matrix3<f64>,
    a_inverse: Matrix3<f64>,
    m2: Vector3<f64>,
    s0_length: f64,
    terms: ModelTerms,
    rlp: Vector3<f64>,
    h: Vector3<f64>,
    contributions: CovarianceTerms,
    sigma: Matrix3<f64>,
    sigma_inverse: Matrix3<f64>,
}

impl CovarianceProfileModel {
    /// Construct the profile model of one reflection.
    ///
    /// # Errors
    /// Precondition violation when `D` or `A` is singular, `s0`, `m2` or a direct `s1` has
    /// zero length, the reciprocal lattice point is the origin, a spread component is
    /// negative or the summed covariance is not positive-definite.
    pub fn new(
        geometry: ProfileGeometry,
        source: RlpSource,
        spread: MosaicitySpread,
        terms: ModelTerms,
    ) -> Result<Self> {
        let s0_length = geometry.s0.norm();
        ensure!(s0_length > 0.0, "incident beam vector must have non-zero length");
        ensure!(geometry.m2.norm() > 0.0, "rotation axis must have non-zero length");
        spread.validate()?;

        let d_inverse = geometry
            .d_matrix
            .try_inverse()
            .ok_or_else(|| precondition("panel matrix D must be invertible"))?;
        let a_inverse = geometry
            .a_matrix
            .try_inverse()
            .ok_or_else(|| precondition("setting matrix A must be invertible"))?;
        let m2 = geometry.m2.normalize();

        let rlp = match source {
            RlpSource::Miller(h) => geometry.a_matrix * h.cast::<f64>(),
            RlpSource::Diffracted { s1, phi0 } => {
                ensure!(s1.norm() > 0.0, "diffracted beam vector must have non-zero length");
                let s1 = s1.normalize() * s0_length;
                axis_and_angle_as_matrix(&m2, phi0).transpose() * (s1 - geometry.s0)
            }
        };
        ensure!(rlp.norm() > 0.0, "reciprocal lattice point must not be the origin");
        let h = a_inverse * rlp;

        let contributions = CovarianceTerms::new(&geometry.a_matrix, &h, &rlp, &spread, terms);
        let total = contributions.total();
        let sigma = (total + total.transpose()) * 0.5;
        let sigma_inverse = sigma
            .cholesky()
            .map(|c| c.inverse())
            .ok_or_else(|| {
                ProfileError::PreconditionViolated(format!(
                    "profile covariance must be positive-definite with terms {:?}",
                    terms
                ))
            })?;

        Ok(Self {
            geometry,
            d_inverse,
            a_inverse,
            m2,
            s0_length,
            terms,
            rlp,
            h,
            contributions,
            sigma,
            sigma_inverse,
        })
    }

    pub fn geometry(&self) -> &ProfileGeometry {
        &self.geometry
    }

    pub fn d_matrix(&self) -> &Matrix3<f64> {
        &self.geometry.d_matrix
    }

    pub fn d_inverse(&self) -> &Matrix3<f64> {
        &self.d_inverse
    }

    pub fn a_matrix(&self) -> &Matrix3<f64> {
        &self.geometry.a_matrix
    }

    pub fn a_inverse(&self) -> &Matrix3<f64> {
        &self.a_inverse
    }

    pub fn s0(&self) -> Vector3<f64> {
        self.geometry.s0
    }

    /// Unit rotation axis.
    pub fn m2(&self) -> Vector3<f64> {
        self.m2
    }

    pub fn terms(&self) -> ModelTerms {
        self.terms
    }

    /// Centre of the profile in reciprocal space, at the datum orientation.
    pub fn rlp(&self) -> Vector3<f64> {
        self.rlp
    }

    /// Fractional Miller index of the profile centre.
    pub fn h(&self) -> Vector3<f64> {
        self.h
    }

    pub fn contributions(&self) -> &CovarianceTerms {
        &self.contributions
    }

    pub fn sigma(&self) -> &Matrix3<f64> {
        &self.sigma
    }

    pub fn sigma_inverse(&self) -> &Matrix3<f64> {
        &self.sigma_inverse
    }

    /// Rotation by `phi` about the goniometer axis.
    pub fn rotation(&self, phi: f64) -> Matrix3<f64> {
        axis_and_angle_as_matrix(&self.m2, phi)
    }

    /// Reciprocal space point seen at detector position `(x, y)` mm and angle `phi`,
    /// rotated back to the datum orientation.
    pub fn r(&self, x: f64, y: f64, phi: f64) -> Result<Vector3<f64>> {
        let v = self.geometry.d_matrix * Vector3::new(x, y, 1.0);
        let length = v.norm();
        ensure!(
            length > 0.0,
            "detector position ({}, {}) maps to a zero-length ray",
            x,
            y
        );
        let s1 = v * (self.s0_length / length);
        Ok(self.rotation(phi).transpose() * (s1 - self.geometry.s0))
    }

    /// Fractional Miller index seen at `(x, y, phi)`.
    pub fn h_frac(&self, x: f64, y: f64, phi: f64) -> Result<Vector3<f64>> {
        Ok(self.a_inverse * self.r(x, y, phi)?)
    }

    /// Squared Mahalanobis distance of `(x, y, phi)` from the profile centre.
    pub fn dm(&self, x: f64, y: f64, phi: f64) -> Result<f64> {
        let dr = self.r(x, y, phi)? - self.rlp;
        Ok(dr.dot(&(self.sigma_inverse * dr)).max(0.0))
    }

    /// Unnormalized profile density `exp(-Dm / 2)` at `(x, y, phi)`.
    pub fn p(&self, x: f64, y: f64, phi: f64) -> Result<f64> {
        Ok((-0.5 * self.dm(x, y, phi)?).exp())
    }
}
