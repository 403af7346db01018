// Definitions that are used throughout all modules

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Selects which contributions a profile model includes.
///
/// One parametrized model covers every variant of the mosaicity model: each flag switches
/// a single term on or off instead of having a separate model type per combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTerms {
    /// Finite mosaic block size (covariance term `sig_s`).
    pub mosaic_block: bool,
    /// Spread of unit cell dimensions (covariance term `sig_a`).
    pub cell_spread: bool,
    /// Angular spread of mosaic blocks (covariance term `sig_w`, rocking width `w`).
    pub angular_spread: bool,
    /// Resolution dependent thickness of the rocking curve shell (`da / d`).
    pub resolution_thickness: bool,
}

impl Default for ModelTerms {
    fn default() -> Self {
        Self::all()
    }
}

impl ModelTerms {
    pub fn all() -> Self {
        Self {
            mosaic_block: true,
            cell_spread: true,
            angular_spread: true,
            resolution_thickness: true,
        }
    }

    /// Only the mosaic block term; the simplest model that is still positive-definite.
    pub fn block_only() -> Self {
        Self {
            mosaic_block: true,
            cell_spread: false,
            angular_spread: false,
            resolution_thickness: false,
        }
    }

    pub fn with_mosaic_block(mut self, on: bool) -> Self {
        self.mosaic_block = on;
        self
    }

    pub fn with_cell_spread(mut self, on: bool) -> Self {
        self.cell_spread = on;
        self
    }

    pub fn with_angular_spread(mut self, on: bool) -> Self {
        self.angular_spread = on;
        self
    }

    pub fn with_resolution_thickness(mut self, on: bool) -> Self {
        self.resolution_thickness = on;
        self
    }
}

/// How the predicted reciprocal lattice point of a reflection is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RlpSource {
    /// Miller index; the point is `A * h`.
    Miller(Vector3<i32>),
    /// Diffracted beam vector at rotation angle `phi0`; the point is `s1 - s0`
    /// rotated back to the datum orientation.
    Diffracted { s1: Vector3<f64>, phi0: f64 },
}

/// Per-axis standard deviations of the three mosaicity contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MosaicitySpread {
    /// Mosaic block size.
    pub sig_s: Vector3<f64>,
    /// Unit cell spread (scaled by the Miller index).
    pub sig_a: Vector3<f64>,
    /// Angular spread of mosaic blocks, in radians.
    pub sig_w: Vector3<f64>,
}

impl MosaicitySpread {
    pub fn new(sig_s: Vector3<f64>, sig_a: Vector3<f64>, sig_w: Vector3<f64>) -> Self {
        Self { sig_s, sig_a, sig_w }
    }

    /// Same spread along all three axes for every term.
    pub fn isotropic(sig_s: f64, sig_a: f64, sig_w: f64) -> Self {
        Self::new(
            Vector3::repeat(sig_s),
            Vector3::repeat(sig_a),
            Vector3::repeat(sig_w),
        )
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sig_s.iter().all(|v| *v >= 0.0), "sig_s components must be non-negative");
        ensure!(self.sig_a.iter().all(|v| *v >= 0.0), "sig_a components must be non-negative");
        ensure!(self.sig_w.iter().all(|v| *v >= 0.0), "sig_w components must be non-negative");
        Ok(())
    }
}

/// Scalar parameters of the rocking curve model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockingCurveParams {
    /// Mosaic block size parameter; its inverse is the shell thickness.
    pub s: f64,
    /// Relative spread of unit cell sizes.
    pub da: f64,
    /// Angular spread of mosaic blocks, in radians.
    pub w: f64,
}

impl RockingCurveParams {
    pub fn new(s: f64, da: f64, w: f64) -> Self {
        Self { s, da, w }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.s > 0.0, "mosaic block size s must be positive, got {}", self.s);
        ensure!(self.da >= 0.0, "unit cell spread da must be non-negative, got {}", self.da);
        ensure!(
            self.w >= 0.0 && self.w <= std::f64::consts::PI,
            "angular spread w must lie in [0, pi], got {}",
            self.w
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_terms_builders() {
        let terms = ModelTerms::block_only()
            .with_cell_spread(true)
            .with_angular_spread(true);
        assert!(terms.mosaic_block && terms.cell_spread && terms.angular_spread);
        assert!(!terms.resolution_thickness);
        assert_eq!(ModelTerms::default(), ModelTerms::all());
    }

    #[test]
    fn test_spread_validation() {
        assert!(MosaicitySpread::isotropic(0.1, 0.0, 0.0).validate().is_ok());
        let mut spread = MosaicitySpread::isotropic(0.1, 0.01, 0.001);
        spread.sig_a.y = -1e-6;
        assert!(spread.validate().unwrap_err().is_precondition());
    }

    #[test]
    fn test_rocking_params_validation() {
        assert!(RockingCurveParams::new(100.0, 0.0, 0.0).validate().is_ok());
        assert!(RockingCurveParams::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(RockingCurveParams::new(100.0, -1.0, 0.0).validate().is_err());
        assert!(RockingCurveParams::new(100.0, 0.0, -0.1).validate().is_err());
    }

    #[test]
    fn test_rlp_source_json() {
        let source: RlpSource = serde_json::from_str(r#"{"Miller": [1, -2, 3]}"#).unwrap();
        assert_eq!(source, RlpSource::Miller(Vector3::new(1, -2, 3)));
    }
}
