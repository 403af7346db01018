use log::debug;
use nalgebra::Vector3;

use crate::experiment::{Beam, Goniometer, Scan};
use crate::interfaces::{ModelTerms, RockingCurveParams};
use crate::model::RockingCurveModel;
use crate::shoebox::BoundingBox;
use crate::Result;

/// Partiality and frame range estimates from the rocking curve model.
pub struct PartialitySupport<'e, S: Scan + ?Sized> {
    scan: &'e S,
    s0: Vector3<f64>,
    m2: Vector3<f64>,
    params: RockingCurveParams,
    terms: ModelTerms,
}

impl<'e, S: Scan + ?Sized> PartialitySupport<'e, S> {
    pub fn new<B: Beam + ?Sized, G: Goniometer + ?Sized>(
        beam: &B,
        goniometer: &G,
        scan: &'e S,
        params: RockingCurveParams,
        terms: ModelTerms,
    ) -> Result<Self> {
        params.validate()?;
        let s0 = beam.s0();
        let m2 = goniometer.rotation_axis();
        ensure!(s0.norm() > 0.0, "incident beam vector must have non-zero length");
        ensure!(m2.norm() > 0.0, "rotation axis must have non-zero length");
        Ok(Self {
            scan,
            s0,
            m2,
            params,
            terms,
        })
    }

    pub fn params(&self) -> RockingCurveParams {
        self.params
    }

    /// Rocking curve model of the reflection with diffracted beam `s1` at angle `phi`.
    pub fn model(&self, s1: Vector3<f64>, phi: f64) -> Result<RockingCurveModel> {
        RockingCurveModel::new(self.s0, s1, self.m2, phi, self.params, self.terms)
    }

    /// Fraction of the reflection's intensity recorded in the frames `[z0, z1)` of `bbox`.
    pub fn compute_partiality(&self, s1: Vector3<f64>, phi: f64, bbox: &BoundingBox) -> Result<f64> {
        ensure!(
            bbox.z1 > bbox.z0,
            "bounding box requires z1 > z0, got [{}, {})",
            bbox.z0,
            bbox.z1
        );
        let model = self.model(s1, phi)?;
        let phia = self.scan.angle_from_array_index(bbox.z0 as f64);
        let phib = self.scan.angle_from_array_index(bbox.z1 as f64);
        let fraction = model.intensity_fraction(phia, phib)?;
        debug!("partiality {:.6} over frames [{}, {})", fraction, bbox.z0, bbox.z1);
        Ok(fraction)
    }

    /// Whole frames `[z0, z1)` covering the rotation range over which the reflection
    /// diffracts, clamped to the scan.
    pub fn compute_frame_range(&self, s1: Vector3<f64>, phi: f64) -> Result<(i32, i32)> {
        let (phia, phib) = self.model(s1, phi)?.phi_range()?;
        let za = self.scan.array_index_from_angle(phia);
        let zb = self.scan.array_index_from_angle(phib);
        let (za, zb) = if za <= zb { (za, zb) } else { (zb, za) };

        let (first, last) = self.scan.array_range();
        ensure!(last > first, "scan array range [{}, {}) is empty", first, last);
        let z0 = (za.floor() as i32).clamp(first, last - 1);
        let z1 = (zb.ceil() as i32).clamp(first + 1, last);
        Ok((z0, z1.max(z0 + 1)))
    }
}
