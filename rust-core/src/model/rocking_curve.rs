use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use crate::config::{DEGENERACY_TOLERANCE, PROBABILITY_TOLERANCE};
use crate::geometry::{perpendicular_basis, SphericalCap};
use crate::interfaces::{ModelTerms, RockingCurveParams};
use crate::Result;

/// Approximate angular model of one reflection as the crystal rotates.
///
/// The reflection is represented in reciprocal space as a spherical shell of thickness
/// `thickness` around the reciprocal lattice vector `r = s1 - s0`, spread over a cap of
/// half-angle `w`. From that the model derives a single rocking width, the rotation range
/// over which the reflection diffracts and the fraction of its intensity recorded between
/// two rotation angles, without sampling any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockingCurveModel {
    s0: Vector3<f64>,
    s1: Vector3<f64>,
    m2: Vector3<f64>,
    phi: f64,
    params: RockingCurveParams,
    terms: ModelTerms,
    d: f64,
    thickness: f64,
    rocking_width: f64,
    cap: SphericalCap,
}

impl RockingCurveModel {
    /// Construct the model of one reflection.
    ///
    /// # Arguments
    /// * `s0` - Incident beam vector
    /// * `s1` - Diffracted beam vector; rescaled to the length of `s0`
    /// * `m2` - Rotation axis; normalized
    /// * `phi` - Rotation angle at which the reflection is centred
    /// * `params` - Mosaic block size `s`, cell spread `da` and angular spread `w`
    /// * `terms` - Which optional contributions to include
    pub fn new(
        s0: Vector3<f64>,
        s1: Vector3<f64>,
        m2: Vector3<f64>,
        phi: f64,
        params: RockingCurveParams,
        terms: ModelTerms,
    ) -> Result<Self> {
        let s0_length = s0.norm();
        ensure!(s0_length > 0.0, "incident beam vector must have non-zero length");
        ensure!(s1.norm() > 0.0, "diffracted beam vector must have non-zero length");
        ensure!(m2.norm() > 0.0, "rotation axis must have non-zero length");
        params.validate()?;

        let s1 = s1.normalize() * s0_length;
        let w = if terms.angular_spread { params.w } else { 0.0 };
        let cap = SphericalCap::new(s1 - s0, w)?;

        let r_length = cap.a();
        let d = 1.0 / r_length;
        let mut thickness = 1.0 / params.s;
        if terms.resolution_thickness {
            thickness += params.da / d;
        }
        let rocking_width = 2.0 * (thickness / (2.0 * r_length)).atan() + w;

        Ok(Self {
            s0,
            s1,
            m2: m2.normalize(),
            phi,
            params,
            terms,
            d,
            thickness,
            rocking_width,
            cap,
        })
    }

    pub fn s0(&self) -> Vector3<f64> {
        self.s0
    }

    pub fn s1(&self) -> Vector3<f64> {
        self.s1
    }

    pub fn m2(&self) -> Vector3<f64> {
        self.m2
    }

    /// The reciprocal lattice vector `s1 - s0`.
    pub fn r(&self) -> Vector3<f64> {
        self.cap.axis()
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Resolution of the reflection, `1 / |r|`.
    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn s(&self) -> f64 {
        self.params.s
    }

    pub fn da(&self) -> f64 {
        self.params.da
    }

    pub fn w(&self) -> f64 {
        self.params.w
    }

    pub fn terms(&self) -> ModelTerms {
        self.terms
    }

    pub fn cap(&self) -> &SphericalCap {
        &self.cap
    }

    /// Radial thickness of the profile shell.
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Full angular width of the reflection.
    pub fn rocking_width(&self) -> f64 {
        self.rocking_width
    }

    /// Distance of a reciprocal space point from the profile's cap surface.
    pub fn distance(&self, point: Vector3<f64>) -> f64 {
        self.cap.distance(point)
    }

    /// Whether a reciprocal space point lies inside the profile shell.
    pub fn inside(&self, point: Vector3<f64>) -> bool {
        self.distance(point) < self.thickness
    }

    pub fn phi0(&self) -> f64 {
        self.phi - 0.5 * self.rocking_width
    }

    pub fn phi1(&self) -> f64 {
        self.phi + 0.5 * self.rocking_width
    }

    /// Smallest extent of the shell along `r`: the cap base less half the thickness.
    pub fn z0(&self) -> f64 {
        self.cap.h1() - 0.5 * self.thickness
    }

    /// Largest extent of the shell along `r`.
    pub fn z1(&self) -> f64 {
        self.cap.a() + 0.5 * self.thickness
    }

    /// Rotation range `[phi - dphi, phi + dphi]` over which the reflection diffracts.
    ///
    /// `dphi` is the rotation about `m2` that moves `r` through half the rocking width on
    /// the sphere of radius `|r|`.
    ///
    /// # Errors
    /// Precondition violation when `r` lies along the rotation axis; rotation then never
    /// moves the reflection and no such angle exists.
    pub fn phi_range(&self) -> Result<(f64, f64)> {
        let r = self.r();
        let r2 = r.norm_squared();
        let m2r = self.m2.dot(&r);
        let a = m2r * m2r - r2;
        ensure!(
            a.abs() > DEGENERACY_TOLERANCE * r2,
            "reciprocal lattice vector lies on the rotation axis"
        );
        let cos_dphi = (m2r * m2r - r2 * (0.5 * self.rocking_width).cos()) / a;
        let dphi = cos_dphi.clamp(-1.0, 1.0).acos();
        Ok((self.phi - dphi, self.phi + dphi))
    }

    /// Fraction of the reflection's intensity recorded between two rotation angles.
    ///
    /// The rocking curve is a normal distribution centred on `phi` whose 3σ point lies at
    /// half the rocking width. Argument order does not matter.
    pub fn intensity_fraction(&self, phia: f64, phib: f64) -> Result<f64> {
        let (phia, phib) = if phia > phib { (phib, phia) } else { (phia, phib) };
        let sigma = self.rocking_width / 6.0;
        let scale = 1.0 / (sigma * SQRT_2);
        let fraction =
            0.5 * (erf((phib - self.phi) * scale) - erf((phia - self.phi) * scale));
        ensure!(
            (-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&fraction),
            "intensity fraction must lie in [0, 1], got {}",
            fraction
        );
        Ok(fraction.clamp(0.0, 1.0))
    }

    /// Polar angles, about `s0`, at which the Ewald sphere meets spheres of radius
    /// `|r| - thickness / 2` and `|r| + thickness / 2`; sorted ascending.
    pub fn ewald_intersection_angles(&self) -> Result<(f64, f64)> {
        let rl = self.cap.a();
        let first = self.ewald_intersection_angle(rl - 0.5 * self.thickness)?;
        let second = self.ewald_intersection_angle(rl + 0.5 * self.thickness)?;
        Ok(if first <= second { (first, second) } else { (second, first) })
    }

    fn ewald_intersection_angle(&self, radius: f64) -> Result<f64> {
        let sl = self.s0.norm();
        let h2 = radius * radius / (2.0 * sl);
        let h1 = sl - h2;
        let sl2 = sl * sl;
        let h12 = h1 * h1;
        ensure!(
            sl2 >= h12,
            "sphere of radius {} does not meet the Ewald sphere",
            radius
        );
        Ok((sl2 - h12).sqrt().atan2(h1))
    }

    /// Orthonormal frame of the reflection with columns `(xp, yp, zp)`.
    ///
    /// `zp` runs along `r`, `xp` along the direction `r` moves as the crystal rotates
    /// (`m2 x r`) and `yp` completes the right-handed frame. If `r` is parallel to the
    /// axis any perpendicular direction is used for `xp`.
    pub fn local_frame(&self) -> Matrix3<f64> {
        let zp = self.r().normalize();
        let motion = self.m2.cross(&zp);
        let xp = if motion.norm() > DEGENERACY_TOLERANCE {
            motion.normalize()
        } else {
            perpendicular_basis(&zp).0
        };
        let yp = zp.cross(&xp);
        Matrix3::from_columns(&[xp, yp, zp])
    }

    /// Corners, in the lab frame, of the smallest box aligned with [`Self::local_frame`]
    /// that contains the whole profile shell.
    ///
    /// The shell spans radii `|r| ± thickness / 2` and polar angles up to half the
    /// rocking width around `r`. Six extremal points bound it along each local axis.
    pub fn minimum_box(&self) -> [Vector3<f64>; 8] {
        let rl = self.cap.a();
        let rho_min = (rl - 0.5 * self.thickness).max(0.0);
        let rho_max = rl + 0.5 * self.thickness;
        let theta_max = (0.5 * self.rocking_width).min(PI);
        let theta_side = theta_max.min(FRAC_PI_2);

        let point = |rho: f64, theta: f64, phi: f64| {
            Vector3::new(
                rho * theta.sin() * phi.cos(),
                rho * theta.sin() * phi.sin(),
                rho * theta.cos(),
            )
        };
        let rho_bottom = if theta_max.cos() >= 0.0 { rho_min } else { rho_max };
        let extremes = [
            point(rho_max, 0.0, 0.0),
            point(rho_bottom, theta_max, 0.0),
            point(rho_max, theta_side, 0.0),
            point(rho_max, theta_side, PI),
            point(rho_max, theta_side, FRAC_PI_2),
            point(rho_max, theta_side, 3.0 * FRAC_PI_2),
        ];

        let mut lower = extremes[0];
        let mut upper = extremes[0];
        for p in &extremes[1..] {
            lower = lower.inf(p);
            upper = upper.sup(p);
        }

        let frame = self.local_frame();
        let mut corners = [Vector3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let local = Vector3::new(
                if i & 1 == 0 { lower.x } else { upper.x },
                if i & 2 == 0 { lower.y } else { upper.y },
                if i & 4 == 0 { lower.z } else { upper.z },
            );
            *corner = frame * local;
        }
        corners
    }
}
