use log::{debug, trace, warn};
use nalgebra::{Matrix3, Vector2, Vector3};
use ndarray::Array3;

use crate::config::SupportConfig;
use crate::experiment::{Beam, Detector, Goniometer, Panel, Scan};
use crate::interfaces::{MosaicitySpread, RlpSource};
use crate::model::{CovarianceProfileModel, ProfileGeometry};
use crate::shoebox::{BoundingBox, MaskCode, Shoebox};
use crate::{BoxFace, ProfileError, Result};

/// Sub-pixel / sub-frame offsets sampled per voxel when classifying the mask.
const VOXEL_SAMPLES: [f64; 3] = [0.0, 0.5, 1.0];

/// Floor of `value` as a grid index, leaving room for a walk of `steps` either side.
fn grid_index(value: f64, steps: usize, what: &str) -> Result<i32> {
    let floor = value.floor();
    let margin = steps as f64 + 1.0;
    ensure!(
        floor.is_finite() && floor - margin >= i32::MIN as f64 && floor + margin <= i32::MAX as f64,
        "{} {} is outside the addressable grid",
        what,
        value
    );
    Ok(floor as i32)
}

/// Per-reflection bounding box, mask and profile computation for one experiment.
///
/// Holds the experiment collaborators and the crystal parameters; every query builds the
/// covariance model of one reflection from its diffracted beam vector and centroid angle.
pub struct ProfileSupport<'e, D: Detector + ?Sized, S: Scan + ?Sized> {
    detector: &'e D,
    scan: &'e S,
    s0: Vector3<f64>,
    m2: Vector3<f64>,
    a_matrix: Matrix3<f64>,
    spread: MosaicitySpread,
    config: SupportConfig,
}

impl<'e, D: Detector + ?Sized, S: Scan + ?Sized> ProfileSupport<'e, D, S> {
    /// Bind the experiment and crystal parameters.
    ///
    /// # Arguments
    /// * `beam` - Source of `s0`
    /// * `detector` - Panels indexed by the `panel` argument of the queries
    /// * `goniometer` - Source of the rotation axis `m2`
    /// * `scan` - Frame index / angle mapping
    /// * `a_matrix` - Crystal setting matrix
    /// * `spread` - Mosaicity standard deviations
    /// * `config` - Search threshold, step limit and active covariance terms
    pub fn new<B: Beam + ?Sized, G: Goniometer + ?Sized>(
        beam: &B,
        detector: &'e D,
        goniometer: &G,
        scan: &'e S,
        a_matrix: Matrix3<f64>,
        spread: MosaicitySpread,
        config: SupportConfig,
    ) -> Result<Self> {
        config.validate()?;
        spread.validate()?;
        let s0 = beam.s0();
        let m2 = goniometer.rotation_axis();
        ensure!(s0.norm() > 0.0, "incident beam vector must have non-zero length");
        ensure!(m2.norm() > 0.0, "rotation axis must have non-zero length");
        Ok(Self {
            detector,
            scan,
            s0,
            m2,
            a_matrix,
            spread,
            config,
        })
    }

    pub fn config(&self) -> &SupportConfig {
        &self.config
    }

    pub fn s0(&self) -> Vector3<f64> {
        self.s0
    }

    pub fn m2(&self) -> Vector3<f64> {
        self.m2
    }

    fn panel(&self, index: usize) -> Result<&'e dyn Panel> {
        self.detector.panel(index).ok_or_else(|| {
            ProfileError::PreconditionViolated(format!(
                "panel {} out of range, detector has {} panels",
                index,
                self.detector.num_panels()
            ))
        })
    }

    fn build_model(&self, panel: &dyn Panel, s1: Vector3<f64>, phi0: f64) -> Result<CovarianceProfileModel> {
        let geometry = ProfileGeometry {
            d_matrix: panel.d_matrix(),
            a_matrix: self.a_matrix,
            s0: self.s0,
            m2: self.m2,
        };
        CovarianceProfileModel::new(
            geometry,
            RlpSource::Diffracted { s1, phi0 },
            self.spread,
            self.config.terms,
        )
    }

    /// Covariance model of the reflection with diffracted beam `s1` at angle `phi0`.
    pub fn model(&self, panel: usize, s1: Vector3<f64>, phi0: f64) -> Result<CovarianceProfileModel> {
        self.build_model(self.panel(panel)?, s1, phi0)
    }

    /// Smallest box of whole pixels and frames whose faces lie outside the `chi2p`
    /// contour of the profile.
    ///
    /// Each face is found by walking outwards one pixel (or frame) at a time from the
    /// centroid, holding the other two coordinates at the centroid, until the squared
    /// Mahalanobis distance reaches `chi2p`. The frame range is clamped to the scan.
    pub fn compute_bbox(&self, panel: usize, s1: Vector3<f64>, phi0: f64) -> Result<BoundingBox> {
        let p = self.panel(panel)?;
        let model = self.build_model(p, s1, phi0)?;

        let centroid = p.ray_intersection_px(s1)?;
        let (xc, yc) = (centroid.x, centroid.y);
        let zc = self.scan.array_index_from_angle(phi0);
        let centroid_mm = p.pixel_to_millimeter(centroid);
        trace!("bbox centroid at ({:.3}, {:.3}, {:.3})", xc, yc, zc);

        let dm_x = |x: i32| {
            let mm = p.pixel_to_millimeter(Vector2::new(x as f64, yc));
            model.dm(mm.x, mm.y, phi0)
        };
        let dm_y = |y: i32| {
            let mm = p.pixel_to_millimeter(Vector2::new(xc, y as f64));
            model.dm(mm.x, mm.y, phi0)
        };
        let dm_z = |z: i32| {
            let phi = self.scan.angle_from_array_index(z as f64);
            model.dm(centroid_mm.x, centroid_mm.y, phi)
        };

        let limit = self.config.max_search_steps;
        let (fx, fy, fz) = (
            grid_index(xc, limit, "centroid x")?,
            grid_index(yc, limit, "centroid y")?,
            grid_index(zc, limit, "centroid frame")?,
        );
        let x0 = self.walk(BoxFace::NegX, fx, -1, &dm_x)?;
        let x1 = self.walk(BoxFace::PosX, fx + 1, 1, &dm_x)?;
        let y0 = self.walk(BoxFace::NegY, fy, -1, &dm_y)?;
        let y1 = self.walk(BoxFace::PosY, fy + 1, 1, &dm_y)?;
        let mut z0 = self.walk(BoxFace::NegZ, fz, -1, &dm_z)?;
        let mut z1 = self.walk(BoxFace::PosZ, fz + 1, 1, &dm_z)?;

        let (first, last) = self.scan.array_range();
        ensure!(last > first, "scan array range [{}, {}) is empty", first, last);
        if z0 < first || z1 > last {
            warn!(
                "frame range [{}, {}) of reflection at phi {:.4} clamped to scan range [{}, {})",
                z0, z1, phi0, first, last
            );
            z0 = z0.clamp(first, last - 1);
            z1 = z1.clamp(first + 1, last);
        }

        let bbox = BoundingBox::new(x0, x1, y0, y1, z0, z1)?;
        debug!("bbox {:?} for panel {} reflection at phi {:.4}", bbox.as_array(), panel, phi0);
        Ok(bbox)
    }

    /// Walk from `start` in unit `step`s until `dm` reaches the threshold.
    fn walk(
        &self,
        face: BoxFace,
        start: i32,
        step: i32,
        dm: &dyn Fn(i32) -> Result<f64>,
    ) -> Result<i32> {
        let mut position = start;
        for taken in 0..self.config.max_search_steps {
            if dm(position)? >= self.config.chi2p {
                trace!("face {} stopped at {} after {} steps", face, position, taken);
                return Ok(position);
            }
            position += step;
        }
        Err(ProfileError::SearchDidNotConverge {
            face,
            steps: self.config.max_search_steps,
        })
    }

    /// Classify every voxel of `shoebox` as foreground or background.
    ///
    /// A voxel is foreground when any of 27 samples (pixel corners, edge and face midpoints
    /// and centre, at the frame start, middle and end) falls inside the `chi2p` contour.
    /// The code is or-ed into the existing mask, so flags set earlier are kept.
    pub fn compute_mask(&self, panel: usize, s1: Vector3<f64>, phi0: f64, shoebox: &mut Shoebox) -> Result<()> {
        ensure!(
            shoebox.is_consistent(),
            "shoebox grids must match the bounding box shape {:?}",
            shoebox.bbox.shape()
        );
        let p = self.panel(panel)?;
        let model = self.build_model(p, s1, phi0)?;
        let bbox = shoebox.bbox;

        for (k, z) in (bbox.z0..bbox.z1).enumerate() {
            let frame = VOXEL_SAMPLES.map(|dz| self.scan.angle_from_array_index(z as f64 + dz));
            for (j, y) in (bbox.y0..bbox.y1).enumerate() {
                for (i, x) in (bbox.x0..bbox.x1).enumerate() {
                    let mut corners = [Vector2::zeros(); 9];
                    for (n, corner) in corners.iter_mut().enumerate() {
                        let px = Vector2::new(x as f64 + VOXEL_SAMPLES[n % 3], y as f64 + VOXEL_SAMPLES[n / 3]);
                        *corner = p.pixel_to_millimeter(px);
                    }
                    let code = if self.any_inside(&model, &corners, &frame)? {
                        MaskCode::FOREGROUND
                    } else {
                        MaskCode::BACKGROUND
                    };
                    shoebox.mask[[k, j, i]] |= code;
                }
            }
        }

        debug!(
            "mask for bbox {:?}: {} foreground voxels of {}",
            bbox.as_array(),
            shoebox.count(MaskCode::FOREGROUND),
            bbox.volume()
        );
        Ok(())
    }

    fn any_inside(&self, model: &CovarianceProfileModel, points: &[Vector2<f64>; 9], angles: &[f64; 3]) -> Result<bool> {
        for &phi in angles {
            for mm in points {
                if model.dm(mm.x, mm.y, phi)? < self.config.chi2p {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Fill `profile` with the unnormalized density at each voxel centre.
    ///
    /// `profile` must be shaped `(z1 - z0, y1 - y0, x1 - x0)`.
    pub fn compute_prof(
        &self,
        panel: usize,
        s1: Vector3<f64>,
        phi0: f64,
        bbox: &BoundingBox,
        profile: &mut Array3<f64>,
    ) -> Result<()> {
        ensure!(
            bbox.x1 > bbox.x0 && bbox.y1 > bbox.y0 && bbox.z1 > bbox.z0,
            "bounding box must be non-empty, got {:?}",
            bbox.as_array()
        );
        ensure!(
            profile.dim() == bbox.shape(),
            "profile shape {:?} does not match bounding box shape {:?}",
            profile.dim(),
            bbox.shape()
        );
        let p = self.panel(panel)?;
        let model = self.build_model(p, s1, phi0)?;

        for (k, z) in (bbox.z0..bbox.z1).enumerate() {
            let phi = self.scan.angle_from_array_index(z as f64 + 0.5);
            for (j, y) in (bbox.y0..bbox.y1).enumerate() {
                for (i, x) in (bbox.x0..bbox.x1).enumerate() {
                    let mm = p.pixel_to_millimeter(Vector2::new(x as f64 + 0.5, y as f64 + 0.5));
                    profile[[k, j, i]] = model.p(mm.x, mm.y, phi)?;
                }
            }
        }
        Ok(())
    }

    /// Bounding box, mask and profile of one reflection in a fresh shoebox.
    ///
    /// Every voxel is marked valid; the data grid holds the predicted profile.
    pub fn predict_shoebox(&self, panel: usize, s1: Vector3<f64>, phi0: f64) -> Result<Shoebox> {
        let bbox = self.compute_bbox(panel, s1, phi0)?;
        let mut shoebox = Shoebox::allocate(panel, bbox);
        shoebox.mask.fill(MaskCode::VALID);
        self.compute_mask(panel, s1, phi0, &mut shoebox)?;
        self.compute_prof(panel, s1, phi0, &bbox, &mut shoebox.data)?;
        Ok(shoebox)
    }
}
