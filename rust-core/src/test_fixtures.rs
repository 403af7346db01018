// Synthetic experiment shared by the model and support tests

use nalgebra::{Matrix3, Vector2, Vector3};

use crate::config::SupportConfig;
use crate::experiment::{
    FlatPanel, FlatPanelSpec, MonochromaticBeam, Panel, RotationScan, RotationScanSpec,
    SingleAxisGoniometer,
};
use crate::interfaces::MosaicitySpread;
use crate::model::ProfileGeometry;
use crate::support::ProfileSupport;

/// Pixel position of the test reflection on panel 0.
pub(crate) const CENTROID_PX: (f64, f64) = (620.3, 410.7);
/// Fractional frame of the test reflection.
pub(crate) const CENTROID_FRAME: f64 = 50.3;

pub(crate) struct Experiment {
    pub beam: MonochromaticBeam,
    pub detector: Vec<FlatPanel>,
    pub goniometer: SingleAxisGoniometer,
    pub scan: RotationScan,
    pub a_matrix: Matrix3<f64>,
    pub spread: MosaicitySpread,
}

/// Wavelength 1 Å beam along -z, a 1000 x 1000 pixel panel 200 mm downstream, rotation
/// about x in 0.5 degree frames and a cubic 50 Å cell.
pub(crate) fn experiment() -> Experiment {
    let panel = FlatPanel::new(FlatPanelSpec {
        fast_axis: Vector3::new(1.0, 0.0, 0.0),
        slow_axis: Vector3::new(0.0, -1.0, 0.0),
        origin: Vector3::new(-50.0, 50.0, -200.0),
        pixel_size: Vector2::new(0.1, 0.1),
        image_size: (1000, 1000),
    })
    .expect("valid panel");
    Experiment {
        beam: MonochromaticBeam::new(Vector3::new(0.0, 0.0, -1.0), 1.0).expect("valid beam"),
        detector: vec![panel],
        goniometer: SingleAxisGoniometer::new(Vector3::x()).expect("valid goniometer"),
        scan: RotationScan::new(RotationScanSpec {
            image_range: (1, 100),
            oscillation_start: 0.0,
            oscillation_width: 0.5_f64.to_radians(),
        })
        .expect("valid scan"),
        a_matrix: Matrix3::identity() * 0.02,
        spread: MosaicitySpread::isotropic(0.05, 0.01, 0.001),
    }
}

impl Experiment {
    pub fn panel(&self) -> &FlatPanel {
        &self.detector[0]
    }

    /// Diffracted beam through the centroid pixel, with |s1| = |s0|.
    pub fn s1(&self) -> Vector3<f64> {
        self.s1_at(CENTROID_PX.0, CENTROID_PX.1)
    }

    pub fn s1_at(&self, x_px: f64, y_px: f64) -> Vector3<f64> {
        let mm = self.panel().pixel_to_millimeter(Vector2::new(x_px, y_px));
        (self.panel().d_matrix() * Vector3::new(mm.x, mm.y, 1.0)).normalize() / self.beam.wavelength
    }

    pub fn phi0(&self) -> f64 {
        (CENTROID_FRAME * 0.5).to_radians()
    }

    pub fn geometry(&self) -> ProfileGeometry {
        ProfileGeometry {
            d_matrix: self.panel().d_matrix(),
            a_matrix: self.a_matrix,
            s0: Vector3::new(0.0, 0.0, -1.0),
            m2: Vector3::x(),
        }
    }

    pub fn support(&self, config: SupportConfig) -> ProfileSupport<'_, Vec<FlatPanel>, RotationScan> {
        ProfileSupport::new(
            &self.beam,
            &self.detector,
            &self.goniometer,
            &self.scan,
            self.a_matrix,
            self.spread,
            config,
        )
        .expect("valid support")
    }
}
