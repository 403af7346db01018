use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::{ProfileError, Result};

/// Pixel, millimetre and lab-frame mappings of one detector panel.
///
/// Implement this trait to plug in a panel model with parallax or distortion
/// corrections. The profile models only rely on `d_matrix`, the millimetre conversion
/// and the inverse ray projection.
pub trait Panel {
    /// Matrix mapping panel millimetre coordinates `(X, Y, 1)` to a lab-frame ray.
    fn d_matrix(&self) -> Matrix3<f64>;

    /// Convert (fractional) pixel coordinates to panel millimetre coordinates.
    fn pixel_to_millimeter(&self, px: Vector2<f64>) -> Vector2<f64>;

    /// Convert panel millimetre coordinates to (fractional) pixel coordinates.
    fn millimeter_to_pixel(&self, mm: Vector2<f64>) -> Vector2<f64>;

    /// Millimetre coordinates where the ray `s1` meets the panel plane.
    fn ray_intersection(&self, s1: Vector3<f64>) -> Result<Vector2<f64>>;

    /// Pixel coordinates where the ray `s1` meets the panel plane.
    fn ray_intersection_px(&self, s1: Vector3<f64>) -> Result<Vector2<f64>> {
        Ok(self.millimeter_to_pixel(self.ray_intersection(s1)?))
    }

    /// Image size in pixels, (fast, slow).
    fn image_size(&self) -> (usize, usize);
}

/// An indexed collection of panels.
pub trait Detector {
    fn num_panels(&self) -> usize;

    fn panel(&self, index: usize) -> Option<&dyn Panel>;
}

impl<P: Panel> Detector for [P] {
    fn num_panels(&self) -> usize {
        self.len()
    }

    fn panel(&self, index: usize) -> Option<&dyn Panel> {
        self.get(index).map(|p| p as &dyn Panel)
    }
}

impl<P: Panel> Detector for Vec<P> {
    fn num_panels(&self) -> usize {
        self.len()
    }

    fn panel(&self, index: usize) -> Option<&dyn Panel> {
        self.as_slice().panel(index)
    }
}

/// Serialized description of a [`FlatPanel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatPanelSpec {
    /// Lab-frame direction of increasing fast pixel index (unit vector).
    pub fast_axis: Vector3<f64>,
    /// Lab-frame direction of increasing slow pixel index (unit vector).
    pub slow_axis: Vector3<f64>,
    /// Lab-frame position of the panel's pixel (0, 0) corner, in mm.
    pub origin: Vector3<f64>,
    /// Pixel size (fast, slow) in mm.
    pub pixel_size: Vector2<f64>,
    /// Image size (fast, slow) in pixels.
    pub image_size: (usize, usize),
}

/// A planar detector panel.
///
/// The D matrix has the fast axis, slow axis and origin as columns, so a millimetre
/// coordinate `(X, Y)` maps to the lab point `origin + X * fast + Y * slow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlatPanelSpec", into = "FlatPanelSpec")]
pub struct FlatPanel {
    spec: FlatPanelSpec,
    d_matrix: Matrix3<f64>,
    d_inverse: Matrix3<f64>,
}

impl FlatPanel {
    pub fn new(spec: FlatPanelSpec) -> Result<Self> {
        ensure!(spec.fast_axis.norm() > 0.0, "panel fast axis must have non-zero length");
        ensure!(spec.slow_axis.norm() > 0.0, "panel slow axis must have non-zero length");
        ensure!(
            spec.pixel_size.x > 0.0 && spec.pixel_size.y > 0.0,
            "pixel size must be positive in both directions"
        );
        let spec = FlatPanelSpec {
            fast_axis: spec.fast_axis.normalize(),
            slow_axis: spec.slow_axis.normalize(),
            ..spec
        };
        let d_matrix = Matrix3::from_columns(&[spec.fast_axis, spec.slow_axis, spec.origin]);
        let d_inverse = d_matrix.try_inverse().ok_or_else(|| {
            ProfileError::PreconditionViolated(
                "panel D matrix must be invertible (origin lies in the panel plane through the sample)"
                    .to_string(),
            )
        })?;
        Ok(Self {
            spec,
            d_matrix,
            d_inverse,
        })
    }

    pub fn spec(&self) -> &FlatPanelSpec {
        &self.spec
    }

    pub fn d_inverse(&self) -> Matrix3<f64> {
        self.d_inverse
    }

    /// Panel normal pointing away from the sample side of the origin.
    pub fn normal(&self) -> Vector3<f64> {
        self.spec.fast_axis.cross(&self.spec.slow_axis).normalize()
    }

    /// Distance from the sample to the panel plane, in mm.
    pub fn distance(&self) -> f64 {
        self.spec.origin.dot(&self.normal()).abs()
    }
}

impl TryFrom<FlatPanelSpec> for FlatPanel {
    type Error = ProfileError;

    fn try_from(spec: FlatPanelSpec) -> Result<Self> {
        Self::new(spec)
    }
}

impl From<FlatPanel> for FlatPanelSpec {
    fn from(panel: FlatPanel) -> Self {
        panel.spec
    }
}

impl Panel for FlatPanel {
    fn d_matrix(&self) -> Matrix3<f64> {
        self.d_matrix
    }

    fn pixel_to_millimeter(&self, px: Vector2<f64>) -> Vector2<f64> {
        px.component_mul(&self.spec.pixel_size)
    }

    fn millimeter_to_pixel(&self, mm: Vector2<f64>) -> Vector2<f64> {
        mm.component_div(&self.spec.pixel_size)
    }

    fn ray_intersection(&self, s1: Vector3<f64>) -> Result<Vector2<f64>> {
        let v = self.d_inverse * s1;
        ensure!(v.z > 0.0, "diffracted beam does not intersect the panel plane");
        Ok(Vector2::new(v.x / v.z, v.y / v.z))
    }

    fn image_size(&self) -> (usize, usize) {
        self.spec.image_size
    }
}
