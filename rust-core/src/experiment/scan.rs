use serde::{Deserialize, Serialize};

use crate::{ProfileError, Result};

/// Mapping between frame (array) indices and rotation angles.
pub trait Scan {
    /// Rotation angle (radians) at the given, possibly fractional, array index.
    fn angle_from_array_index(&self, index: f64) -> f64;

    /// Fractional array index at the given rotation angle (radians).
    fn array_index_from_angle(&self, angle: f64) -> f64;

    /// Valid array indices as a half-open range `[first, last)`.
    fn array_range(&self) -> (i32, i32);
}

/// Serialized description of a [`RotationScan`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationScanSpec {
    /// First and last image numbers, inclusive and 1-based.
    pub image_range: (i32, i32),
    /// Rotation angle at the start of the first image, in radians.
    pub oscillation_start: f64,
    /// Rotation per image, in radians.
    pub oscillation_width: f64,
}

/// A contiguous rotation scan with constant oscillation width.
///
/// Image `n` covers array index `n - 1`, so the array range of images
/// `(first, last)` is `[first - 1, last)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RotationScanSpec", into = "RotationScanSpec")]
pub struct RotationScan {
    spec: RotationScanSpec,
}

impl RotationScan {
    pub fn new(spec: RotationScanSpec) -> Result<Self> {
        ensure!(
            spec.image_range.1 >= spec.image_range.0,
            "scan image range must not be inverted, got {:?}",
            spec.image_range
        );
        ensure!(
            spec.oscillation_width > 0.0,
            "oscillation width must be positive, got {}",
            spec.oscillation_width
        );
        Ok(Self { spec })
    }

    pub fn image_range(&self) -> (i32, i32) {
        self.spec.image_range
    }

    pub fn oscillation(&self) -> (f64, f64) {
        (self.spec.oscillation_start, self.spec.oscillation_width)
    }

    pub fn num_images(&self) -> usize {
        (self.spec.image_range.1 - self.spec.image_range.0 + 1) as usize
    }
}

impl TryFrom<RotationScanSpec> for RotationScan {
    type Error = ProfileError;

    fn try_from(spec: RotationScanSpec) -> Result<Self> {
        Self::new(spec)
    }
}

impl From<RotationScan> for RotationScanSpec {
    fn from(scan: RotationScan) -> Self {
        scan.spec
    }
}

impl Scan for RotationScan {
    fn angle_from_array_index(&self, index: f64) -> f64 {
        let first = self.array_range().0 as f64;
        self.spec.oscillation_start + (index - first) * self.spec.oscillation_width
    }

    fn array_index_from_angle(&self, angle: f64) -> f64 {
        let first = self.array_range().0 as f64;
        first + (angle - self.spec.oscillation_start) / self.spec.oscillation_width
    }

    fn array_range(&self) -> (i32, i32) {
        (self.spec.image_range.0 - 1, self.spec.image_range.1)
    }
}
