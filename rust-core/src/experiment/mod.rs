// Experiment module: Contains the geometry collaborators the profile models consume
// This module provides the beam, goniometer, detector and scan traits plus simple models

// ======================== MODULE DECLARATIONS ========================
pub mod beam;
pub mod detector;
pub mod goniometer;
pub mod scan;

// Test modules
mod _tests_beam;
mod _tests_scan;

// ======================== BEAM ========================
pub use beam::{
    Beam,              // trait - source of the incident beam vector s0
    MonochromaticBeam, // struct - direction + wavelength, |s0| = 1 / wavelength
};

// ======================== GONIOMETER ========================
pub use goniometer::{
    Goniometer,           // trait - source of the rotation axis m2
    SingleAxisGoniometer, // struct - fixed rotation axis
};

// ======================== DETECTOR ========================
pub use detector::{
    Detector,  // trait - indexed collection of panels
    FlatPanel,     // struct - planar panel with fast/slow axes and an origin
    FlatPanelSpec, // struct - serialized panel description, validated into a FlatPanel
    Panel,     // trait - pixel <-> millimetre <-> lab-ray mappings of one panel
};
// Panel trait methods:
//   d_matrix(&self) -> Matrix3<f64>                               - maps (X mm, Y mm, 1) to a lab-frame ray
//   pixel_to_millimeter(&self, px: Vector2<f64>) -> Vector2<f64>  - pixel to panel millimetre coordinates
//   millimeter_to_pixel(&self, mm: Vector2<f64>) -> Vector2<f64>  - inverse of the above
//   ray_intersection(&self, s1: Vector3<f64>) -> Result<Vector2<f64>>    - millimetre point hit by ray s1
//   ray_intersection_px(&self, s1: Vector3<f64>) -> Result<Vector2<f64>> - pixel hit by ray s1
//   image_size(&self) -> (usize, usize)                           - (fast, slow) size in pixels

// ======================== SCAN ========================
pub use scan::{
    RotationScan,     // struct - contiguous image range with constant oscillation width
    RotationScanSpec, // struct - serialized scan description
    Scan,         // trait - frame index <-> rotation angle mapping
};
// Scan trait methods:
//   angle_from_array_index(&self, index: f64) -> f64  - rotation angle at (fractional) frame index
//   array_index_from_angle(&self, angle: f64) -> f64  - (fractional) frame index at rotation angle
//   array_range(&self) -> (i32, i32)                  - valid frame index range [first, last)
