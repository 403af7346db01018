// Support module: Contains the per-reflection drivers built on the profile models
// This module provides bounding box, mask and profile prediction and partiality estimates

// ======================== MODULE DECLARATIONS ========================
pub mod partiality;
pub mod profile_support;


// ======================== PROFILE SUPPORT ========================
pub use profile_support::ProfileSupport; // struct - experiment + crystal bound to the covariance model
// ProfileSupport impl methods:
//   new(beam, detector, goniometer, scan, a_matrix, spread, config) -> Result<Self>
//   model(&self, panel, s1, phi0) -> Result<CovarianceProfileModel>
//   compute_bbox(&self, panel, s1, phi0) -> Result<BoundingBox>               - bounded outward walks per face
//   compute_mask(&self, panel, s1, phi0, &mut Shoebox) -> Result<()>          - or-accumulates Foreground / Background
//   compute_prof(&self, panel, s1, phi0, &BoundingBox, &mut Array3<f64>) -> Result<()> - density at voxel centres
//   predict_shoebox(&self, panel, s1, phi0) -> Result<Shoebox>                - all three in a fresh shoebox

// ======================== PARTIALITY ========================
pub use partiality::PartialitySupport; // struct - experiment bound to the rocking curve model
// PartialitySupport impl methods:
//   new(beam, goniometer, scan, params, terms) -> Result<Self>
//   model(&self, s1, phi) -> Result<RockingCurveModel>
//   compute_partiality(&self, s1, phi, &BoundingBox) -> Result<f64>  - intensity fraction over frames [z0, z1)
//   compute_frame_range(&self, s1, phi) -> Result<(i32, i32)>        - frames covering the phi range
