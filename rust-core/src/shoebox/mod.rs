// Shoebox module: Contains the per-reflection voxel containers
// This module provides the integer bounding box, the mask flag set and the shoebox itself

// ======================== MODULE DECLARATIONS ========================
pub mod bounding_box;
pub mod container;
pub mod mask;


// ======================== SHOEBOX TYPES ========================
pub use bounding_box::BoundingBox; // struct - half-open (x0, x1, y0, y1, z0, z1) box, non-empty on every axis
pub use container::Shoebox; // struct - bbox + (z, y, x) mask and data grids
pub use mask::MaskCode; // struct - accumulate-only voxel flag set (Valid, Background, Foreground, ...)

// BoundingBox impl methods:
//   new(x0, x1, y0, y1, z0, z1) -> Result<Self>  - validates x1 > x0, y1 > y0, z1 > z0
//   from_array([i32; 6]) -> Result<Self>         - same, from array order
//   shape(&self) -> (usize, usize, usize)        - (nz, ny, nx)
//   contains(&self, x, y, z) -> bool             - point-in-box test

// Shoebox impl methods:
//   allocate(panel, bbox) -> Self                - zeroed grids shaped like the bbox
//   is_consistent(&self) -> bool                 - grids match the bbox shape
//   count(&self, code: MaskCode) -> usize        - voxels carrying all flags of code
