use ndarray::Array3;

use super::bounding_box::BoundingBox;
use super::mask::MaskCode;

/// Voxel data of one reflection: its bounding box plus mask and data grids.
///
/// Grids are indexed `(z, y, x)` relative to the box origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Shoebox {
    pub panel: usize,
    pub bbox: BoundingBox,
    pub mask: Array3<MaskCode>,
    pub data: Array3<f64>,
}

impl Shoebox {
    /// Shoebox with zeroed data and empty masks covering `bbox`.
    pub fn allocate(panel: usize, bbox: BoundingBox) -> Self {
        let shape = bbox.shape();
        Self {
            panel,
            bbox,
            mask: Array3::from_elem(shape, MaskCode::empty()),
            data: Array3::zeros(shape),
        }
    }

    /// True when both grids have exactly the shape of the bounding box.
    pub fn is_consistent(&self) -> bool {
        let shape = self.bbox.shape();
        self.mask.dim() == shape && self.data.dim() == shape
    }

    /// Number of voxels whose mask has every flag of `code` set.
    pub fn count(&self, code: MaskCode) -> usize {
        self.mask.iter().filter(|m| m.contains(code)).count()
    }
}
