//! Binary morphological dilation
//!
//! Sets a pixel when any in-bounds position of the structuring element
//! is set. Expands set regions and bridges small gaps.

use canopy_core::raster::Mask;
use canopy_core::Result;
use ndarray::Array2;
use rayon::prelude::*;

use super::element::StructuringElement;

/// Perform binary dilation on a mask
///
/// A pixel becomes set if any in-bounds cell of the structuring element
/// neighborhood is set. The kernel is clipped at the edges.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
pub fn dilate(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    element.validate()?;

    let (rows, cols) = mask.dim();
    let offsets = element.offsets();

    let output_data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![false; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                for &(dr, dc) in &offsets {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    if mask[(nr as usize, nc as usize)] {
                        *out = true;
                        break;
                    }
                }
            }

            row_data
        })
        .collect();

    // Row-parallel production preserves row-major order
    Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| canopy_core::Error::InvalidInput(e.to_string()))
}
