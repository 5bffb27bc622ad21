//! Binary morphological erosion
//!
//! Keeps a set pixel only when every in-bounds position of the
//! structuring element is also set. Shrinks set regions and removes
//! isolated pixels.

use canopy_core::raster::Mask;
use canopy_core::Result;
use ndarray::Array2;
use rayon::prelude::*;

use super::element::StructuringElement;

/// Perform binary erosion on a mask
///
/// A pixel stays set only if all in-bounds cells of the structuring
/// element neighborhood are set. The kernel is clipped at the edges, so
/// border pixels are judged by their partial neighborhood.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
pub fn erode(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    element.validate()?;

    let (rows, cols) = mask.dim();
    let offsets = element.offsets();

    let output_data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![false; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                if !mask[(row, col)] {
                    continue;
                }

                let mut keep = true;
                for &(dr, dc) in &offsets {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    if !mask[(nr as usize, nc as usize)] {
                        keep = false;
                        break;
                    }
                }

                *out = keep;
            }

            row_data
        })
        .collect();

    // Row-parallel production preserves row-major order
    Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| canopy_core::Error::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erode_removes_isolated_pixel() {
        let mut mask = Mask::from_elem((7, 7), false);
        mask[(3, 3)] = true;

        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(!result[(3, 3)], "Isolated pixel should be eroded away");
    }

    #[test]
    fn test_erode_keeps_solid_block_interior() {
        let mut mask = Mask::from_elem((9, 9), false);
        for r in 2..7 {
            for c in 2..7 {
                mask[(r, c)] = true;
            }
        }

        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result[(4, 4)], "Block interior survives erosion");
        assert!(!result[(2, 2)], "Block corner is eroded");
    }

    #[test]
    fn test_erode_full_mask_survives_at_edges() {
        let mask = Mask::from_elem((5, 5), true);
        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        // Clipped kernel: border pixels only see in-bounds neighbors
        assert!(result[(0, 0)], "Corner of an all-set mask stays set");
        assert!(result[(4, 2)], "Edge of an all-set mask stays set");
    }

    #[test]
    fn test_erode_cross_ignores_diagonal_gap() {
        let mut mask = Mask::from_elem((5, 5), true);
        mask[(1, 1)] = false; // diagonal of (2,2)

        let result = erode(&mask, &StructuringElement::Cross(1)).unwrap();
        assert!(result[(2, 2)], "Cross element does not see diagonal gaps");

        let result_sq = erode(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(!result_sq[(2, 2)], "Square element sees the diagonal gap");
    }
}
