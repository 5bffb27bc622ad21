//! Binary morphological closing (dilation followed by erosion)
//!
//! Fills small holes and bridges narrow gaps while preserving the overall
//! footprint of set regions.

use canopy_core::raster::Mask;
use canopy_core::Result;

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Perform binary closing on a mask
///
/// Closing = dilate then erode. Holes smaller than the element are
/// filled and fragments separated by one-pixel gaps merge.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
pub fn closing(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    let dilated = dilate(mask, element)?;
    erode(&dilated, element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_fills_hole() {
        let mut mask = Mask::from_elem((9, 9), true);
        mask[(4, 4)] = false; // single-pixel hole

        let result = closing(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result[(4, 4)], "Single-pixel hole filled by closing");
    }

    #[test]
    fn test_closing_merges_adjacent_fragments() {
        let mut mask = Mask::from_elem((7, 7), false);
        for c in 0..3 {
            mask[(3, c)] = true;
        }
        for c in 4..7 {
            mask[(3, c)] = true;
        }

        let result = closing(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result[(3, 3)], "One-pixel gap between fragments closed");
    }

    #[test]
    fn test_closing_empty_mask_stays_empty() {
        let mask = Mask::from_elem((6, 6), false);
        let result = closing(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(!result.iter().any(|&v| v), "Nothing to close");
    }
}
