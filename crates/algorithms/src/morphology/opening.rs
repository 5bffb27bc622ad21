//! Binary morphological opening (erosion followed by dilation)
//!
//! Removes isolated set pixels and thin protrusions while preserving the
//! shape of larger set regions.

use canopy_core::raster::Mask;
use canopy_core::Result;

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Perform binary opening on a mask
///
/// Opening = erode then dilate. Single set pixels and features thinner
/// than the element disappear; larger regions keep their footprint.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
pub fn opening(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    let eroded = erode(mask, element)?;
    dilate(&eroded, element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_removes_salt_noise() {
        let mut mask = Mask::from_elem((9, 9), false);
        mask[(1, 1)] = true; // isolated noise
        for r in 4..8 {
            for c in 4..8 {
                mask[(r, c)] = true; // solid block
            }
        }

        let result = opening(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(!result[(1, 1)], "Isolated pixel removed by opening");
        assert!(result[(5, 5)], "Block interior preserved by opening");
    }

    #[test]
    fn test_opening_uniform_mask_unchanged() {
        let mask = Mask::from_elem((6, 6), true);
        let result = opening(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result.iter().all(|&v| v), "All-set mask is a fixed point of opening");
    }
}
