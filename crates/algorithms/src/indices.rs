//! Vegetation index derivation
//!
//! Computes the normalized-difference vegetation signal from the red and
//! near-infrared bands of a scene. High values indicate healthy
//! vegetation; a drop between two acquisitions is the change-detection
//! signal downstream.

use canopy_core::raster::{Band, Mask, Raster, Scene};
use canopy_core::{Error, Result};
use ndarray::Array2;
use rayon::prelude::*;

use crate::cloud::{detect_clouds, CloudParams};
use crate::morphology::{closing, opening, StructuringElement};

/// Guard against division by zero in the index denominator
pub const INDEX_EPSILON: f64 = 1e-8;

/// Compute the vegetation index for a scene.
///
/// `index = (NIR − Red) / (NIR + Red + ε)`, clipped to [-1, 1].
///
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// Pixels with NaN in either band stay NaN.
///
/// # Arguments
/// * `scene` - Preprocessed scene with reflectances in [0, 1]
pub fn vegetation_index(scene: &Scene) -> Result<Raster<f64>> {
    if scene.is_empty() {
        return Err(Error::InvalidInput("scene has no pixels".to_string()));
    }

    let (rows, cols) = scene.shape();
    let nir = scene.band(Band::Nir);
    let red = scene.band(Band::Red);

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let n = nir[(row, col)];
                let r = red[(row, col)];
                // NaN propagates through both the ratio and the clamp
                *out = ((n - r) / (n + r + INDEX_EPSILON)).clamp(-1.0, 1.0);
            }
            row_data
        })
        .collect();

    build_output(rows, cols, data)
}

/// Compute the vegetation index together with a validity mask.
///
/// Runs cloud detection first, cleans the raw flag map with one binary
/// close followed by one open (3×3 square element) to drop isolated
/// false positives and fill small gaps, then computes the index and sets
/// flagged pixels to NaN.
///
/// Returns `(index, validity_mask)` where `true` in the mask marks an
/// invalid (cloud-obscured) pixel.
///
/// # Arguments
/// * `scene` - Preprocessed scene with reflectances in [0, 1]
/// * `params` - Cloud detection thresholds
pub fn vegetation_index_masked(
    scene: &Scene,
    params: &CloudParams,
) -> Result<(Raster<f64>, Mask)> {
    let raw = detect_clouds(scene, params)?;
    let element = StructuringElement::Square(1);
    let cleaned = opening(&closing(&raw, &element)?, &element)?;

    let mut index = vegetation_index(scene)?;
    for ((row, col), &invalid) in cleaned.indexed_iter() {
        if invalid {
            // Safe: mask and index share the scene's dimensions
            unsafe { index.set_unchecked(row, col, f64::NAN) };
        }
    }

    Ok((index, cleaned))
}

fn build_output(rows: usize, cols: usize, data: Vec<f64>) -> Result<Raster<f64>> {
    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let mut output = Raster::from_array(array);
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
