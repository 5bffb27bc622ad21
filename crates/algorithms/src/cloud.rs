//! Cloud screening and scene quality assessment
//!
//! Flags cloud-obscured pixels from their spectral signature and scores a
//! scene's overall usability for analysis. Cloud pixels are bright in all
//! bands and spectrally flat ("white"); both signatures are checked per
//! pixel.

use canopy_core::raster::{Mask, Scene, BAND_COUNT};
use canopy_core::{Error, Result};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Reflectance above which all bands together indicate cloud
pub const CLOUD_BRIGHTNESS_THRESHOLD: f64 = 0.3;

/// Maximum summed deviation from the band mean for a "white" pixel
pub const CLOUD_WHITENESS_THRESHOLD: f64 = 0.1;

/// Minimum band mean for the whiteness test to apply
pub const CLOUD_WHITENESS_MEAN_FLOOR: f64 = 0.25;

/// Reflectance above which a band counts as saturated
pub const SATURATION_THRESHOLD: f64 = 0.9;

/// Overall score above which a scene is considered suitable for analysis
pub const SUITABILITY_SCORE_FLOOR: f64 = 50.0;

/// Parameters for spectral cloud detection
#[derive(Debug, Clone)]
pub struct CloudParams {
    /// Per-band reflectance above which a pixel is uniformly bright
    pub brightness_threshold: f64,
    /// Summed absolute deviation below which a pixel is spectrally flat
    pub whiteness_threshold: f64,
    /// Band mean a flat pixel must exceed to count as cloud
    pub whiteness_mean_floor: f64,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            brightness_threshold: CLOUD_BRIGHTNESS_THRESHOLD,
            whiteness_threshold: CLOUD_WHITENESS_THRESHOLD,
            whiteness_mean_floor: CLOUD_WHITENESS_MEAN_FLOOR,
        }
    }
}

/// Usability scores for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Percentage of pixels flagged as cloud-obscured
    pub cloud_coverage_pct: f64,
    /// Percentage of pixels usable for analysis
    pub usable_area_pct: f64,
    /// Percentage of pixels with at least one saturated band
    pub saturation_pct: f64,
    /// Combined score in [0, 100]
    pub overall_score: f64,
    /// Whether the scene is good enough to analyze
    pub suitable_for_analysis: bool,
}

/// Flag cloud-obscured pixels in a scene.
///
/// A pixel is flagged when either signature matches:
/// - **Brightness**: every band exceeds `brightness_threshold`
/// - **Whiteness**: the summed absolute deviation of the bands from their
///   mean is below `whiteness_threshold` and the mean itself exceeds
///   `whiteness_mean_floor`
///
/// The returned mask is raw; callers that need a spatially coherent mask
/// apply a morphological close/open pass (see
/// [`vegetation_index_masked`](crate::indices::vegetation_index_masked)).
///
/// # Arguments
/// * `scene` - Preprocessed scene with reflectances in [0, 1]
/// * `params` - Detection thresholds
pub fn detect_clouds(scene: &Scene, params: &CloudParams) -> Result<Mask> {
    if scene.is_empty() {
        return Err(Error::InvalidInput("scene has no pixels".to_string()));
    }

    let (rows, cols) = scene.shape();

    let data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![false; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let bands = unsafe { scene.pixel_unchecked(row, col) };

                let bright = bands.iter().all(|&v| v > params.brightness_threshold);

                let mean = bands.iter().sum::<f64>() / BAND_COUNT as f64;
                let deviation: f64 = bands.iter().map(|v| (v - mean).abs()).sum();
                let white =
                    deviation < params.whiteness_threshold && mean > params.whiteness_mean_floor;

                *out = bright || white;
            }

            row_data
        })
        .collect();

    Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Score a scene's usability for analysis.
///
/// - cloud coverage % = flagged pixels / total pixels
/// - usable area % = 100 − cloud coverage %
/// - saturation % = pixels with any band above [`SATURATION_THRESHOLD`]
/// - overall = max(0, 100 − cloud % − saturation %)
/// - suitable = overall > [`SUITABILITY_SCORE_FLOOR`]
///
/// # Arguments
/// * `scene` - Preprocessed scene
/// * `validity_mask` - Cloud mask for the scene, `true` = obscured
pub fn assess_quality(scene: &Scene, validity_mask: &Mask) -> Result<QualityAssessment> {
    let (rows, cols) = scene.shape();
    let (mr, mc) = validity_mask.dim();
    if (mr, mc) != (rows, cols) {
        return Err(Error::ShapeMismatch {
            er: rows,
            ec: cols,
            ar: mr,
            ac: mc,
        });
    }

    let total = (rows * cols) as f64;
    let flagged = validity_mask.iter().filter(|&&v| v).count() as f64;

    let saturated = (0..rows)
        .into_par_iter()
        .map(|row| {
            let mut count = 0usize;
            for col in 0..cols {
                let bands = unsafe { scene.pixel_unchecked(row, col) };
                if bands.iter().any(|&v| v > SATURATION_THRESHOLD) {
                    count += 1;
                }
            }
            count
        })
        .sum::<usize>() as f64;

    let cloud_coverage_pct = flagged / total * 100.0;
    let saturation_pct = saturated / total * 100.0;
    let overall_score = (100.0 - cloud_coverage_pct - saturation_pct).max(0.0);

    Ok(QualityAssessment {
        cloud_coverage_pct,
        usable_area_pct: 100.0 - cloud_coverage_pct,
        saturation_pct,
        overall_score,
        suitable_for_analysis: overall_score > SUITABILITY_SCORE_FLOOR,
    })
}
