//! Scene preprocessing
//!
//! Normalizes raw sensor counts into reflectances and suppresses speckle
//! noise with a per-band median filter. Runs before any index math so the
//! rest of the pipeline can assume values in approximately [0, 1].

use canopy_core::raster::{Scene, BAND_COUNT};
use canopy_core::{Algorithm, Error, Result};
use ndarray::{Array3, ArrayView2, Axis};
use rayon::prelude::*;

/// Divisor applied to raw digital numbers to obtain reflectance.
///
/// Sentinel-2 L2A encodes surface reflectance as DN = reflectance * 10000.
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Parameters for scene preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessParams {
    /// Divisor for raw sensor counts (applied only when values exceed 1.0)
    pub reflectance_scale: f64,
    /// Median filter radius (window side = 2*radius + 1)
    pub median_radius: usize,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            reflectance_scale: REFLECTANCE_SCALE,
            median_radius: 1,
        }
    }
}

/// Preprocessing algorithm
#[derive(Debug, Clone, Default)]
pub struct Preprocess;

impl Algorithm for Preprocess {
    type Input = Scene;
    type Output = Scene;
    type Params = PreprocessParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Preprocess"
    }

    fn description(&self) -> &'static str {
        "Reflectance normalization and per-band median denoising"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        preprocess_scene(&input, params)
    }
}

/// Normalize and denoise a spectral scene.
///
/// 1. If any value exceeds 1.0 the whole scene is divided by
///    `reflectance_scale`, bringing raw digital numbers into [0, 1].
///    Scenes already in reflectance units pass through unchanged.
/// 2. Each band is median-filtered independently. The window is clipped
///    at the raster edges and NaN values are skipped; an even number of
///    candidates averages the middle pair.
///
/// # Arguments
/// * `scene` - Input scene, raw counts or reflectances
/// * `params` - Scale constant and filter radius
pub fn preprocess_scene(scene: &Scene, params: PreprocessParams) -> Result<Scene> {
    if scene.is_empty() {
        return Err(Error::InvalidInput("scene has no pixels".to_string()));
    }
    if params.median_radius == 0 {
        return Err(Error::InvalidParameter {
            name: "median_radius",
            value: "0".to_string(),
            reason: "median window radius must be at least 1".to_string(),
        });
    }

    let (rows, cols) = scene.shape();

    // Raw digital numbers are detected by magnitude alone.
    let scaled = if scene.max_value() > 1.0 {
        scene.stack().mapv(|v| v / params.reflectance_scale)
    } else {
        scene.stack().clone()
    };

    let mut denoised = Array3::zeros((rows, cols, BAND_COUNT));
    for b in 0..BAND_COUNT {
        let band = scaled.index_axis(Axis(2), b);
        let filtered = median_filter(band, params.median_radius);
        for row in 0..rows {
            for col in 0..cols {
                denoised[(row, col, b)] = filtered[row * cols + col];
            }
        }
    }

    Scene::from_stack(denoised)
}

/// Median filter over a single band, returning row-major output.
///
/// Edge windows are clipped to the grid; NaN neighbors are excluded.
fn median_filter(band: ArrayView2<'_, f64>, radius: usize) -> Vec<f64> {
    let (rows, cols) = band.dim();
    let r = radius as isize;

    (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let mut values: Vec<f64> = Vec::with_capacity((2 * radius + 1).pow(2));

                for dr in -r..=r {
                    for dc in -r..=r {
                        let nr = row as isize + dr;
                        let nc = col as isize + dc;
                        if nr >= 0 && nc >= 0 && (nr as usize) < rows && (nc as usize) < cols {
                            let v = band[(nr as usize, nc as usize)];
                            if !v.is_nan() {
                                values.push(v);
                            }
                        }
                    }
                }

                if values.is_empty() {
                    continue;
                }

                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let mid = values.len() / 2;
                *out = if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                };
            }

            row_data
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_raw_counts_are_scaled() {
        let scene = Scene::filled(5, 5, [1000.0, 5000.0, 800.0, 1200.0]).unwrap();
        let result = preprocess_scene(&scene, PreprocessParams::default()).unwrap();

        let px = result.pixel(2, 2).unwrap();
        assert!((px[0] - 0.1).abs() < 1e-10, "Red should scale to 0.1, got {}", px[0]);
        assert!((px[1] - 0.5).abs() < 1e-10, "NIR should scale to 0.5, got {}", px[1]);
    }

    #[test]
    fn test_reflectances_pass_through() {
        let scene = Scene::filled(5, 5, [0.1, 0.5, 0.08, 0.12]).unwrap();
        let result = preprocess_scene(&scene, PreprocessParams::default()).unwrap();

        let px = result.pixel(2, 2).unwrap();
        assert!((px[1] - 0.5).abs() < 1e-10, "Values in [0,1] must not be rescaled");
    }

    #[test]
    fn test_median_removes_speckle() {
        let mut stack = Array3::from_elem((7, 7, 4), 0.2);
        // Single hot pixel in the NIR band
        stack[(3, 3, 1)] = 0.9;
        let scene = Scene::from_stack(stack).unwrap();

        let result = preprocess_scene(&scene, PreprocessParams::default()).unwrap();
        let px = result.pixel(3, 3).unwrap();
        assert!(
            (px[1] - 0.2).abs() < 1e-10,
            "Median filter should remove single-pixel speckle, got {}",
            px[1]
        );
    }

    #[test]
    fn test_bands_filtered_independently() {
        let mut stack = Array3::from_elem((7, 7, 4), 0.2);
        stack[(3, 3, 0)] = 0.9;
        let scene = Scene::from_stack(stack).unwrap();

        let result = preprocess_scene(&scene, PreprocessParams::default()).unwrap();
        let px = result.pixel(3, 3).unwrap();
        assert!((px[0] - 0.2).abs() < 1e-10, "Speckle in Red removed");
        assert!((px[1] - 0.2).abs() < 1e-10, "NIR unaffected by Red speckle");
    }

    #[test]
    fn test_algorithm_interface() {
        let scene = Scene::filled(5, 5, [1000.0, 5000.0, 800.0, 1200.0]).unwrap();
        let result = Preprocess.execute_default(scene).unwrap();
        let px = result.pixel(2, 2).unwrap();
        assert!((px[1] - 0.5).abs() < 1e-10, "Default params scale DN inputs");
    }

    #[test]
    fn test_zero_radius_rejected() {
        let scene = Scene::filled(5, 5, [0.1; 4]).unwrap();
        let params = PreprocessParams {
            median_radius: 0,
            ..Default::default()
        };
        assert!(preprocess_scene(&scene, params).is_err());
    }

    #[test]
    fn test_corner_window_clipped() {
        // Corner window has 4 in-bounds cells; median of uniform data is the value
        let scene = Scene::filled(5, 5, [0.3; 4]).unwrap();
        let result = preprocess_scene(&scene, PreprocessParams::default()).unwrap();
        let px = result.pixel(0, 0).unwrap();
        assert!((px[0] - 0.3).abs() < 1e-10, "Corner should survive clipping, got {}", px[0]);
    }
}
