//! Four-band spectral scene

use crate::error::{Error, Result};
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// Number of spectral bands in a scene
pub const BAND_COUNT: usize = 4;

/// Spectral bands of a scene, in storage order.
///
/// The order is fixed by the acquisition contract: Sentinel-2 B04, B08,
/// B02, B03.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Red,
    Nir,
    Blue,
    Green,
}

impl Band {
    /// Index of this band along the scene's band axis
    pub fn index(self) -> usize {
        match self {
            Band::Red => 0,
            Band::Nir => 1,
            Band::Blue => 2,
            Band::Green => 3,
        }
    }
}

/// A multi-band spectral scene stored as a `(rows, cols, band)` stack.
///
/// All bands share dimensions by construction. Values are reflectances,
/// either raw sensor counts or already scaled into [0, 1]; the
/// preprocessor normalizes whichever it receives.
#[derive(Debug, Clone)]
pub struct Scene {
    data: Array3<f64>,
}

impl Scene {
    /// Create a scene from a `(rows, cols, 4)` stack.
    ///
    /// Rejects empty rasters and stacks whose band axis is not exactly
    /// [`BAND_COUNT`].
    pub fn from_stack(data: Array3<f64>) -> Result<Self> {
        let (rows, cols, bands) = data.dim();
        if bands != BAND_COUNT {
            return Err(Error::InvalidInput(format!(
                "expected {} spectral bands, got {}",
                BAND_COUNT, bands
            )));
        }
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidInput(format!(
                "empty scene: {}x{} pixels",
                rows, cols
            )));
        }
        Ok(Self { data })
    }

    /// Create a scene from four band arrays in [Red, NIR, Blue, Green] order.
    ///
    /// All bands must share dimensions.
    pub fn from_bands(
        red: Array2<f64>,
        nir: Array2<f64>,
        blue: Array2<f64>,
        green: Array2<f64>,
    ) -> Result<Self> {
        let (rows, cols) = red.dim();
        for band in [&nir, &blue, &green] {
            let (br, bc) = band.dim();
            if (br, bc) != (rows, cols) {
                return Err(Error::ShapeMismatch {
                    er: rows,
                    ec: cols,
                    ar: br,
                    ac: bc,
                });
            }
        }

        let mut data = Array3::zeros((rows, cols, BAND_COUNT));
        for (i, band) in [red, nir, blue, green].into_iter().enumerate() {
            data.index_axis_mut(Axis(2), i).assign(&band);
        }
        Self::from_stack(data)
    }

    /// Create a scene with uniform per-band values, in storage order
    pub fn filled(rows: usize, cols: usize, values: [f64; BAND_COUNT]) -> Result<Self> {
        let mut data = Array3::zeros((rows, cols, BAND_COUNT));
        for (i, v) in values.into_iter().enumerate() {
            data.index_axis_mut(Axis(2), i).fill(v);
        }
        Self::from_stack(data)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Whether the scene has no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View of one spectral band
    pub fn band(&self, band: Band) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), band.index())
    }

    /// All band values at one pixel, in storage order
    pub fn pixel(&self, row: usize, col: usize) -> Result<[f64; BAND_COUNT]> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            });
        }
        Ok(unsafe { self.pixel_unchecked(row, col) })
    }

    /// All band values at one pixel without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn pixel_unchecked(&self, row: usize, col: usize) -> [f64; BAND_COUNT] {
        let mut values = [0.0; BAND_COUNT];
        for (b, value) in values.iter_mut().enumerate() {
            *value = unsafe { *self.data.uget((row, col, b)) };
        }
        values
    }

    /// Maximum finite value across all bands, NaN-skipping.
    /// Returns negative infinity for an all-NaN scene.
    pub fn max_value(&self) -> f64 {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Reference to the underlying stack
    pub fn stack(&self) -> &Array3<f64> {
        &self.data
    }

    /// Consume the scene and return the underlying stack
    pub fn into_stack(self) -> Array3<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_from_stack() {
        let scene = Scene::from_stack(Array3::zeros((5, 7, 4))).unwrap();
        assert_eq!(scene.shape(), (5, 7));
        assert_eq!(scene.len(), 35);
    }

    #[test]
    fn test_wrong_band_count_rejected() {
        assert!(Scene::from_stack(Array3::zeros((5, 5, 3))).is_err());
        assert!(Scene::from_stack(Array3::zeros((5, 5, 0))).is_err());
    }

    #[test]
    fn test_empty_scene_rejected() {
        assert!(Scene::from_stack(Array3::zeros((0, 5, 4))).is_err());
        assert!(Scene::from_stack(Array3::zeros((5, 0, 4))).is_err());
    }

    #[test]
    fn test_band_order() {
        let scene = Scene::filled(3, 3, [0.1, 0.5, 0.2, 0.3]).unwrap();
        assert_eq!(scene.band(Band::Red)[(1, 1)], 0.1);
        assert_eq!(scene.band(Band::Nir)[(1, 1)], 0.5);
        assert_eq!(scene.band(Band::Blue)[(1, 1)], 0.2);
        assert_eq!(scene.band(Band::Green)[(1, 1)], 0.3);
    }

    #[test]
    fn test_from_bands_shape_check() {
        let red = Array2::zeros((4, 4));
        let nir = Array2::zeros((4, 5));
        let blue = Array2::zeros((4, 4));
        let green = Array2::zeros((4, 4));
        assert!(Scene::from_bands(red, nir, blue, green).is_err());
    }

    #[test]
    fn test_pixel_access() {
        let scene = Scene::filled(3, 3, [0.1, 0.5, 0.2, 0.3]).unwrap();
        let px = scene.pixel(2, 2).unwrap();
        assert_eq!(px, [0.1, 0.5, 0.2, 0.3]);
        assert!(scene.pixel(3, 0).is_err());
    }

    #[test]
    fn test_max_value() {
        let mut stack = Array3::zeros((2, 2, 4));
        stack[(0, 0, 1)] = 4212.0;
        stack[(1, 1, 3)] = f64::NAN;
        let scene = Scene::from_stack(stack).unwrap();
        assert_eq!(scene.max_value(), 4212.0);
    }
}
