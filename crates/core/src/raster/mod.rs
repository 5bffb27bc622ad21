//! Raster data structures and operations

mod element;
mod grid;
mod scene;

pub use element::RasterElement;
pub use grid::Raster;
pub use scene::{Band, Scene, BAND_COUNT};

/// Boolean pixel mask, `true` marks a flagged pixel.
///
/// The meaning of a flag depends on context: cloud-obscured for validity
/// masks, below-threshold change for change masks.
pub type Mask = ndarray::Array2<bool>;
