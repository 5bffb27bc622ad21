//! Binary mathematical morphology for pixel masks
//!
//! Classical morphological operations used to clean up thresholded masks:
//! - **Erosion**: keeps a pixel only if its whole neighborhood is set
//! - **Dilation**: sets a pixel if any neighbor is set
//! - **Opening**: erosion then dilation (removes isolated set pixels)
//! - **Closing**: dilation then erosion (fills small gaps)
//!
//! Kernels are clipped at the raster edges: out-of-bounds positions are
//! ignored rather than treated as set or unset, so border pixels remain
//! eligible for both operations.

mod closing;
mod dilate;
mod element;
mod erode;
mod opening;

pub use closing::closing;
pub use dilate::dilate;
pub use element::StructuringElement;
pub use erode::erode;
pub use opening::opening;
