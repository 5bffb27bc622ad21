//! # Canopy Core
//!
//! Core types for the canopy vegetation-loss analysis library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `Scene`: Four-band spectral scene (Red, NIR, Blue, Green)
//! - `GeoExtent`: Geographic extent of an analyzed area
//! - Algorithm traits for consistent API
//! - The shared error taxonomy

pub mod error;
pub mod extent;
pub mod raster;

pub use error::{Error, Result};
pub use extent::GeoExtent;
pub use raster::{Band, Mask, Raster, RasterElement, Scene, BAND_COUNT};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::extent::GeoExtent;
    pub use crate::raster::{Band, Mask, Raster, RasterElement, Scene};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in canopy.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
