//! Geographic extent of an analyzed area

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean kilometers per degree at the equator, used for rough area estimates.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Axis-aligned geographic bounding extent in WGS84 degrees.
///
/// Covers the whole analyzed raster: column 0 maps to `min_lon` and row 0
/// to `max_lat` (rasters are stored north-up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExtent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoExtent {
    /// Create a new extent. Fails when a min bound is not strictly below
    /// its max bound or any bound is non-finite.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let extent = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        extent.validate()?;
        Ok(extent)
    }

    /// Check the extent invariant: `min < max` on both axes, finite bounds.
    pub fn validate(&self) -> Result<()> {
        let finite = self.min_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lon.is_finite()
            && self.max_lat.is_finite();
        if !finite || self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(Error::InvalidExtent {
                min_lon: self.min_lon,
                min_lat: self.min_lat,
                max_lon: self.max_lon,
                max_lat: self.max_lat,
            });
        }
        Ok(())
    }

    /// Width of the extent in degrees of longitude
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the extent in degrees of latitude
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Degrees of longitude covered by one pixel column
    pub fn lon_per_pixel(&self, cols: usize) -> f64 {
        self.lon_span() / cols as f64
    }

    /// Degrees of latitude covered by one pixel row
    pub fn lat_per_pixel(&self, rows: usize) -> f64 {
        self.lat_span() / rows as f64
    }

    /// Rough area of the extent in square kilometers (equatorial approximation)
    pub fn area_km2(&self) -> f64 {
        (self.lon_span() * self.lat_span()).abs() * KM_PER_DEGREE * KM_PER_DEGREE
    }
}
