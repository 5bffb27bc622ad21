//! Geographic projection of pixel-space detections
//!
//! Maps detection bounding boxes from pixel indices to WGS84 coordinates
//! given the extent the raster covers. Pixels are treated as cells with
//! footprints: the western/northern edges come from the minimum indices,
//! the eastern/southern edges from one past the maximum indices, so a
//! detection spanning the whole raster reproduces the extent exactly.

use canopy_core::{Error, GeoExtent, Result};
use serde::{Deserialize, Serialize};

use crate::change::Detection;

/// Geographic bounding box of a detection in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Geographic center of a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Project detections from pixel space to geographic coordinates.
///
/// Row 0 corresponds to the northern (max-latitude) edge of the raster,
/// so the row axis is inverted relative to latitude. The centroid is the
/// midpoint of the geographic bounding box on each axis.
///
/// Consumes the detections and returns new values with the geographic
/// fields set; pixel-space fields are untouched.
///
/// # Arguments
/// * `detections` - Detections with pixel bounding boxes
/// * `extent` - Geographic extent covered by the whole raster
/// * `raster_shape` - (rows, cols) of the raster the detections came from
pub fn project_detections(
    detections: Vec<Detection>,
    extent: &GeoExtent,
    raster_shape: (usize, usize),
) -> Result<Vec<Detection>> {
    extent.validate()?;
    let (rows, cols) = raster_shape;
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidInput(format!(
            "cannot project onto an empty raster: {}x{}",
            rows, cols
        )));
    }

    let lon_per_pixel = extent.lon_per_pixel(cols);
    let lat_per_pixel = extent.lat_per_pixel(rows);

    let projected = detections
        .into_iter()
        .map(|mut detection| {
            let bbox = detection.bounding_box;

            let geographic = GeoBoundingBox {
                min_lon: extent.min_lon + bbox.min_col as f64 * lon_per_pixel,
                max_lon: extent.min_lon + (bbox.max_col + 1) as f64 * lon_per_pixel,
                // Row axis is inverted: row 0 is the northern edge
                min_lat: extent.max_lat - (bbox.max_row + 1) as f64 * lat_per_pixel,
                max_lat: extent.max_lat - bbox.min_row as f64 * lat_per_pixel,
            };

            detection.centroid = Some(Centroid {
                latitude: (geographic.min_lat + geographic.max_lat) / 2.0,
                longitude: (geographic.min_lon + geographic.max_lon) / 2.0,
            });
            detection.geographic = Some(geographic);
            detection
        })
        .collect();

    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{PixelBoundingBox, Severity};
    use approx::assert_relative_eq;

    fn detection(min_row: usize, max_row: usize, min_col: usize, max_col: usize) -> Detection {
        Detection {
            id: 1,
            bounding_box: PixelBoundingBox {
                min_row,
                max_row,
                min_col,
                max_col,
            },
            area_pixels: (max_row - min_row + 1) * (max_col - min_col + 1),
            valid_pixels: None,
            confidence: 1.0,
            avg_change: -0.6,
            severity: Severity::Critical,
            cloud_cover_pct: None,
            data_quality: None,
            geographic: None,
            centroid: None,
        }
    }

    #[test]
    fn test_full_raster_round_trips_extent() {
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let projected =
            project_detections(vec![detection(0, 99, 0, 99)], &extent, (100, 100)).unwrap();

        let geo = projected[0].geographic.unwrap();
        assert_relative_eq!(geo.min_lon, 0.0, epsilon = 1e-12);
        assert_relative_eq!(geo.min_lat, 0.0, epsilon = 1e-12);
        assert_relative_eq!(geo.max_lon, 1.0, epsilon = 1e-12);
        assert_relative_eq!(geo.max_lat, 1.0, epsilon = 1e-12);

        let centroid = projected[0].centroid.unwrap();
        assert_relative_eq!(centroid.longitude, 0.5, epsilon = 1e-12);
        assert_relative_eq!(centroid.latitude, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_row_axis_inverted() {
        // Detection hugging the top rows maps to the northern edge
        let extent = GeoExtent::new(10.0, 40.0, 11.0, 41.0).unwrap();
        let projected =
            project_detections(vec![detection(0, 9, 0, 99)], &extent, (100, 100)).unwrap();

        let geo = projected[0].geographic.unwrap();
        assert_relative_eq!(geo.max_lat, 41.0, epsilon = 1e-12);
        assert_relative_eq!(geo.min_lat, 40.9, epsilon = 1e-12);
    }

    #[test]
    fn test_single_pixel_footprint() {
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let projected = project_detections(vec![detection(4, 4, 7, 7)], &extent, (10, 10)).unwrap();

        let geo = projected[0].geographic.unwrap();
        assert_relative_eq!(geo.min_lon, 0.7, epsilon = 1e-12);
        assert_relative_eq!(geo.max_lon, 0.8, epsilon = 1e-12);
        assert_relative_eq!(geo.min_lat, 0.5, epsilon = 1e-12);
        assert_relative_eq!(geo.max_lat, 0.6, epsilon = 1e-12);

        let centroid = projected[0].centroid.unwrap();
        assert_relative_eq!(centroid.longitude, 0.75, epsilon = 1e-12);
        assert_relative_eq!(centroid.latitude, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_extent_rejected() {
        let extent = GeoExtent {
            min_lon: 1.0,
            min_lat: 0.0,
            max_lon: 1.0,
            max_lat: 1.0,
        };
        let result = project_detections(vec![detection(0, 9, 0, 9)], &extent, (10, 10));
        assert!(matches!(result, Err(Error::InvalidExtent { .. })));
    }

    #[test]
    fn test_empty_raster_shape_rejected() {
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let result = project_detections(vec![], &extent, (0, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_pixel_fields_untouched() {
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let original = detection(2, 8, 3, 9);
        let projected = project_detections(vec![original.clone()], &extent, (10, 10)).unwrap();

        assert_eq!(projected[0].bounding_box, original.bounding_box);
        assert_eq!(projected[0].area_pixels, original.area_pixels);
        assert_eq!(projected[0].confidence, original.confidence);
    }
}
