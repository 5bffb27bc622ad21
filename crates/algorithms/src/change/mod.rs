//! Vegetation change detection
//!
//! Differences two vegetation index rasters, isolates spatially coherent
//! regions of loss, and scores each region's confidence and severity.

mod detect;
mod label;

pub use detect::{
    detect_changes, detect_changes_with_cloud_mask, ChangeDetect, ChangeDetectorParams,
    ChangeResult, DataQuality, Detection, PixelBoundingBox, Severity,
};
pub use label::{label_regions, Connectivity};
