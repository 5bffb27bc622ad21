//! Change detection between two vegetation index rasters
//!
//! The detector thresholds the pixelwise index difference, cleans the
//! resulting mask morphologically, labels connected regions and scores
//! the survivors. A cloud-aware variant restricts all statistics to
//! pixels valid in both acquisitions.

use canopy_core::raster::{Mask, Raster};
use canopy_core::{Algorithm, Error, Result};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::label::{label_regions, Connectivity};
use crate::morphology::{closing, opening, StructuringElement};
use crate::project::{Centroid, GeoBoundingBox};

/// Region cloud percentage below which data quality is High
const REGION_CLOUD_HIGH: f64 = 20.0;

/// Region cloud percentage below which data quality is Medium
const REGION_CLOUD_MEDIUM: f64 = 50.0;

/// Parameters for change detection, fixed at construction
#[derive(Debug, Clone)]
pub struct ChangeDetectorParams {
    /// Index drop below which a pixel counts as changed (negative;
    /// more negative = stricter)
    pub change_threshold: f64,
    /// Minimum region size in pixels
    pub min_area: usize,
    /// Minimum confidence for a region to be reported, in [0, 1]
    pub confidence_threshold: f64,
    /// Adjacency rule for region grouping
    pub connectivity: Connectivity,
}

impl Default for ChangeDetectorParams {
    fn default() -> Self {
        Self {
            change_threshold: -0.3,
            min_area: 100,
            confidence_threshold: 0.6,
            connectivity: Connectivity::default(),
        }
    }
}

impl ChangeDetectorParams {
    fn validate(&self) -> Result<()> {
        if !(self.change_threshold < 0.0) {
            return Err(Error::InvalidParameter {
                name: "change_threshold",
                value: self.change_threshold.to_string(),
                reason: "change threshold must be negative".to_string(),
            });
        }
        if self.min_area == 0 {
            return Err(Error::InvalidParameter {
                name: "min_area",
                value: "0".to_string(),
                reason: "minimum region area must be at least 1 pixel".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidParameter {
                name: "confidence_threshold",
                value: self.confidence_threshold.to_string(),
                reason: "confidence threshold must be in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

/// Qualitative severity of a vegetation-loss region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity from a region's mean index change.
    ///
    /// Boundary values map to the stricter bucket: exactly -0.5 is
    /// Critical, -0.4 High, -0.3 Medium.
    pub fn from_avg_change(avg_change: f64) -> Self {
        if avg_change <= -0.5 {
            Severity::Critical
        } else if avg_change <= -0.4 {
            Severity::High
        } else if avg_change <= -0.3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// Qualitative data-quality tier for a detection, from the cloud
/// contamination of its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    fn from_cloud_pct(cloud_pct: f64) -> Self {
        if cloud_pct < REGION_CLOUD_HIGH {
            DataQuality::High
        } else if cloud_pct < REGION_CLOUD_MEDIUM {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }
}

/// Pixel-space bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBoundingBox {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

/// One spatially coherent vegetation-loss region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Label ordinal from region discovery; not stable across calls
    pub id: i32,
    /// Pixel-space bounding box
    pub bounding_box: PixelBoundingBox,
    /// Region size in pixels
    pub area_pixels: usize,
    /// Valid (cloud-free) pixels contributing to the score; cloud-aware
    /// path only
    pub valid_pixels: Option<usize>,
    /// Normalized magnitude of the mean index drop, capped at 1.0
    pub confidence: f64,
    /// Mean index change over the region (signed)
    pub avg_change: f64,
    /// Severity bucket derived from `avg_change`
    pub severity: Severity,
    /// Cloud contamination of the bounding box; cloud-aware path only
    pub cloud_cover_pct: Option<f64>,
    /// Data-quality tier from `cloud_cover_pct`; cloud-aware path only
    pub data_quality: Option<DataQuality>,
    /// Geographic bounding box; set by projection
    pub geographic: Option<GeoBoundingBox>,
    /// Geographic centroid; set by projection
    pub centroid: Option<Centroid>,
}

/// Result of one change-detection run
#[derive(Debug, Clone)]
pub struct ChangeResult {
    /// Surviving regions, sorted by confidence descending
    pub detections: Vec<Detection>,
    /// Cleaned change mask, `true` = changed pixel
    pub change_mask: Mask,
    /// Pixelwise index difference (T1 − T0), NaN where not computable
    pub difference: Raster<f64>,
    /// Set pixels in the cleaned change mask
    pub total_changed_pixels: usize,
    /// Changed pixels as a percentage of the denominator: total pixels
    /// for the plain path, valid pixels for the cloud-aware path
    pub change_percentage: f64,
    /// Jointly valid pixels; cloud-aware path only
    pub valid_pixels: Option<usize>,
    /// Whole-raster cloud coverage of T0; cloud-aware path only
    pub cloud_coverage_t0_pct: Option<f64>,
    /// Whole-raster cloud coverage of T1; cloud-aware path only
    pub cloud_coverage_t1_pct: Option<f64>,
}

/// Change detection algorithm (plain path)
#[derive(Debug, Clone, Default)]
pub struct ChangeDetect;

impl Algorithm for ChangeDetect {
    type Input = (Raster<f64>, Raster<f64>);
    type Output = ChangeResult;
    type Params = ChangeDetectorParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ChangeDetect"
    }

    fn description(&self) -> &'static str {
        "Threshold, clean and score vegetation index drops between two acquisitions"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        detect_changes(&input.0, &input.1, params)
    }
}

/// Detect vegetation-loss regions between two index rasters.
///
/// 1. `diff = t1 − t0` pixelwise
/// 2. Threshold: a pixel is changed when `diff < change_threshold`
/// 3. Morphological close then open (3×3) to merge adjacent fragments
///    and drop single-pixel noise
/// 4. Label connected regions under the configured adjacency rule
/// 5. Keep regions with `area ≥ min_area` whose confidence
///    `min(|mean diff| / |threshold|, 1.0)` reaches
///    `confidence_threshold`
/// 6. Sort by confidence descending (stable; ties keep discovery order)
///
/// # Arguments
/// * `index_t0` - Index raster at the earlier time
/// * `index_t1` - Index raster at the later time
/// * `params` - Detector configuration
pub fn detect_changes(
    index_t0: &Raster<f64>,
    index_t1: &Raster<f64>,
    params: ChangeDetectorParams,
) -> Result<ChangeResult> {
    params.validate()?;
    check_shapes(index_t0, index_t1)?;

    let (rows, cols) = index_t0.shape();

    let diff = difference(index_t0, index_t1, None)?;
    let raw_mask = Array2::from_shape_fn((rows, cols), |(r, c)| {
        diff[(r, c)] < params.change_threshold
    });
    let change_mask = clean_mask(&raw_mask)?;

    let (labels, region_count) = label_regions(&change_mask, params.connectivity);

    // Accumulate per-region statistics in one pass
    let mut stats = vec![RegionStats::new(); region_count + 1];
    for row in 0..rows {
        for col in 0..cols {
            let label = unsafe { labels.get_unchecked(row, col) };
            if label == 0 {
                continue;
            }
            stats[label as usize].push(row, col, diff[(row, col)]);
        }
    }

    let mut detections = Vec::new();
    for (label, region) in stats.iter().enumerate().skip(1) {
        if region.area < params.min_area {
            continue;
        }

        let avg_change = region.sum / region.area as f64;
        let confidence = (avg_change.abs() / params.change_threshold.abs()).min(1.0);
        if confidence < params.confidence_threshold {
            continue;
        }

        detections.push(Detection {
            id: label as i32,
            bounding_box: region.bounding_box(),
            area_pixels: region.area,
            valid_pixels: None,
            confidence,
            avg_change,
            severity: Severity::from_avg_change(avg_change),
            cloud_cover_pct: None,
            data_quality: None,
            geographic: None,
            centroid: None,
        });
    }

    sort_by_confidence(&mut detections);

    let total_changed_pixels = change_mask.iter().filter(|&&v| v).count();
    let total = rows * cols;
    let change_percentage = if total == 0 {
        0.0
    } else {
        total_changed_pixels as f64 / total as f64 * 100.0
    };

    Ok(ChangeResult {
        detections,
        change_mask,
        difference: diff_raster(diff),
        total_changed_pixels,
        change_percentage,
        valid_pixels: None,
        cloud_coverage_t0_pct: None,
        cloud_coverage_t1_pct: None,
    })
}

/// Cloud-aware change detection.
///
/// Restricts every statistic to pixels valid in both acquisitions: a
/// pixel is valid when neither validity mask flags it and neither index
/// is NaN. The difference is NaN outside the valid set, region averages
/// use only valid pixels, and the change percentage is computed against
/// the valid pixel count. A region without any valid pixel is discarded
/// entirely.
///
/// Each surviving detection additionally reports its valid pixel count,
/// the cloud contamination of its bounding box (union of both masks) and
/// a qualitative data-quality tier.
///
/// # Arguments
/// * `index_t0`, `index_t1` - Index rasters
/// * `mask_t0`, `mask_t1` - Validity masks, `true` = invalid pixel
/// * `params` - Detector configuration
pub fn detect_changes_with_cloud_mask(
    index_t0: &Raster<f64>,
    index_t1: &Raster<f64>,
    mask_t0: &Mask,
    mask_t1: &Mask,
    params: ChangeDetectorParams,
) -> Result<ChangeResult> {
    params.validate()?;
    check_shapes(index_t0, index_t1)?;
    let (rows, cols) = index_t0.shape();
    for mask in [mask_t0, mask_t1] {
        let (mr, mc) = mask.dim();
        if (mr, mc) != (rows, cols) {
            return Err(Error::ShapeMismatch {
                er: rows,
                ec: cols,
                ar: mr,
                ac: mc,
            });
        }
    }

    let valid = Array2::from_shape_fn((rows, cols), |(r, c)| {
        !mask_t0[(r, c)]
            && !mask_t1[(r, c)]
            && !unsafe { index_t0.get_unchecked(r, c) }.is_nan()
            && !unsafe { index_t1.get_unchecked(r, c) }.is_nan()
    });

    let diff = difference(index_t0, index_t1, Some(&valid))?;
    let raw_mask = Array2::from_shape_fn((rows, cols), |(r, c)| {
        valid[(r, c)] && diff[(r, c)] < params.change_threshold
    });
    let change_mask = clean_mask(&raw_mask)?;

    let (labels, region_count) = label_regions(&change_mask, params.connectivity);

    let mut stats = vec![RegionStats::new(); region_count + 1];
    for row in 0..rows {
        for col in 0..cols {
            let label = unsafe { labels.get_unchecked(row, col) };
            if label == 0 {
                continue;
            }
            let region = &mut stats[label as usize];
            if valid[(row, col)] {
                region.push(row, col, diff[(row, col)]);
            } else {
                region.push_invalid(row, col);
            }
        }
    }

    let mut detections = Vec::new();
    for (label, region) in stats.iter().enumerate().skip(1) {
        if region.area < params.min_area {
            continue;
        }
        // Morphological cleanup can absorb invalid pixels into a region;
        // a region with no valid pixel at all has nothing to score.
        if region.valid == 0 {
            continue;
        }

        let avg_change = region.sum / region.valid as f64;
        let confidence = (avg_change.abs() / params.change_threshold.abs()).min(1.0);
        if confidence < params.confidence_threshold {
            continue;
        }

        let bounding_box = region.bounding_box();
        let cloud_cover_pct = bbox_cloud_pct(&bounding_box, mask_t0, mask_t1);

        detections.push(Detection {
            id: label as i32,
            bounding_box,
            area_pixels: region.area,
            valid_pixels: Some(region.valid),
            confidence,
            avg_change,
            severity: Severity::from_avg_change(avg_change),
            cloud_cover_pct: Some(cloud_cover_pct),
            data_quality: Some(DataQuality::from_cloud_pct(cloud_cover_pct)),
            geographic: None,
            centroid: None,
        });
    }

    sort_by_confidence(&mut detections);

    let total = (rows * cols) as f64;
    let valid_count = valid.iter().filter(|&&v| v).count();
    let total_changed_pixels = change_mask.iter().filter(|&&v| v).count();
    // All-invalid input yields an empty result, not a division by zero
    let change_percentage = if valid_count == 0 {
        0.0
    } else {
        total_changed_pixels as f64 / valid_count as f64 * 100.0
    };

    Ok(ChangeResult {
        detections,
        change_mask,
        difference: diff_raster(diff),
        total_changed_pixels,
        change_percentage,
        valid_pixels: Some(valid_count),
        cloud_coverage_t0_pct: Some(
            mask_t0.iter().filter(|&&v| v).count() as f64 / total * 100.0,
        ),
        cloud_coverage_t1_pct: Some(
            mask_t1.iter().filter(|&&v| v).count() as f64 / total * 100.0,
        ),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-region accumulator: bounding box over all pixels, change sum over
/// scored pixels only.
#[derive(Debug, Clone)]
struct RegionStats {
    area: usize,
    valid: usize,
    sum: f64,
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
}

impl RegionStats {
    fn new() -> Self {
        Self {
            area: 0,
            valid: 0,
            sum: 0.0,
            min_row: usize::MAX,
            max_row: 0,
            min_col: usize::MAX,
            max_col: 0,
        }
    }

    fn push(&mut self, row: usize, col: usize, change: f64) {
        self.extend_bbox(row, col);
        self.area += 1;
        self.valid += 1;
        self.sum += change;
    }

    fn push_invalid(&mut self, row: usize, col: usize) {
        self.extend_bbox(row, col);
        self.area += 1;
    }

    fn extend_bbox(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
    }

    fn bounding_box(&self) -> PixelBoundingBox {
        PixelBoundingBox {
            min_row: self.min_row,
            max_row: self.max_row,
            min_col: self.min_col,
            max_col: self.max_col,
        }
    }
}

fn check_shapes(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        let (er, ec) = a.shape();
        return Err(Error::ShapeMismatch {
            er,
            ec,
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

/// Pixelwise T1 − T0; NaN outside the valid set when one is given
fn difference(t0: &Raster<f64>, t1: &Raster<f64>, valid: Option<&Mask>) -> Result<Array2<f64>> {
    let (rows, cols) = t0.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                if let Some(mask) = valid {
                    if !mask[(row, col)] {
                        continue;
                    }
                }
                let a = unsafe { t0.get_unchecked(row, col) };
                let b = unsafe { t1.get_unchecked(row, col) };
                *out = b - a;
            }
            row_data
        })
        .collect();

    // Row-parallel production preserves row-major order
    Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn diff_raster(diff: Array2<f64>) -> Raster<f64> {
    let mut raster = Raster::from_array(diff);
    raster.set_nodata(Some(f64::NAN));
    raster
}

/// Close then open with the 3×3 square element
fn clean_mask(mask: &Mask) -> Result<Mask> {
    let element = StructuringElement::Square(1);
    opening(&closing(mask, &element)?, &element)
}

/// Stable sort by confidence descending; ties keep discovery order
fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Cloud contamination of a bounding box: union of both masks
fn bbox_cloud_pct(bbox: &PixelBoundingBox, mask_t0: &Mask, mask_t1: &Mask) -> f64 {
    let mut cloudy = 0usize;
    let mut total = 0usize;
    for row in bbox.min_row..=bbox.max_row {
        for col in bbox.min_col..=bbox.max_col {
            total += 1;
            if mask_t0[(row, col)] || mask_t1[(row, col)] {
                cloudy += 1;
            }
        }
    }
    cloudy as f64 / total as f64 * 100.0
}
