//! End-to-end analysis pipeline
//!
//! Wires the stages the way a serving layer consumes them: preprocess
//! both acquisitions, derive the vegetation index (optionally with cloud
//! screening), detect change regions, and project them to geographic
//! coordinates. Each invocation is independent; callers may run any
//! number of analyses concurrently as long as they do not share scene
//! buffers.

use canopy_core::raster::Scene;
use canopy_core::{Error, GeoExtent, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::change::{
    detect_changes, detect_changes_with_cloud_mask, ChangeDetectorParams, ChangeResult, Detection,
    Severity,
};
use crate::cloud::{assess_quality, CloudParams, QualityAssessment};
use crate::indices::{vegetation_index, vegetation_index_masked};
use crate::preprocess::{preprocess_scene, PreprocessParams};
use crate::project::project_detections;

/// Confidence above which a detection counts as high-confidence in the
/// analysis summary
pub const HIGH_CONFIDENCE_FLOOR: f64 = 0.8;

/// Parameters for a full analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisParams {
    pub preprocess: PreprocessParams,
    pub cloud: CloudParams,
    pub detector: ChangeDetectorParams,
}

/// Aggregate statistics for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_detections: usize,
    /// Detections with confidence above [`HIGH_CONFIDENCE_FLOOR`]
    pub high_confidence_detections: usize,
    pub critical_detections: usize,
    pub total_changed_pixels: usize,
    pub change_percentage: f64,
    /// Rough analyzed area from the extent (equatorial approximation)
    pub area_analyzed_km2: f64,
    /// Jointly valid pixels; cloud-aware runs only
    pub valid_pixels: Option<usize>,
    /// Whole-scene cloud coverage; cloud-aware runs only
    pub cloud_coverage_t0_pct: Option<f64>,
    pub cloud_coverage_t1_pct: Option<f64>,
}

/// Result of one end-to-end analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Projected detections, sorted by confidence descending
    pub detections: Vec<Detection>,
    pub summary: AnalysisSummary,
    /// Per-scene quality; cloud-aware runs only
    pub quality_t0: Option<QualityAssessment>,
    pub quality_t1: Option<QualityAssessment>,
}

/// Run the plain analysis pipeline on two co-registered scenes.
///
/// preprocess → vegetation index → change detection → projection.
///
/// # Arguments
/// * `scene_t0` - Earlier acquisition
/// * `scene_t1` - Later acquisition, same pixel grid
/// * `extent` - Geographic extent both scenes cover
/// * `params` - Stage parameters
pub fn analyze(
    scene_t0: &Scene,
    scene_t1: &Scene,
    extent: &GeoExtent,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    check_scene_shapes(scene_t0, scene_t1)?;
    extent.validate()?;
    let shape = scene_t0.shape();
    info!(rows = shape.0, cols = shape.1, "starting analysis");

    let t0 = preprocess_scene(scene_t0, params.preprocess.clone())?;
    let t1 = preprocess_scene(scene_t1, params.preprocess.clone())?;
    debug!("scenes preprocessed");

    let index_t0 = vegetation_index(&t0)?;
    let index_t1 = vegetation_index(&t1)?;
    debug!("vegetation indices computed");

    let change = detect_changes(&index_t0, &index_t1, params.detector.clone())?;
    debug!(
        regions = change.detections.len(),
        changed_pixels = change.total_changed_pixels,
        "change detection finished"
    );

    let detections = project_detections(change.detections.clone(), extent, shape)?;
    let summary = summarize(&change, &detections, extent);
    info!(detections = summary.total_detections, "analysis finished");

    Ok(AnalysisReport {
        detections,
        summary,
        quality_t0: None,
        quality_t1: None,
    })
}

/// Run the cloud-aware analysis pipeline on two co-registered scenes.
///
/// Like [`analyze`], but screens clouds per scene, restricts the change
/// statistics to jointly valid pixels, and attaches a per-scene quality
/// assessment to the report.
pub fn analyze_with_cloud_screening(
    scene_t0: &Scene,
    scene_t1: &Scene,
    extent: &GeoExtent,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    check_scene_shapes(scene_t0, scene_t1)?;
    extent.validate()?;
    let shape = scene_t0.shape();
    info!(rows = shape.0, cols = shape.1, "starting cloud-aware analysis");

    let t0 = preprocess_scene(scene_t0, params.preprocess.clone())?;
    let t1 = preprocess_scene(scene_t1, params.preprocess.clone())?;
    debug!("scenes preprocessed");

    let (index_t0, mask_t0) = vegetation_index_masked(&t0, &params.cloud)?;
    let (index_t1, mask_t1) = vegetation_index_masked(&t1, &params.cloud)?;
    debug!("vegetation indices and cloud masks computed");

    let quality_t0 = assess_quality(&t0, &mask_t0)?;
    let quality_t1 = assess_quality(&t1, &mask_t1)?;
    debug!(
        t0_score = quality_t0.overall_score,
        t1_score = quality_t1.overall_score,
        "scene quality assessed"
    );

    let change = detect_changes_with_cloud_mask(
        &index_t0,
        &index_t1,
        &mask_t0,
        &mask_t1,
        params.detector.clone(),
    )?;
    debug!(
        regions = change.detections.len(),
        changed_pixels = change.total_changed_pixels,
        "change detection finished"
    );

    let detections = project_detections(change.detections.clone(), extent, shape)?;
    let summary = summarize(&change, &detections, extent);
    info!(detections = summary.total_detections, "cloud-aware analysis finished");

    Ok(AnalysisReport {
        detections,
        summary,
        quality_t0: Some(quality_t0),
        quality_t1: Some(quality_t1),
    })
}

fn check_scene_shapes(t0: &Scene, t1: &Scene) -> Result<()> {
    if t0.shape() != t1.shape() {
        let (er, ec) = t0.shape();
        let (ar, ac) = t1.shape();
        return Err(Error::ShapeMismatch { er, ec, ar, ac });
    }
    Ok(())
}

fn summarize(
    change: &ChangeResult,
    detections: &[Detection],
    extent: &GeoExtent,
) -> AnalysisSummary {
    AnalysisSummary {
        total_detections: detections.len(),
        high_confidence_detections: detections
            .iter()
            .filter(|d| d.confidence > HIGH_CONFIDENCE_FLOOR)
            .count(),
        critical_detections: detections
            .iter()
            .filter(|d| d.severity == Severity::Critical)
            .count(),
        total_changed_pixels: change.total_changed_pixels,
        change_percentage: change.change_percentage,
        area_analyzed_km2: extent.area_km2(),
        valid_pixels: change.valid_pixels,
        cloud_coverage_t0_pct: change.cloud_coverage_t0_pct,
        cloud_coverage_t1_pct: change.cloud_coverage_t1_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Vegetated scene with a cleared rectangle in T1
    fn scene_pair(rows: usize, cols: usize, cleared: (usize, usize, usize, usize)) -> (Scene, Scene) {
        let vegetation = [0.05, 0.45, 0.04, 0.08];
        let bare_soil = [0.25, 0.28, 0.2, 0.22];

        let t0 = Scene::filled(rows, cols, vegetation).unwrap();

        let mut stack = Array3::zeros((rows, cols, 4));
        let (r0, r1, c0, c1) = cleared;
        for row in 0..rows {
            for col in 0..cols {
                let values = if row >= r0 && row <= r1 && col >= c0 && col <= c1 {
                    bare_soil
                } else {
                    vegetation
                };
                for (b, v) in values.iter().enumerate() {
                    stack[(row, col, b)] = *v;
                }
            }
        }
        (t0, Scene::from_stack(stack).unwrap())
    }

    #[test]
    fn test_analyze_finds_cleared_rectangle() {
        let (t0, t1) = scene_pair(60, 60, (10, 29, 15, 39));
        let extent = GeoExtent::new(-61.0, -10.0, -60.4, -9.4).unwrap();

        let report = analyze(&t0, &t1, &extent, &AnalysisParams::default()).unwrap();

        assert_eq!(report.summary.total_detections, 1);
        let d = &report.detections[0];
        assert_eq!(d.bounding_box.min_row, 10);
        assert_eq!(d.bounding_box.max_row, 29);
        assert_eq!(d.bounding_box.min_col, 15);
        assert_eq!(d.bounding_box.max_col, 39);
        assert!(d.geographic.is_some(), "Pipeline must project detections");
        assert!(d.centroid.is_some());
        assert!(report.quality_t0.is_none(), "Plain path carries no quality block");
    }

    #[test]
    fn test_analyze_cloud_aware_attaches_quality() {
        let (t0, t1) = scene_pair(60, 60, (10, 29, 15, 39));
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();

        let report =
            analyze_with_cloud_screening(&t0, &t1, &extent, &AnalysisParams::default()).unwrap();

        assert_eq!(report.summary.total_detections, 1);
        let q0 = report.quality_t0.as_ref().unwrap();
        assert!(q0.suitable_for_analysis, "Cloud-free synthetic scene is suitable");
        assert_eq!(report.summary.valid_pixels, Some(3600));
        assert_eq!(report.summary.cloud_coverage_t0_pct, Some(0.0));
    }

    #[test]
    fn test_analyze_rejects_mismatched_scenes() {
        let (t0, _) = scene_pair(30, 30, (5, 10, 5, 10));
        let (t1, _) = scene_pair(30, 40, (5, 10, 5, 10));
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();

        assert!(matches!(
            analyze(&t0, &t1, &extent, &AnalysisParams::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_analyze_rejects_bad_extent() {
        let (t0, t1) = scene_pair(30, 30, (5, 10, 5, 10));
        let extent = GeoExtent {
            min_lon: 1.0,
            min_lat: 0.0,
            max_lon: 0.0,
            max_lat: 1.0,
        };

        assert!(matches!(
            analyze(&t0, &t1, &extent, &AnalysisParams::default()),
            Err(Error::InvalidExtent { .. })
        ));
    }

    #[test]
    fn test_summary_counts() {
        let (t0, t1) = scene_pair(60, 60, (10, 29, 15, 39));
        let extent = GeoExtent::new(0.0, 0.0, 1.0, 1.0).unwrap();

        let report = analyze(&t0, &t1, &extent, &AnalysisParams::default()).unwrap();

        assert_eq!(report.summary.total_detections, 1);
        assert_eq!(report.summary.high_confidence_detections, 1);
        assert_eq!(report.summary.critical_detections, 1);
        assert!((report.summary.area_analyzed_km2 - 111.32 * 111.32).abs() < 1e-6);
        assert!(report.summary.change_percentage > 0.0);
    }
}
