//! # Canopy Algorithms
//!
//! Deterministic image-to-detections pipeline for vegetation-loss
//! monitoring. Operates on in-memory multi-band scenes; acquisition,
//! transport and encoding belong to the calling layer.
//!
//! ## Stages
//!
//! - **preprocess**: reflectance normalization and per-band denoising
//! - **indices**: vegetation index derivation, with optional cloud masking
//! - **cloud**: cloud screening and per-scene quality assessment
//! - **morphology**: binary mask cleanup (erode/dilate/opening/closing)
//! - **change**: differencing, thresholding, region labeling and scoring
//! - **project**: pixel-space detections to geographic coordinates
//! - **pipeline**: end-to-end orchestration of the above

pub mod change;
pub mod cloud;
pub mod indices;
pub mod morphology;
pub mod pipeline;
pub mod preprocess;
pub mod project;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::change::{
        detect_changes, detect_changes_with_cloud_mask, ChangeDetectorParams, ChangeResult,
        Connectivity, DataQuality, Detection, Severity,
    };
    pub use crate::cloud::{assess_quality, detect_clouds, CloudParams, QualityAssessment};
    pub use crate::indices::{vegetation_index, vegetation_index_masked};
    pub use crate::morphology::{closing, dilate, erode, opening, StructuringElement};
    pub use crate::pipeline::{analyze, analyze_with_cloud_screening, AnalysisParams};
    pub use crate::preprocess::{preprocess_scene, PreprocessParams};
    pub use crate::project::project_detections;
    pub use canopy_core::prelude::*;
}
