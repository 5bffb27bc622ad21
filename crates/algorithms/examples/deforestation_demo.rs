//! Deforestation analysis demo: synthetic two-date scene pair
//!
//! Builds an 80x80 synthetic area of interest:
//! - T0: fully vegetated, with a little per-pixel texture
//! - T1: two cleared patches (one large, one small) and a cloud bank
//!
//! Runs the cloud-aware pipeline and prints the quality assessments,
//! the analysis summary and every projected detection.
//!
//! Run:
//!   cargo run -p canopy-algorithms --example deforestation_demo

use canopy_algorithms::pipeline::{analyze_with_cloud_screening, AnalysisParams};
use canopy_core::raster::Scene;
use canopy_core::GeoExtent;
use ndarray::Array3;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const ROWS: usize = 80;
const COLS: usize = 80;

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("subscriber already set");

    let (t0, t1) = build_scenes();
    // Rondônia-ish corner of the Amazon
    let extent = GeoExtent::new(-61.5, -10.5, -61.1, -10.1).expect("valid extent");

    println!("Area of interest: {}x{} px over {:.1} km²", COLS, ROWS, extent.area_km2());

    let report = analyze_with_cloud_screening(&t0, &t1, &extent, &AnalysisParams::default())
        .expect("analysis failed");

    for (label, quality) in [
        ("T0", report.quality_t0.as_ref()),
        ("T1", report.quality_t1.as_ref()),
    ] {
        let q = quality.expect("cloud-aware run always assesses quality");
        println!(
            "\nQuality {}: cloud {:.1}%, saturation {:.1}%, score {:.1} ({})",
            label,
            q.cloud_coverage_pct,
            q.saturation_pct,
            q.overall_score,
            if q.suitable_for_analysis { "suitable" } else { "unsuitable" },
        );
    }

    let s = &report.summary;
    println!(
        "\nSummary: {} detections ({} high-confidence, {} critical), {:.2}% of valid area changed",
        s.total_detections, s.high_confidence_detections, s.critical_detections, s.change_percentage,
    );

    for d in &report.detections {
        let centroid = d.centroid.expect("projected detection");
        println!(
            "  #{}: {} px, confidence {:.2}, mean change {:+.3}, severity {}, centered at ({:.4}, {:.4})",
            d.id, d.area_pixels, d.confidence, d.avg_change, d.severity,
            centroid.latitude, centroid.longitude,
        );
    }
}

/// Synthetic scene pair with texture, two clearings and a cloud bank
fn build_scenes() -> (Scene, Scene) {
    let mut t0 = Array3::zeros((ROWS, COLS, 4));
    let mut t1 = Array3::zeros((ROWS, COLS, 4));

    for row in 0..ROWS {
        for col in 0..COLS {
            // Deterministic texture so the scenes are not perfectly flat
            let jitter = ((row * 31 + col * 17) % 10) as f64 * 0.002;

            let vegetation = [0.05 + jitter, 0.45 + jitter, 0.04 + jitter, 0.08 + jitter];
            let bare_soil = [0.25 + jitter, 0.28 + jitter, 0.20 + jitter, 0.22 + jitter];
            let cloud = [0.55, 0.56, 0.54, 0.55];

            let large = (15..45).contains(&row) && (10..45).contains(&col);
            let small = (55..70).contains(&row) && (55..75).contains(&col);
            let cloudy = row < 8 && col >= 30;

            let t1_values = if cloudy {
                cloud
            } else if large || small {
                bare_soil
            } else {
                vegetation
            };

            for b in 0..4 {
                t0[(row, col, b)] = vegetation[b];
                t1[(row, col, b)] = t1_values[b];
            }
        }
    }

    (
        Scene::from_stack(t0).expect("well-formed stack"),
        Scene::from_stack(t1).expect("well-formed stack"),
    )
}
