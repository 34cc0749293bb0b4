//! End-to-end body morphometry from a scanned point cloud.
//!
//! This crate ties the transform and measure crates into one linear
//! pipeline:
//!
//! 1. **Preprocess**: drop invalid points, apply physical scale ([`sanitize_and_scale`])
//! 2. **Cleanup** (optional): voxel downsampling and radius outlier removal ([`clean_cloud`])
//! 3. **Ground**: RANSAC plane fit and crop ([`crop_above_ground`])
//! 4. **Align**: principal axes, canonicalized against the ground normal
//! 5. **Measure**: thoracic and rump slabs, hull perimeter, volume
//! 6. **Assemble**: derived metrics and quality heuristics ([`assemble_metrics`])
//!
//! # Error Policy
//!
//! Only input-level failures abort: invalid configuration, or a cloud that
//! is empty after filtering. Everything else degrades the affected field to
//! `NaN` and is recorded as a [`Degradation`].
//!
//! # Concurrency
//!
//! The pipeline is synchronous and owns nothing global. Independent scans
//! can be measured on independent threads. Output is bit-identical for
//! identical input and configuration.
//!
//! # Example
//!
//! ```
//! use morpho_scan::{MorphometryConfig, measure_scan};
//! use morpho_types::PointCloud;
//!
//! let mut raw = PointCloud::new();
//! for i in 0..=40 {
//!     for k in 0..=20 {
//!         raw.push_coords(f64::from(i) * 0.05, 0.0, f64::from(k) * 0.05);
//!         raw.push_coords(f64::from(i) * 0.05, 0.6, f64::from(k) * 0.05);
//!     }
//! }
//!
//! let record = measure_scan(&raw, None, &MorphometryConfig::default()).unwrap();
//! assert!((record.body_length_m - 2.0).abs() < 1e-6);
//! assert!(record.rump_angle_deg.is_nan());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cleanup;
mod config;
mod error;
mod metrics;
mod pipeline;
mod preprocess;
mod report;

pub use cleanup::{clean_cloud, remove_radius_outliers, voxel_downsample};
pub use config::{CleanupParams, MorphometryConfig};
pub use error::{ScanError, ScanResult};
pub use metrics::{
    MIN_WIDTH, MetricsAssembly, WEIGHT_DIVISOR, assemble_metrics, quality_report,
    stance_asymmetry, weight_from_girth,
};
pub use pipeline::{measure_scan, measure_scan_with_report};
pub use preprocess::{GROUND_TOLERANCE, crop_above_ground, sanitize_and_scale};
pub use report::{Degradation, DegradationCause, MeasurementReport};

// Re-export the surface types callers hand to the pipeline
pub use morpho_measure::{SurfaceMesh, SurfaceUnits, VolumeSurface};
