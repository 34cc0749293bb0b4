//! The straight-through measurement pipeline.

use morpho_measure::{VolumeSurface, estimate_volume};
use morpho_transform::{align_principal_axes, fit_ground_plane};
use morpho_types::{MetricsRecord, PointCloud};
use tracing::{debug, info, warn};

use crate::cleanup::clean_cloud;
use crate::config::MorphometryConfig;
use crate::error::{ScanError, ScanResult};
use crate::metrics::assemble_metrics;
use crate::preprocess::{crop_above_ground, sanitize_and_scale};
use crate::report::{Degradation, DegradationCause, MeasurementReport};

/// Measure one scan and return only the record.
///
/// See [`measure_scan_with_report`] for the stages and error policy.
///
/// # Errors
///
/// Same as [`measure_scan_with_report`].
pub fn measure_scan(
    raw: &PointCloud,
    surface: Option<&dyn VolumeSurface>,
    config: &MorphometryConfig,
) -> ScanResult<MetricsRecord> {
    measure_scan_with_report(raw, surface, config).map(|report| report.record)
}

/// Measure one scan and return the record with intermediate results.
///
/// Stages, in order:
/// 1. Drop non-finite points and apply `config.scale`.
/// 2. Optional cleanup (`config.cleanup`).
/// 3. RANSAC ground fit on the scaled cloud.
/// 4. Crop points more than 1 cm below the ground. A degenerate ground fit
///    crops against its `y = 0` fallback plane.
/// 5. Principal-axis alignment, canonicalized against the ground normal when
///    `config.canonicalize_axes` is set.
/// 6. Volume from `surface`, if one is given.
/// 7. Slab measurements, derived metrics and quality heuristics.
///
/// # Errors
///
/// - [`ScanError::InvalidConfig`] if `config` fails validation.
/// - [`ScanError::EmptyCloud`] if no point survives stage 1, 2 or 4.
/// - [`ScanError::Transform`] if alignment fails.
///
/// Any other problem degrades the affected field to `NaN` and is listed in
/// [`MeasurementReport::degradations`].
///
/// # Example
///
/// ```
/// use morpho_scan::{MorphometryConfig, measure_scan_with_report};
/// use morpho_types::PointCloud;
///
/// // Floor under a low box, in centimeters
/// let mut raw = PointCloud::new();
/// for i in 0..=60 {
///     for k in 0..=30 {
///         raw.push_coords(f64::from(i) * 5.0, 0.0, f64::from(k) * 5.0);
///         raw.push_coords(f64::from(i) * 5.0, 50.0, f64::from(k) * 5.0);
///     }
/// }
///
/// let config = MorphometryConfig::new().with_scale(0.01);
/// let report = measure_scan_with_report(&raw, None, &config).unwrap();
/// assert_eq!(report.raw_points, raw.len());
/// assert!((report.record.body_length_m - 3.0).abs() < 1e-6);
/// assert!(report.record.estimated_volume_m3.is_nan());
/// assert!(report.is_degraded("estimated_volume_m3"));
/// ```
pub fn measure_scan_with_report(
    raw: &PointCloud,
    surface: Option<&dyn VolumeSurface>,
    config: &MorphometryConfig,
) -> ScanResult<MeasurementReport> {
    config.validate()?;
    info!(points = raw.len(), scale = config.scale, "measuring scan");

    let mut cloud = sanitize_and_scale(raw, config.scale);
    if cloud.is_empty() {
        return Err(ScanError::EmptyCloud {
            stage: "sanitizing",
        });
    }

    if let Some(params) = &config.cleanup {
        cloud = clean_cloud(&cloud, params);
        if cloud.is_empty() {
            return Err(ScanError::EmptyCloud { stage: "cleanup" });
        }
    }

    let mut degradations = Vec::new();

    let ground = fit_ground_plane(&cloud, &config.ground_plane_config());
    if ground.is_degenerate() {
        warn!(
            points = cloud.len(),
            "ground fit degenerate, cropping against the default plane"
        );
        degradations.push(Degradation::new(
            "ground_plane_fit_rmse",
            DegradationCause::GroundFitDegenerate,
        ));
    } else {
        debug!(
            inliers = ground.inliers.len(),
            inlier_ratio = ground.inlier_ratio(cloud.len()),
            rmse = ground.rmse,
            "ground plane fitted"
        );
    }

    let retained = crop_above_ground(&cloud, &ground.plane);
    if retained.is_empty() {
        return Err(ScanError::EmptyCloud {
            stage: "ground crop",
        });
    }

    let mut frame = align_principal_axes(&retained)?;
    if config.canonicalize_axes {
        frame = frame.canonicalized(&retained, Some(&ground.plane.normal));
    }
    let aligned = frame.project(&retained);
    debug!(
        singular_values = ?frame.singular_values,
        "principal axes computed"
    );

    let estimated_volume_m3 = match surface {
        None => {
            debug!("no surface supplied, volume not estimated");
            degradations.push(Degradation::new(
                "estimated_volume_m3",
                DegradationCause::VolumeUnavailable,
            ));
            f64::NAN
        }
        Some(surface) => match estimate_volume(surface, config.surface_units, config.scale) {
            Ok(estimate) => estimate.volume_m3,
            Err(err) => {
                warn!(error = %err, "volume estimation failed");
                degradations.push(Degradation::new(
                    "estimated_volume_m3",
                    DegradationCause::VolumeFailed {
                        reason: err.to_string(),
                    },
                ));
                f64::NAN
            }
        },
    };

    let assembly = assemble_metrics(&aligned, &ground, estimated_volume_m3, config);
    degradations.extend(assembly.degradations);

    let record = assembly.record;
    info!(
        body_length_m = record.body_length_m,
        withers_height_m = record.withers_height_m,
        heart_girth_m = record.heart_girth_m,
        degraded = degradations.len(),
        "scan measured"
    );

    Ok(MeasurementReport {
        record,
        ground,
        frame,
        raw_points: raw.len(),
        retained_points: retained.len(),
        thoracic_points: assembly.thoracic_points,
        rump_points: assembly.rump_points,
        degradations,
    })
}
