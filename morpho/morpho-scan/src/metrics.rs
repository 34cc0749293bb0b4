//! Assembly of the measurement record from aligned coordinates.
//!
//! Every per-field problem degrades that field to `NaN` and leaves the rest
//! of the record intact.

use morpho_measure::{Slab, SlabSection, convex_hull_2d};
use morpho_transform::{AlignedCloud, GroundPlaneFit};
use morpho_types::{MetricsRecord, QualityReport};
use tracing::{debug, warn};

use crate::config::MorphometryConfig;
use crate::report::{Degradation, DegradationCause};

/// Divisor of the girth-tape weight formula `girth² · length / 11877`.
pub const WEIGHT_DIVISOR: f64 = 11877.0;

/// Floor applied to the body width when normalizing stance asymmetry.
pub const MIN_WIDTH: f64 = 1e-6;

const COVERAGE_GOOD: f64 = 80.0;
const COVERAGE_POOR: f64 = 50.0;
const NOISE_GOOD: f64 = 0.08;
const NOISE_POOR: f64 = 0.2;

/// The record plus what was learned while building it.
#[derive(Debug, Clone)]
pub struct MetricsAssembly {
    /// The assembled record.
    pub record: MetricsRecord,
    /// Points in the thoracic slab.
    pub thoracic_points: usize,
    /// Points in the rump slab.
    pub rump_points: usize,
    /// Fields that degraded while assembling.
    pub degradations: Vec<Degradation>,
}

/// Girth-tape weight estimate in kilograms.
///
/// `NaN` unless `girth` is finite and positive.
///
/// # Example
///
/// ```
/// use morpho_scan::weight_from_girth;
///
/// let weight = weight_from_girth(2.0, 1.5);
/// assert!((weight - 6.0 / 11877.0).abs() < 1e-15);
/// assert!(weight_from_girth(f64::NAN, 1.5).is_nan());
/// assert!(weight_from_girth(0.0, 1.5).is_nan());
/// ```
#[must_use]
pub fn weight_from_girth(girth: f64, length: f64) -> f64 {
    if girth.is_finite() && girth > 0.0 {
        girth * girth * length / WEIGHT_DIVISOR
    } else {
        f64::NAN
    }
}

/// Spread of the lateral coordinate among near-ground points, relative to width.
///
/// Distal points have an axis-2 coordinate at most
/// `min + distal_fraction · (max - min)`. The result is the population
/// standard deviation of their axis-1 coordinates divided by
/// `max(width, MIN_WIDTH)`. Returns `None` when there are no distal points.
#[must_use]
#[allow(clippy::cast_precision_loss)]
// Precision loss: point counts beyond 2^52 are unsupported
pub fn stance_asymmetry(aligned: &AlignedCloud, width: f64, distal_fraction: f64) -> Option<f64> {
    let (lo, hi) = aligned.range(2)?;
    let cutoff = distal_fraction.mul_add(hi - lo, lo);

    let lateral: Vec<f64> = aligned
        .points
        .iter()
        .filter(|p| p.z <= cutoff)
        .map(|p| p.y)
        .collect();
    if lateral.is_empty() {
        return None;
    }

    let n = lateral.len() as f64;
    let mean = lateral.iter().sum::<f64>() / n;
    let variance = lateral.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / width.abs().max(MIN_WIDTH))
}

/// Scan-quality heuristics.
///
/// Coverage is a density proxy: good above `coverage_point_threshold`
/// retained points, poor otherwise. Noise level is paired with coverage.
#[must_use]
pub fn quality_report(
    retained_points: usize,
    withers_height_m: f64,
    ground_plane_fit_rmse: f64,
    config: &MorphometryConfig,
) -> QualityReport {
    let coverage_pct = if retained_points > config.coverage_point_threshold {
        COVERAGE_GOOD
    } else {
        COVERAGE_POOR
    };
    let noise_level = if coverage_pct >= COVERAGE_GOOD {
        NOISE_GOOD
    } else {
        NOISE_POOR
    };

    let (lo, hi) = config.plausible_height_m;
    let scale_warning = !(lo..=hi).contains(&withers_height_m);
    if scale_warning {
        warn!(
            withers_height_m,
            lo, hi, "withers height outside plausible range, check scale"
        );
    }

    QualityReport {
        coverage_pct,
        noise_level,
        ground_plane_fit_rmse,
        scale_warning,
    }
}

/// Build the measurement record from an aligned cloud.
///
/// `estimated_volume_m3` comes from the volume stage and is passed through.
#[must_use]
pub fn assemble_metrics(
    aligned: &AlignedCloud,
    ground: &GroundPlaneFit,
    estimated_volume_m3: f64,
    config: &MorphometryConfig,
) -> MetricsAssembly {
    let mut degradations = Vec::new();
    let extents = aligned.extents();
    let required = config.min_slab_points;

    let thoracic = Slab::new(config.thoracic_fraction, config.slab_half_thickness)
        .extract(&aligned.points);
    let (heart_girth_m, chest_depth_m) = if thoracic.is_populated(required) {
        (thoracic_girth(&thoracic, &mut degradations), thoracic.depth())
    } else {
        warn!(
            points = thoracic.len(),
            required, "thoracic slab under-populated"
        );
        let cause = DegradationCause::SparseSlab {
            points: thoracic.len(),
            required,
        };
        degradations.push(Degradation::new("heart_girth_m", cause.clone()));
        degradations.push(Degradation::new("chest_depth_m", cause));
        (f64::NAN, f64::NAN)
    };

    let rump =
        Slab::new(config.rump_fraction, config.slab_half_thickness).extract(&aligned.points);
    let hip_width_m = if rump.is_populated(required) {
        rump.width()
    } else {
        warn!(points = rump.len(), required, "rump slab under-populated");
        degradations.push(Degradation::new(
            "hip_width_m",
            DegradationCause::SparseSlab {
                points: rump.len(),
                required,
            },
        ));
        f64::NAN
    };

    let weight_est_kg = weight_from_girth(heart_girth_m, extents.length);
    if weight_est_kg.is_nan() {
        // Inherit the girth's cause when it has one
        let cause = degradations
            .iter()
            .find(|d| d.field == "heart_girth_m")
            .map_or(DegradationCause::NonPositiveGirth, |d| d.cause.clone());
        degradations.push(Degradation::new("weight_est_kg", cause));
    }

    let stance_asymmetry_idx =
        stance_asymmetry(aligned, extents.width, config.distal_fraction).unwrap_or_else(|| {
            degradations.push(Degradation::new(
                "stance_asymmetry_idx",
                DegradationCause::NoDistalPoints,
            ));
            f64::NAN
        });

    debug!(
        thoracic = thoracic.len(),
        rump = rump.len(),
        heart_girth_m,
        hip_width_m,
        "slabs measured"
    );

    let record = MetricsRecord {
        withers_height_m: extents.height,
        body_length_m: extents.length,
        heart_girth_m,
        chest_depth_m,
        hip_width_m,
        rump_angle_deg: f64::NAN,
        estimated_volume_m3,
        stance_asymmetry_idx,
        weight_est_kg,
        quality: quality_report(aligned.len(), extents.height, ground.rmse, config),
    };

    MetricsAssembly {
        record,
        thoracic_points: thoracic.len(),
        rump_points: rump.len(),
        degradations,
    }
}

fn thoracic_girth(section: &SlabSection, degradations: &mut Vec<Degradation>) -> f64 {
    match convex_hull_2d(&section.lateral_profile()) {
        Ok(hull) => {
            debug!(vertices = hull.len(), perimeter = hull.perimeter, "thoracic hull");
            hull.perimeter
        }
        Err(err) => {
            warn!(error = %err, "thoracic hull failed");
            degradations.push(Degradation::new(
                "heart_girth_m",
                DegradationCause::HullFailed {
                    reason: err.to_string(),
                },
            ));
            f64::NAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use morpho_types::Point3;

    /// Rectangular tube along axis 0: `length` long, cross-section `width x depth`.
    fn tube(length: f64, width: f64, depth: f64, step: f64) -> AlignedCloud {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = |l: f64| (l / step).round() as u32;
        let (nx, ny, nz) = (count(length), count(width), count(depth));
        let mut points = Vec::new();
        for i in 0..=nx {
            let x = length * f64::from(i) / f64::from(nx);
            for j in 0..=ny {
                for k in 0..=nz {
                    if j == 0 || j == ny || k == 0 || k == nz {
                        points.push(Point3::new(
                            x,
                            width * f64::from(j) / f64::from(ny),
                            depth * f64::from(k) / f64::from(nz),
                        ));
                    }
                }
            }
        }
        AlignedCloud { points }
    }

    fn fitted_ground() -> GroundPlaneFit {
        GroundPlaneFit {
            rmse: 0.001,
            inliers: vec![0, 1, 2],
            ..GroundPlaneFit::degenerate()
        }
    }

    #[test]
    fn weight_requires_positive_girth() {
        assert!(weight_from_girth(-1.0, 2.0).is_nan());
        assert!(weight_from_girth(f64::INFINITY, 2.0).is_nan());
        assert_relative_eq!(weight_from_girth(1.8, 1.6), 1.8 * 1.8 * 1.6 / 11877.0);
    }

    #[test]
    fn stance_uses_population_std() {
        let aligned = AlignedCloud {
            points: vec![
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        };
        // Distal band is z <= 0.08: lateral values -1 and 1, std 1
        let index = stance_asymmetry(&aligned, 4.0, 0.08).unwrap_or(f64::NAN);
        assert_relative_eq!(index, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn stance_guards_zero_width() {
        let aligned = AlignedCloud {
            points: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1e-9, 0.0)],
        };
        let index = stance_asymmetry(&aligned, 0.0, 0.08).unwrap_or(f64::NAN);
        assert_relative_eq!(index, 0.5e-9 / 1e-6, epsilon = 1e-12);
    }

    #[test]
    fn stance_on_empty_cloud_is_none() {
        assert!(stance_asymmetry(&AlignedCloud::default(), 1.0, 0.08).is_none());
    }

    #[test]
    fn coverage_and_noise_pair() {
        let config = MorphometryConfig::default();
        let dense = quality_report(5001, 1.2, 0.01, &config);
        assert_relative_eq!(dense.coverage_pct, 80.0);
        assert_relative_eq!(dense.noise_level, 0.08);
        assert!(!dense.scale_warning);

        let sparse = quality_report(5000, 1.2, 0.01, &config);
        assert_relative_eq!(sparse.coverage_pct, 50.0);
        assert_relative_eq!(sparse.noise_level, 0.2);
    }

    #[test]
    fn scale_warning_outside_plausible_height() {
        let config = MorphometryConfig::default();
        assert!(quality_report(100, 2.5, 0.0, &config).scale_warning);
        assert!(quality_report(100, 0.5, 0.0, &config).scale_warning);
        assert!(!quality_report(100, 0.9, 0.0, &config).scale_warning);
        assert!(!quality_report(100, 1.9, 0.0, &config).scale_warning);
    }

    #[test]
    fn tube_measurements() {
        let aligned = tube(2.0, 1.0, 0.5, 0.025);
        let assembly = assemble_metrics(&aligned, &fitted_ground(), 1.0, &MorphometryConfig::default());
        let record = assembly.record;

        assert_relative_eq!(record.body_length_m, 2.0, epsilon = 1e-9);
        assert_relative_eq!(record.withers_height_m, 0.5, epsilon = 1e-9);
        assert_relative_eq!(record.heart_girth_m, 3.0, epsilon = 1e-9);
        assert_relative_eq!(record.chest_depth_m, 0.5, epsilon = 1e-9);
        assert_relative_eq!(record.hip_width_m, 1.0, epsilon = 1e-9);
        assert_relative_eq!(record.estimated_volume_m3, 1.0);
        assert_relative_eq!(record.weight_est_kg, 9.0 * 2.0 / 11877.0, epsilon = 1e-9);
        assert!(record.rump_angle_deg.is_nan());
        assert!(record.stance_asymmetry_idx.is_finite());
        assert_relative_eq!(record.quality.ground_plane_fit_rmse, 0.001);
        assert!(assembly.thoracic_points >= 50);
        assert!(assembly.degradations.is_empty());
    }

    #[test]
    fn sparse_slabs_degrade_only_their_fields() {
        let aligned = tube(2.0, 1.0, 0.5, 0.025);
        let config = MorphometryConfig::default().with_min_slab_points(100_000);
        let assembly = assemble_metrics(&aligned, &fitted_ground(), f64::NAN, &config);
        let record = assembly.record;

        assert!(record.heart_girth_m.is_nan());
        assert!(record.chest_depth_m.is_nan());
        assert!(record.hip_width_m.is_nan());
        assert!(record.weight_est_kg.is_nan());
        assert!(record.body_length_m.is_finite());
        assert!(record.withers_height_m.is_finite());

        let fields: Vec<&str> = assembly.degradations.iter().map(|d| d.field).collect();
        assert_eq!(
            fields,
            vec!["heart_girth_m", "chest_depth_m", "hip_width_m", "weight_est_kg"]
        );
        assert!(matches!(
            assembly.degradations[3].cause,
            DegradationCause::SparseSlab {
                required: 100_000,
                ..
            }
        ));
    }

    #[test]
    fn zero_perimeter_girth_is_non_positive() {
        // Every thoracic point shares one (y, z): the hull collapses to a point
        let mut points: Vec<Point3<f64>> = (0..=200)
            .map(|i| Point3::new(f64::from(i) * 0.01, 0.0, 0.0))
            .collect();
        points.push(Point3::new(1.0, 1.0, 1.0));
        let aligned = AlignedCloud { points };
        let config = MorphometryConfig::default().with_min_slab_points(1);
        let assembly = assemble_metrics(&aligned, &fitted_ground(), f64::NAN, &config);

        assert_relative_eq!(assembly.record.heart_girth_m, 0.0);
        assert!(assembly.record.weight_est_kg.is_nan());
        let weight_causes: Vec<_> = assembly
            .degradations
            .iter()
            .filter(|d| d.field == "weight_est_kg")
            .map(|d| &d.cause)
            .collect();
        assert_eq!(weight_causes, vec![&DegradationCause::NonPositiveGirth]);
    }

    #[test]
    fn tiny_slab_minimum_reports_hull_failure() {
        let aligned = AlignedCloud {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.4, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
        };
        let config = MorphometryConfig::default().with_min_slab_points(1);
        let assembly = assemble_metrics(&aligned, &fitted_ground(), f64::NAN, &config);
        assert!(assembly.record.heart_girth_m.is_nan());
        assert!(matches!(
            assembly.degradations[0].cause,
            DegradationCause::HullFailed { .. }
        ));
    }
}
