//! RANSAC ground-plane estimation.
//!
//! The ground is a minority-consistent planar surface surrounded by the
//! (non-planar) bulk of the scanned body. Consensus maximization over
//! minimal three-point samples isolates it.

use morpho_types::PointCloud;
use nalgebra::Point3;
use tracing::{debug, warn};

use crate::plane::Plane;
use crate::sampler::{DistinctSampler, SeededSampler};

/// Configuration for ground-plane fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundPlaneConfig {
    /// Number of minimal samples to evaluate.
    pub max_iterations: usize,
    /// Distance threshold for classifying inliers (inclusive).
    pub inlier_threshold: f64,
    /// Seed for the sampling generator.
    pub seed: u64,
    /// Clouds with fewer points get the fallback plane without sampling.
    pub min_points: usize,
    /// Orient the fitted normal toward the bulk of the cloud.
    pub orient_toward_bulk: bool,
}

impl Default for GroundPlaneConfig {
    fn default() -> Self {
        Self {
            max_iterations: 800,
            inlier_threshold: 0.02,
            seed: 42,
            min_points: 50,
            orient_toward_bulk: true,
        }
    }
}

impl GroundPlaneConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the inlier distance threshold.
    #[must_use]
    pub const fn with_inlier_threshold(mut self, threshold: f64) -> Self {
        self.inlier_threshold = threshold;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the minimum point count below which no fit is attempted.
    #[must_use]
    pub const fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Enable or disable orienting the normal toward the bulk of the cloud.
    #[must_use]
    pub const fn with_orient_toward_bulk(mut self, orient: bool) -> Self {
        self.orient_toward_bulk = orient;
        self
    }
}

/// Result of ground-plane fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundPlaneFit {
    /// The winning plane, or [`Plane::y_up`] for a degenerate result.
    pub plane: Plane,
    /// Indices of the inlier points of the winning plane, ascending.
    pub inliers: Vec<usize>,
    /// Root-mean-square signed distance over the inliers; `NaN` when degenerate.
    pub rmse: f64,
    /// Number of samples drawn.
    pub iterations: usize,
    /// Number of samples that produced a non-degenerate candidate.
    pub valid_candidates: usize,
}

impl GroundPlaneFit {
    /// The insufficient-data result: `+Y` plane through the origin, no inliers.
    #[must_use]
    pub fn degenerate() -> Self {
        Self {
            plane: Plane::y_up(),
            inliers: Vec::new(),
            rmse: f64::NAN,
            iterations: 0,
            valid_candidates: 0,
        }
    }

    /// Returns true if no plane was actually fitted.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.inliers.is_empty()
    }

    /// Fraction of `total_points` classified as inliers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    // Precision loss: point counts beyond 2^52 are unsupported
    pub fn inlier_ratio(&self, total_points: usize) -> f64 {
        if total_points == 0 {
            return 0.0;
        }
        self.inliers.len() as f64 / total_points as f64
    }
}

/// Fit the ground plane with the configured seed.
///
/// Clouds with fewer than `config.min_points` points, or in which every
/// sample is degenerate, yield [`GroundPlaneFit::degenerate`]. This is an
/// insufficient-data outcome, not an error.
///
/// # Example
///
/// ```
/// use morpho_transform::{GroundPlaneConfig, fit_ground_plane};
/// use morpho_types::PointCloud;
///
/// let tiny = PointCloud::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
/// let fit = fit_ground_plane(&tiny, &GroundPlaneConfig::default());
/// assert!(fit.is_degenerate());
/// assert!(fit.rmse.is_nan());
/// assert_eq!(fit.plane.normal.y, 1.0);
/// ```
#[must_use]
pub fn fit_ground_plane(cloud: &PointCloud, config: &GroundPlaneConfig) -> GroundPlaneFit {
    let mut sampler = SeededSampler::seeded(config.seed);
    fit_ground_plane_with(cloud, config, &mut sampler)
}

/// Fit the ground plane drawing samples from `sampler`.
///
/// `config.seed` is ignored; the sampler carries its own state.
///
/// The candidate with the strictly greatest inlier count wins; on ties the
/// earlier candidate is kept. Points must be finite.
#[must_use]
pub fn fit_ground_plane_with<S: DistinctSampler + ?Sized>(
    cloud: &PointCloud,
    config: &GroundPlaneConfig,
    sampler: &mut S,
) -> GroundPlaneFit {
    let points = &cloud.points;
    let n = points.len();

    if n < config.min_points || n < 3 {
        debug!(points = n, required = config.min_points, "Too few points for ground fit");
        return GroundPlaneFit::degenerate();
    }

    let mut best: Option<(Plane, usize)> = None;
    let mut iterations = 0;
    let mut valid_candidates = 0;

    for _ in 0..config.max_iterations {
        let Some([i0, i1, i2]) = sampler.sample_triple(n) else {
            break;
        };
        iterations += 1;

        let Some(candidate) = Plane::from_points(&points[i0], &points[i1], &points[i2]) else {
            continue; // near-collinear sample
        };
        valid_candidates += 1;

        let count = count_inliers(points, &candidate, config.inlier_threshold);
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((candidate, count));
        }
    }

    let Some((mut plane, _)) = best else {
        warn!(iterations, "No valid ground-plane candidate found");
        return GroundPlaneFit::degenerate();
    };

    if config.orient_toward_bulk {
        let total: f64 = points.iter().map(|p| plane.signed_distance(p)).sum();
        if total < 0.0 {
            plane = plane.flipped();
        }
    }

    let inliers: Vec<usize> = (0..n)
        .filter(|&i| plane.is_inlier(&points[i], config.inlier_threshold))
        .collect();
    let rmse = inlier_rmse(points, &plane, &inliers);

    debug!(
        inliers = inliers.len(),
        points = n,
        rmse,
        iterations,
        "Ground plane fitted"
    );

    GroundPlaneFit {
        plane,
        inliers,
        rmse,
        iterations,
        valid_candidates,
    }
}

fn count_inliers(points: &[Point3<f64>], plane: &Plane, threshold: f64) -> usize {
    points.iter().filter(|p| plane.is_inlier(p, threshold)).count()
}

#[allow(clippy::cast_precision_loss)]
// Precision loss: inlier counts beyond 2^52 are unsupported
fn inlier_rmse(points: &[Point3<f64>], plane: &Plane, inliers: &[usize]) -> f64 {
    if inliers.is_empty() {
        return f64::NAN;
    }
    let sum_sq: f64 = inliers
        .iter()
        .map(|&i| plane.signed_distance(&points[i]).powi(2))
        .sum();
    (sum_sq / inliers.len() as f64).sqrt()
}
