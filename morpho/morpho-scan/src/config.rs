//! Pipeline configuration.

use morpho_measure::SurfaceUnits;
use morpho_transform::GroundPlaneConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

/// Parameters for optional scan cleanup before the ground fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupParams {
    /// Voxel edge length for downsampling. Zero disables downsampling.
    pub voxel_size: f64,
    /// Minimum number of other points within `radius` for a point to be kept.
    pub min_neighbors: usize,
    /// Neighborhood radius for outlier removal.
    pub radius: f64,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            voxel_size: 0.01,
            min_neighbors: 8,
            radius: 0.05,
        }
    }
}

impl CleanupParams {
    /// Creates new parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the voxel size.
    #[must_use]
    pub const fn with_voxel_size(mut self, size: f64) -> Self {
        self.voxel_size = size;
        self
    }

    /// Sets the minimum neighbor count.
    #[must_use]
    pub const fn with_min_neighbors(mut self, count: usize) -> Self {
        self.min_neighbors = count;
        self
    }

    /// Sets the neighborhood radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// Configuration for [`measure_scan`](crate::measure_scan).
///
/// Field names match the keys callers send, so a partial JSON object
/// deserializes with every missing key at its default.
///
/// # Example
///
/// ```
/// use morpho_scan::MorphometryConfig;
///
/// let config: MorphometryConfig = serde_json::from_str(r#"{"scale": 0.01}"#).unwrap();
/// assert!((config.scale - 0.01).abs() < 1e-12);
/// assert_eq!(config.ransac_seed, 42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphometryConfig {
    /// Multiplier from raw vertex units to meters.
    pub scale: f64,
    /// RANSAC sample count for the ground fit.
    pub ransac_max_iterations: usize,
    /// RANSAC inlier distance, in meters.
    pub ransac_inlier_threshold: f64,
    /// RANSAC seed.
    pub ransac_seed: u64,
    /// Thoracic slab position along the body, in `[0, 1]`.
    pub thoracic_fraction: f64,
    /// Rump slab position along the body, in `[0, 1]`.
    pub rump_fraction: f64,
    /// Half-thickness of both slabs, in meters.
    pub slab_half_thickness: f64,
    /// Height fraction below which points count as distal.
    pub distal_fraction: f64,
    /// Slabs with fewer points yield `NaN` for their measurements.
    pub min_slab_points: usize,
    /// Point count above which coverage is reported as good.
    pub coverage_point_threshold: usize,
    /// Plausible withers height range in meters; outside it `scale_warning` is set.
    pub plausible_height_m: (f64, f64),
    /// Resolve principal-axis signs before slicing.
    pub canonicalize_axes: bool,
    /// Units of the surface handed to the volume stage.
    pub surface_units: SurfaceUnits,
    /// Cleanup applied after scaling; `None` disables it.
    pub cleanup: Option<CleanupParams>,
}

impl Default for MorphometryConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            ransac_max_iterations: 800,
            ransac_inlier_threshold: 0.02,
            ransac_seed: 42,
            thoracic_fraction: 0.40,
            rump_fraction: 0.85,
            slab_half_thickness: 0.03,
            distal_fraction: 0.08,
            min_slab_points: 50,
            coverage_point_threshold: 5000,
            plausible_height_m: (0.9, 1.9),
            canonicalize_axes: true,
            surface_units: SurfaceUnits::Raw,
            cleanup: None,
        }
    }
}

impl MorphometryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the physical scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the RANSAC seed.
    #[must_use]
    pub const fn with_ransac_seed(mut self, seed: u64) -> Self {
        self.ransac_seed = seed;
        self
    }

    /// Sets the thoracic and rump slab positions.
    #[must_use]
    pub const fn with_slab_fractions(mut self, thoracic: f64, rump: f64) -> Self {
        self.thoracic_fraction = thoracic;
        self.rump_fraction = rump;
        self
    }

    /// Sets the slab half-thickness.
    #[must_use]
    pub const fn with_slab_half_thickness(mut self, half_thickness: f64) -> Self {
        self.slab_half_thickness = half_thickness;
        self
    }

    /// Sets the minimum slab population.
    #[must_use]
    pub const fn with_min_slab_points(mut self, count: usize) -> Self {
        self.min_slab_points = count;
        self
    }

    /// Enables or disables axis canonicalization.
    #[must_use]
    pub const fn with_canonicalize_axes(mut self, enabled: bool) -> Self {
        self.canonicalize_axes = enabled;
        self
    }

    /// Sets the surface units for volume estimation.
    #[must_use]
    pub const fn with_surface_units(mut self, units: SurfaceUnits) -> Self {
        self.surface_units = units;
        self
    }

    /// Enables cleanup with the given parameters.
    #[must_use]
    pub const fn with_cleanup(mut self, params: CleanupParams) -> Self {
        self.cleanup = Some(params);
        self
    }

    /// The ground-plane settings carried by this configuration.
    #[must_use]
    pub fn ground_plane_config(&self) -> GroundPlaneConfig {
        GroundPlaneConfig::default()
            .with_max_iterations(self.ransac_max_iterations)
            .with_inlier_threshold(self.ransac_inlier_threshold)
            .with_seed(self.ransac_seed)
    }

    /// Check every value before the pipeline touches any data.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] naming the first rejected field.
    pub fn validate(&self) -> ScanResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ScanError::invalid_config(format!(
                "scale must be finite and positive, got {}",
                self.scale
            )));
        }
        if self.ransac_max_iterations == 0 {
            return Err(ScanError::invalid_config(
                "ransac_max_iterations must be at least 1",
            ));
        }
        positive("ransac_inlier_threshold", self.ransac_inlier_threshold)?;
        positive("slab_half_thickness", self.slab_half_thickness)?;
        unit_interval("thoracic_fraction", self.thoracic_fraction)?;
        unit_interval("rump_fraction", self.rump_fraction)?;
        unit_interval("distal_fraction", self.distal_fraction)?;

        let (lo, hi) = self.plausible_height_m;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(ScanError::invalid_config(format!(
                "plausible_height_m must be an ordered finite range, got ({lo}, {hi})"
            )));
        }

        if let Some(cleanup) = &self.cleanup {
            if !(cleanup.voxel_size.is_finite() && cleanup.voxel_size >= 0.0) {
                return Err(ScanError::invalid_config(format!(
                    "cleanup.voxel_size must be finite and non-negative, got {}",
                    cleanup.voxel_size
                )));
            }
            positive("cleanup.radius", cleanup.radius)?;
        }

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> ScanResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScanError::invalid_config(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn unit_interval(name: &str, value: f64) -> ScanResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScanError::invalid_config(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MorphometryConfig::default();
        assert!((config.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.ransac_max_iterations, 800);
        assert!((config.ransac_inlier_threshold - 0.02).abs() < f64::EPSILON);
        assert_eq!(config.ransac_seed, 42);
        assert!((config.thoracic_fraction - 0.40).abs() < f64::EPSILON);
        assert!((config.rump_fraction - 0.85).abs() < f64::EPSILON);
        assert!((config.slab_half_thickness - 0.03).abs() < f64::EPSILON);
        assert!((config.distal_fraction - 0.08).abs() < f64::EPSILON);
        assert_eq!(config.min_slab_points, 50);
        assert_eq!(config.surface_units, SurfaceUnits::Raw);
        assert!(config.cleanup.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ground_config_carries_ransac_keys() {
        let config = MorphometryConfig {
            ransac_max_iterations: 10,
            ransac_inlier_threshold: 0.5,
            ransac_seed: 7,
            ..MorphometryConfig::default()
        };
        let ground = config.ground_plane_config();
        assert_eq!(ground.max_iterations, 10);
        assert!((ground.inlier_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(ground.seed, 7);
        assert_eq!(ground.min_points, 50);
    }

    #[test]
    fn rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = MorphometryConfig::new().with_scale(scale);
            assert!(matches!(
                config.validate(),
                Err(ScanError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        let config = MorphometryConfig::new().with_slab_fractions(1.5, 0.85);
        let message = config.validate().map_err(|e| e.to_string()).err();
        assert!(message.is_some_and(|m| m.contains("thoracic_fraction")));

        let config = MorphometryConfig {
            distal_fraction: f64::NAN,
            ..MorphometryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_thresholds() {
        let config = MorphometryConfig::new().with_slab_half_thickness(0.0);
        assert!(config.validate().is_err());

        let config = MorphometryConfig {
            ransac_max_iterations: 0,
            ..MorphometryConfig::default()
        };
        assert!(config.validate().is_err());

        let config = MorphometryConfig {
            plausible_height_m: (2.0, 1.0),
            ..MorphometryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_cleanup() {
        let config = MorphometryConfig::new().with_cleanup(CleanupParams::new().with_radius(0.0));
        assert!(config.validate().is_err());

        let config =
            MorphometryConfig::new().with_cleanup(CleanupParams::new().with_voxel_size(-0.1));
        assert!(config.validate().is_err());

        let config =
            MorphometryConfig::new().with_cleanup(CleanupParams::new().with_voxel_size(0.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"scale": 0.001, "thoracic_fraction": 0.35, "cleanup": {"radius": 0.1}}"#;
        let config: MorphometryConfig =
            serde_json::from_str(json).unwrap_or_else(|_| MorphometryConfig::default());
        assert!((config.scale - 0.001).abs() < f64::EPSILON);
        assert!((config.thoracic_fraction - 0.35).abs() < f64::EPSILON);
        assert!((config.rump_fraction - 0.85).abs() < f64::EPSILON);
        let cleanup = config.cleanup.unwrap_or_default();
        assert!((cleanup.radius - 0.1).abs() < f64::EPSILON);
        assert_eq!(cleanup.min_neighbors, 8);
    }

    #[test]
    fn surface_units_from_json() {
        let config: MorphometryConfig = serde_json::from_str(r#"{"surface_units": "physical"}"#)
            .unwrap_or_else(|_| MorphometryConfig::default());
        assert_eq!(config.surface_units, SurfaceUnits::Physical);
    }
}
