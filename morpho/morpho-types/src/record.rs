//! Measurement record produced for one scan.
//!
//! The field names of [`MetricsRecord`] and [`QualityReport`] are consumed
//! verbatim by downstream scoring, so they serialize exactly as declared.
//! Every "not computed" value is `NaN` in memory and `null` on the wire.

use serde::{Deserialize, Serialize};

/// Scan-quality heuristics attached to a [`MetricsRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Density proxy for scan completeness, in percent.
    pub coverage_pct: f64,
    /// Heuristic noise level paired with the coverage value.
    pub noise_level: f64,
    /// RMSE of the ground-plane inliers; `NaN` when no plane was fitted.
    #[serde(with = "nan_as_null")]
    pub ground_plane_fit_rmse: f64,
    /// True when the measured height falls outside the plausible range.
    pub scale_warning: bool,
}

/// Body measurements for one scan.
///
/// Lengths are meters, volume cubic meters, weight kilograms.
/// Any field may be `NaN` when its input was insufficient.
///
/// # Example
///
/// ```
/// use morpho_types::{MetricsRecord, QualityReport};
///
/// let record = MetricsRecord {
///     withers_height_m: 1.35,
///     body_length_m: 1.6,
///     heart_girth_m: f64::NAN,
///     chest_depth_m: 0.7,
///     hip_width_m: 0.5,
///     rump_angle_deg: f64::NAN,
///     estimated_volume_m3: f64::NAN,
///     stance_asymmetry_idx: 0.2,
///     weight_est_kg: f64::NAN,
///     quality: QualityReport {
///         coverage_pct: 80.0,
///         noise_level: 0.08,
///         ground_plane_fit_rmse: 0.004,
///         scale_warning: false,
///     },
/// };
/// assert_eq!(
///     record.missing_fields(),
///     vec!["heart_girth_m", "rump_angle_deg", "estimated_volume_m3", "weight_est_kg"]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Extent along the least-variance axis.
    #[serde(with = "nan_as_null")]
    pub withers_height_m: f64,
    /// Extent along the greatest-variance axis.
    #[serde(with = "nan_as_null")]
    pub body_length_m: f64,
    /// Perimeter of the thoracic cross-section hull.
    #[serde(with = "nan_as_null")]
    pub heart_girth_m: f64,
    /// Vertical extent of the thoracic cross-section.
    #[serde(with = "nan_as_null")]
    pub chest_depth_m: f64,
    /// Lateral extent of the rump cross-section.
    #[serde(with = "nan_as_null")]
    pub hip_width_m: f64,
    /// Rump inclination. Not produced by this pipeline; always `NaN`.
    #[serde(with = "nan_as_null")]
    pub rump_angle_deg: f64,
    /// Enclosed or hull-approximated volume of the scanned surface.
    #[serde(with = "nan_as_null")]
    pub estimated_volume_m3: f64,
    /// Lateral spread of near-ground points relative to body width.
    #[serde(with = "nan_as_null")]
    pub stance_asymmetry_idx: f64,
    /// Girth-tape weight estimate.
    #[serde(with = "nan_as_null")]
    pub weight_est_kg: f64,
    /// Scan-quality heuristics.
    pub quality: QualityReport,
}

impl MetricsRecord {
    /// Names of the measurement fields that are not finite.
    ///
    /// `rump_angle_deg` is always listed.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("withers_height_m", self.withers_height_m),
            ("body_length_m", self.body_length_m),
            ("heart_girth_m", self.heart_girth_m),
            ("chest_depth_m", self.chest_depth_m),
            ("hip_width_m", self.hip_width_m),
            ("rump_angle_deg", self.rump_angle_deg),
            ("estimated_volume_m3", self.estimated_volume_m3),
            ("stance_asymmetry_idx", self.stance_asymmetry_idx),
            ("weight_est_kg", self.weight_est_kg),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Serde adapter that writes non-finite floats as `null` and reads `null` as `NaN`.
///
/// Use with `#[serde(with = "morpho_types::nan_as_null")]`.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a float, mapping `NaN` and infinities to `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    // Signature fixed by serde's `with` protocol
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    /// Deserialize a float, mapping `null` to `NaN`.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MetricsRecord {
        MetricsRecord {
            withers_height_m: 1.4,
            body_length_m: 1.8,
            heart_girth_m: 1.9,
            chest_depth_m: 0.75,
            hip_width_m: 0.52,
            rump_angle_deg: f64::NAN,
            estimated_volume_m3: f64::NAN,
            stance_asymmetry_idx: 0.31,
            weight_est_kg: 1.9 * 1.9 * 1.8 / 11877.0,
            quality: QualityReport {
                coverage_pct: 80.0,
                noise_level: 0.08,
                ground_plane_fit_rmse: f64::NAN,
                scale_warning: false,
            },
        }
    }

    #[test]
    fn nan_fields_serialize_as_null() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json["rump_angle_deg"].is_null());
        assert!(json["estimated_volume_m3"].is_null());
        assert!(json["quality"]["ground_plane_fit_rmse"].is_null());
        assert!((json["body_length_m"].as_f64().unwrap() - 1.8).abs() < 1e-12);
    }

    #[test]
    fn wire_field_names_are_stable() {
        let json = serde_json::to_value(sample_record()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "withers_height_m",
            "body_length_m",
            "heart_girth_m",
            "chest_depth_m",
            "hip_width_m",
            "rump_angle_deg",
            "estimated_volume_m3",
            "stance_asymmetry_idx",
            "weight_est_kg",
            "quality",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 10);

        let quality = object["quality"].as_object().unwrap();
        for key in [
            "coverage_pct",
            "noise_level",
            "ground_plane_fit_rmse",
            "scale_warning",
        ] {
            assert!(quality.contains_key(key), "missing quality key {key}");
        }
    }

    #[test]
    fn null_reads_back_as_nan() {
        let text = serde_json::to_string(&sample_record()).unwrap();
        let back: MetricsRecord = serde_json::from_str(&text).unwrap();
        assert!(back.rump_angle_deg.is_nan());
        assert!(back.quality.ground_plane_fit_rmse.is_nan());
        assert!((back.heart_girth_m - 1.9).abs() < 1e-12);
    }

    #[test]
    fn missing_fields_lists_non_finite() {
        let missing = sample_record().missing_fields();
        assert_eq!(missing, vec!["rump_angle_deg", "estimated_volume_m3"]);
    }
}
