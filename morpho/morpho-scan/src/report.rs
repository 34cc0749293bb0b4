//! Per-field degradations and the full pipeline report.

use morpho_transform::{AlignedFrame, GroundPlaneFit};
use morpho_types::MetricsRecord;
use serde::Serialize;

/// Why a record field is `NaN` (or, for the ground fit, a fallback).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradationCause {
    /// The slab held fewer points than required.
    SparseSlab {
        /// Points in the slab.
        points: usize,
        /// Required minimum.
        required: usize,
    },
    /// The slab cross-section could not be hulled.
    HullFailed {
        /// Hull error message.
        reason: String,
    },
    /// No surface handle was supplied for volume estimation.
    VolumeUnavailable,
    /// The surface failed to produce a volume.
    VolumeFailed {
        /// Volume error message.
        reason: String,
    },
    /// No points fell in the distal height band.
    NoDistalPoints,
    /// Heart girth was zero or negative.
    NonPositiveGirth,
    /// The ground fit fell back to the default plane.
    GroundFitDegenerate,
}

/// A record field that could not be computed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    /// Wire name of the affected field.
    pub field: &'static str,
    /// What went wrong.
    pub cause: DegradationCause,
}

impl Degradation {
    /// Create a degradation entry.
    #[must_use]
    pub const fn new(field: &'static str, cause: DegradationCause) -> Self {
        Self { field, cause }
    }
}

/// Everything the pipeline produced for one scan.
#[derive(Debug, Clone)]
pub struct MeasurementReport {
    /// The externally visible measurement record.
    pub record: MetricsRecord,
    /// Ground-plane fit on the scaled cloud.
    pub ground: GroundPlaneFit,
    /// Principal-axis frame of the retained points.
    pub frame: AlignedFrame,
    /// Points in the raw input.
    pub raw_points: usize,
    /// Points left after sanitizing, cleanup and ground cropping.
    pub retained_points: usize,
    /// Points in the thoracic slab.
    pub thoracic_points: usize,
    /// Points in the rump slab.
    pub rump_points: usize,
    /// Fields that degraded to `NaN`, in pipeline order.
    pub degradations: Vec<Degradation>,
}

impl MeasurementReport {
    /// Returns true if `field` was degraded.
    #[must_use]
    pub fn is_degraded(&self, field: &str) -> bool {
        self.degradations.iter().any(|d| d.field == field)
    }

    /// Causes recorded for `field`.
    pub fn causes_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a DegradationCause> + 'a {
        self.degradations
            .iter()
            .filter(move |d| d.field == field)
            .map(|d| &d.cause)
    }
}
