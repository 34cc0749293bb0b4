//! Body volume from a surface handle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeasureError, MeasureResult};
use crate::surface::VolumeSurface;

/// Units of the surface handed to [`estimate_volume`].
///
/// Volume scales with the cube of the length scale. The factor is applied
/// here exactly once, and only for [`SurfaceUnits::Raw`] surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceUnits {
    /// Same units as the raw scan vertices; multiplied by `scale³`.
    #[default]
    Raw,
    /// Already in meters; used as is.
    Physical,
}

impl SurfaceUnits {
    /// Factor converting a volume in these units to cubic meters.
    #[must_use]
    pub fn volume_factor(self, scale: f64) -> f64 {
        match self {
            Self::Raw => scale.powi(3),
            Self::Physical => 1.0,
        }
    }
}

/// Which surface capability produced the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSource {
    /// Enclosed volume of a watertight surface.
    Enclosed,
    /// Convex hull volume, an over-approximation for open or concave surfaces.
    ConvexHull,
}

/// A volume in cubic meters and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEstimate {
    /// Volume in cubic meters.
    pub volume_m3: f64,
    /// Capability the value came from.
    pub source: VolumeSource,
}

/// Estimate body volume in cubic meters.
///
/// Uses the enclosed volume when the surface is watertight and the convex
/// hull volume otherwise, then applies [`SurfaceUnits::volume_factor`].
///
/// # Errors
///
/// Returns [`MeasureError::VolumeFailed`] if the surface fails or the
/// scaled volume is negative or not finite.
pub fn estimate_volume(
    surface: &dyn VolumeSurface,
    units: SurfaceUnits,
    scale: f64,
) -> MeasureResult<VolumeEstimate> {
    let (raw, source) = if surface.is_closed_volume() {
        (surface.volume()?, VolumeSource::Enclosed)
    } else {
        (surface.convex_hull_volume()?, VolumeSource::ConvexHull)
    };

    let volume_m3 = raw * units.volume_factor(scale);
    if !volume_m3.is_finite() || volume_m3 < 0.0 {
        return Err(MeasureError::volume_failed(format!(
            "implausible volume {volume_m3}"
        )));
    }

    debug!(?source, ?units, volume_m3, "volume estimated");
    Ok(VolumeEstimate { volume_m3, source })
}
