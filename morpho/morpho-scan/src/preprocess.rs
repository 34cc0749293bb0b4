//! Point filtering, physical scaling and ground cropping.

use morpho_transform::Plane;
use morpho_types::PointCloud;
use tracing::debug;

/// Points this far below the ground plane are still kept (legs, hooves).
pub const GROUND_TOLERANCE: f64 = 0.01;

/// Drop points with any non-finite coordinate, then multiply by `scale`.
#[must_use]
pub fn sanitize_and_scale(raw: &PointCloud, scale: f64) -> PointCloud {
    let cloud = raw
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
        .copied()
        .collect::<PointCloud>()
        .scaled(scale);

    debug!(
        raw = raw.len(),
        kept = cloud.len(),
        scale,
        "sanitized and scaled"
    );
    cloud
}

/// Keep points whose signed distance to `plane` is at least `-GROUND_TOLERANCE`.
#[must_use]
pub fn crop_above_ground(cloud: &PointCloud, plane: &Plane) -> PointCloud {
    let cropped: PointCloud = cloud
        .iter()
        .filter(|p| plane.signed_distance(p) >= -GROUND_TOLERANCE)
        .copied()
        .collect();

    debug!(
        before = cloud.len(),
        after = cropped.len(),
        "cropped below ground"
    );
    cropped
}
