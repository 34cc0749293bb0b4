//! Voxel downsampling and radius outlier removal.
//!
//! Fused scans are dense and carry stray returns from the environment.
//! Downsampling evens out density; the radius filter drops isolated points.

use std::collections::BTreeMap;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use morpho_types::{Point3, PointCloud, Vector3};
use tracing::debug;

use crate::config::CleanupParams;

/// Replace the points of each occupied voxel by their centroid.
///
/// Voxels are visited in ascending `(x, y, z)` index order, so the output
/// order does not depend on hashing. A non-positive `voxel_size` returns
/// the cloud unchanged.
#[must_use]
pub fn voxel_downsample(cloud: &PointCloud, voxel_size: f64) -> PointCloud {
    if cloud.is_empty() || voxel_size <= 0.0 {
        return cloud.clone();
    }

    let mut voxels: BTreeMap<(i64, i64, i64), (Vector3<f64>, usize)> = BTreeMap::new();
    for p in cloud {
        #[allow(clippy::cast_possible_truncation)]
        let key = (
            (p.x / voxel_size).floor() as i64,
            (p.y / voxel_size).floor() as i64,
            (p.z / voxel_size).floor() as i64,
        );
        let entry = voxels.entry(key).or_insert((Vector3::zeros(), 0));
        entry.0 += p.coords;
        entry.1 += 1;
    }

    voxels
        .into_values()
        .map(|(sum, count)| {
            #[allow(clippy::cast_precision_loss)]
            let centroid = sum / count as f64;
            Point3::from(centroid)
        })
        .collect()
}

/// Keep points with at least `min_neighbors` other points within `radius`.
///
/// The tree is bulk-built, so any number of points may share a coordinate
/// on one axis (flat floors, voxel centroids on a plane).
#[must_use]
pub fn remove_radius_outliers(cloud: &PointCloud, radius: f64, min_neighbors: usize) -> PointCloud {
    if cloud.is_empty() || min_neighbors == 0 {
        return cloud.clone();
    }

    let coords: Vec<[f64; 3]> = cloud.iter().map(|p| [p.x, p.y, p.z]).collect();
    let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&coords);

    let radius_sq = radius * radius;
    cloud
        .iter()
        .zip(&coords)
        .filter(|(_, query)| {
            // The query point is its own nearest neighbor
            let found = tree.within::<SquaredEuclidean>(query, radius_sq);
            found.len().saturating_sub(1) >= min_neighbors
        })
        .map(|(p, _)| *p)
        .collect()
}

/// Downsample, then remove radius outliers.
#[must_use]
pub fn clean_cloud(cloud: &PointCloud, params: &CleanupParams) -> PointCloud {
    let downsampled = voxel_downsample(cloud, params.voxel_size);
    let cleaned = remove_radius_outliers(&downsampled, params.radius, params.min_neighbors);

    debug!(
        input = cloud.len(),
        downsampled = downsampled.len(),
        kept = cleaned.len(),
        "cleaned scan"
    );
    cleaned
}
