//! Ordered 3D point cloud.

use nalgebra::{Point3, Vector3};

/// An ordered sequence of 3D points.
///
/// Point order is preserved through every operation, which keeps index-based
/// results (such as plane inlier sets) meaningful and the pipeline
/// reproducible.
///
/// # Example
///
/// ```
/// use morpho_types::{PointCloud, Point3};
///
/// let mut cloud = PointCloud::new();
/// cloud.push(Point3::new(1.0, 2.0, 3.0));
/// cloud.push_coords(4.0, 5.0, 6.0);
///
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud.points[1].y, 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Point positions, in acquisition order.
    pub points: Vec<Point3<f64>>,
}

impl PointCloud {
    /// Create an empty point cloud.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create an empty point cloud with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from positions.
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        Self {
            points: positions.to_vec(),
        }
    }

    /// Create a point cloud from coordinate triplets.
    ///
    /// This is the shape a decoded vertex list usually arrives in.
    #[must_use]
    pub fn from_coords(coords: &[[f64; 3]]) -> Self {
        coords
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect()
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the cloud holds no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    /// Append a point given by its coordinates.
    #[inline]
    pub fn push_coords(&mut self, x: f64, y: f64, z: f64) {
        self.points.push(Point3::new(x, y, z));
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.points.iter()
    }

    /// Returns true if every coordinate of every point is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.points
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Mean position of the points, or `None` for an empty cloud.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    // Precision loss: point counts beyond 2^52 are unsupported
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.points.iter().map(|p| p.coords).sum();
        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Return a copy with every coordinate multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        self.points
            .iter()
            .map(|p| Point3::from(p.coords * factor))
            .collect()
    }
}

impl FromIterator<Point3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<Vec<Point3<f64>>> for PointCloud {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}
