//! Plane representation for ground fitting.

use nalgebra::{Point3, Vector3};

/// Cross-product norm below which three sample points are treated as collinear.
pub const DEGENERATE_NORMAL_EPSILON: f64 = 1e-12;

/// A plane in 3D space defined by a unit normal and an offset.
///
/// The plane is the set `{x : normal · x + offset = 0}`. The signed
/// distance of a point `p` is `normal · p + offset`; it is positive on the
/// side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Scalar offset `d`.
    pub offset: f64,
}

impl Plane {
    /// The `y = 0` plane with a `+Y` normal.
    ///
    /// Returned by the ground estimator when there is not enough data to fit.
    #[must_use]
    pub fn y_up() -> Self {
        Self {
            normal: Vector3::y(),
            offset: 0.0,
        }
    }

    /// Create a plane from a normal and offset.
    ///
    /// Both are divided by the normal's length so the stored normal is unit.
    /// Returns `None` if the normal is (near) zero or not finite.
    #[must_use]
    pub fn new(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm < DEGENERATE_NORMAL_EPSILON {
            return None;
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Create a plane through `point` with the given normal.
    #[must_use]
    pub fn from_point_normal(point: &Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let unit = Self::new(normal, 0.0)?.normal;
        Some(Self {
            normal: unit,
            offset: -unit.dot(&point.coords),
        })
    }

    /// Create a plane from three points.
    ///
    /// The normal is `(p1 - p0) × (p2 - p0)`, normalized. Returns `None` when
    /// the cross product's norm is below [`DEGENERATE_NORMAL_EPSILON`]
    /// (collinear or coincident points).
    #[must_use]
    pub fn from_points(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Self> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        Self::from_point_normal(p0, normal)
    }

    /// Signed distance from `point` to the plane.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Absolute distance from `point` to the plane.
    #[inline]
    #[must_use]
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }

    /// Check if a point is within `threshold` of the plane.
    #[inline]
    #[must_use]
    pub fn is_inlier(&self, point: &Point3<f64>, threshold: f64) -> bool {
        self.distance(point) <= threshold
    }

    /// The same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
