//! Principal-axis alignment.
//!
//! Computes an object-local frame from the right singular vectors of the
//! centered point matrix, ordered by descending singular value. For a body
//! scan, axis 0 is taken as body length and axis 2 as height. That reading
//! is a geometric heuristic; the frame carries no anatomical guarantee.

use morpho_types::PointCloud;
use nalgebra::{DMatrix, Matrix3, Point3, SymmetricEigen, Vector3};

use crate::error::{TransformError, TransformResult};

/// Centroid plus an orthonormal basis ordered by descending variance.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    /// Mean of the input points.
    pub centroid: Point3<f64>,
    /// Unit axes; `axes[0]` carries the greatest spread, `axes[2]` the least.
    pub axes: [Vector3<f64>; 3],
    /// Singular values of the centered point matrix, descending.
    pub singular_values: [f64; 3],
}

/// Peak-to-peak extents of a cloud along the three frame axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalExtents {
    /// Extent along axis 0 (`L`).
    pub length: f64,
    /// Extent along axis 1 (`W`).
    pub width: f64,
    /// Extent along axis 2 (`H`).
    pub height: f64,
}

/// A cloud expressed in the coordinates of an [`AlignedFrame`].
///
/// Component `i` of each point is the projection onto `axes[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedCloud {
    /// Local coordinates, in input order.
    pub points: Vec<Point3<f64>>,
}

impl AlignedFrame {
    /// Axis of greatest spread (body length).
    #[must_use]
    pub const fn primary_axis(&self) -> Vector3<f64> {
        self.axes[0]
    }

    /// Axis of intermediate spread (body width).
    #[must_use]
    pub const fn lateral_axis(&self) -> Vector3<f64> {
        self.axes[1]
    }

    /// Axis of least spread (body height).
    #[must_use]
    pub const fn vertical_axis(&self) -> Vector3<f64> {
        self.axes[2]
    }

    /// Rotation taking world offsets into frame coordinates (rows are axes).
    #[must_use]
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_rows(&[
            self.axes[0].transpose(),
            self.axes[1].transpose(),
            self.axes[2].transpose(),
        ])
    }

    /// Express one world point in frame coordinates.
    #[must_use]
    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let centered = point - self.centroid;
        Point3::new(
            centered.dot(&self.axes[0]),
            centered.dot(&self.axes[1]),
            centered.dot(&self.axes[2]),
        )
    }

    /// Express a whole cloud in frame coordinates.
    #[must_use]
    pub fn project(&self, cloud: &PointCloud) -> AlignedCloud {
        AlignedCloud {
            points: cloud.iter().map(|p| self.project_point(p)).collect(),
        }
    }

    /// Returns true if the axes are unit length and pairwise orthogonal within `tolerance`.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let [a, b, c] = &self.axes;
        [a, b, c].iter().all(|v| (v.norm() - 1.0).abs() <= tolerance)
            && a.dot(b).abs() <= tolerance
            && a.dot(c).abs() <= tolerance
            && b.dot(c).abs() <= tolerance
    }

    /// Resolve the sign ambiguity of the axes.
    ///
    /// - If `up` is given, axis 2 is flipped to have a non-negative dot
    ///   product with it.
    /// - Axis 0 is flipped to point toward the half of its range that holds
    ///   more points; an even split keeps the current sign.
    /// - Axis 1 becomes `axis2 × axis0`, so the frame is right-handed.
    ///
    /// Extents are unchanged; only the direction of travel along each axis is.
    #[must_use]
    pub fn canonicalized(&self, cloud: &PointCloud, up: Option<&Vector3<f64>>) -> Self {
        let mut axes = self.axes;

        if let Some(up) = up {
            if axes[2].dot(up) < 0.0 {
                axes[2] = -axes[2];
            }
        }

        let along: Vec<f64> = cloud
            .iter()
            .map(|p| (p - self.centroid).dot(&axes[0]))
            .collect();
        if let Some((lo, hi)) = min_max(along.iter().copied()) {
            let mid = 0.5 * (lo + hi);
            let ahead = along.iter().filter(|&&t| t > mid).count();
            let behind = along.iter().filter(|&&t| t < mid).count();
            if behind > ahead {
                axes[0] = -axes[0];
            }
        }

        axes[1] = axes[2].cross(&axes[0]);

        Self {
            centroid: self.centroid,
            axes,
            singular_values: self.singular_values,
        }
    }
}

impl AlignedCloud {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minimum and maximum coordinate along `axis` (0, 1 or 2).
    ///
    /// Returns `None` for an empty cloud or an axis index above 2.
    #[must_use]
    pub fn range(&self, axis: usize) -> Option<(f64, f64)> {
        if axis > 2 {
            return None;
        }
        min_max(self.points.iter().map(|p| p[axis]))
    }

    /// Peak-to-peak extent along `axis`; `NaN` when the range is undefined.
    #[must_use]
    pub fn extent(&self, axis: usize) -> f64 {
        self.range(axis).map_or(f64::NAN, |(lo, hi)| hi - lo)
    }

    /// Extents along all three axes.
    #[must_use]
    pub fn extents(&self) -> PrincipalExtents {
        PrincipalExtents {
            length: self.extent(0),
            width: self.extent(1),
            height: self.extent(2),
        }
    }
}

/// Compute the principal-axis frame of a cloud.
///
/// The axes are the right singular vectors of the centered `n × 3` point
/// matrix, sorted by descending singular value (equivalently, covariance
/// eigenvectors by descending eigenvalue). The returned basis is
/// right-handed. Axis signs are otherwise arbitrary; see
/// [`AlignedFrame::canonicalized`].
///
/// # Errors
///
/// - [`TransformError::InsufficientPoints`] for an empty cloud.
/// - [`TransformError::NonFinitePoint`] if any coordinate is not finite.
/// - [`TransformError::PcaFailed`] if the decomposition yields no basis.
///
/// # Example
///
/// ```
/// use morpho_transform::align_principal_axes;
/// use morpho_types::PointCloud;
///
/// let cloud = PointCloud::from_coords(&[
///     [0.0, 0.0, 0.0],
///     [10.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [10.0, 1.0, 0.0],
/// ]);
/// let frame = align_principal_axes(&cloud).unwrap();
/// assert!(frame.primary_axis().x.abs() > 0.99);
/// assert!(frame.is_orthonormal(1e-9));
/// ```
pub fn align_principal_axes(cloud: &PointCloud) -> TransformResult<AlignedFrame> {
    let Some(centroid) = cloud.centroid() else {
        return Err(TransformError::InsufficientPoints {
            required: 1,
            actual: 0,
        });
    };
    if let Some(index) = cloud
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(TransformError::NonFinitePoint { index });
    }

    let (axes, singular_values) = if cloud.len() >= 3 {
        svd_axes(cloud, &centroid)?
    } else {
        eigen_axes(cloud, &centroid)
    };

    let mut axes = axes;
    if axes[0].cross(&axes[1]).dot(&axes[2]) < 0.0 {
        axes[2] = -axes[2];
    }

    Ok(AlignedFrame {
        centroid,
        axes,
        singular_values,
    })
}

fn svd_axes(
    cloud: &PointCloud,
    centroid: &Point3<f64>,
) -> TransformResult<([Vector3<f64>; 3], [f64; 3])> {
    let centered = DMatrix::from_fn(cloud.len(), 3, |r, c| cloud.points[r][c] - centroid[c]);
    let svd = centered.svd(false, true);
    let v_t = svd.v_t.ok_or_else(|| TransformError::PcaFailed {
        reason: "no right singular vectors".to_string(),
    })?;
    if v_t.nrows() < 3 || svd.singular_values.len() < 3 {
        return Err(TransformError::PcaFailed {
            reason: format!("rank-deficient decomposition ({} rows)", v_t.nrows()),
        });
    }

    let values = [
        svd.singular_values[0],
        svd.singular_values[1],
        svd.singular_values[2],
    ];
    let order = descending_order(&values);
    let axes = order.map(|row| Vector3::new(v_t[(row, 0)], v_t[(row, 1)], v_t[(row, 2)]).normalize());
    Ok((axes, order.map(|i| values[i])))
}

/// Covariance eigenvectors, for clouds too small for a full SVD basis.
fn eigen_axes(cloud: &PointCloud, centroid: &Point3<f64>) -> ([Vector3<f64>; 3], [f64; 3]) {
    let mut scatter = Matrix3::zeros();
    for p in cloud {
        let d = p - centroid;
        scatter += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(scatter);
    let values = [
        eigen.eigenvalues[0],
        eigen.eigenvalues[1],
        eigen.eigenvalues[2],
    ];
    let order = descending_order(&values);
    let axes = order.map(|i| eigen.eigenvectors.column(i).into_owned());
    // Singular values of the centered matrix are square roots of scatter eigenvalues
    (axes, order.map(|i| values[i].max(0.0).sqrt()))
}

fn descending_order(values: &[f64; 3]) -> [usize; 3] {
    let mut indices = [0usize, 1, 2];
    indices.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
