//! Planar convex hull by Andrew's monotone chain.

use nalgebra::Point2;

use crate::error::{MeasureError, MeasureResult};

/// Minimum number of input points for [`convex_hull_2d`].
pub const MIN_HULL_POINTS: usize = 3;

/// A closed convex polygon.
///
/// Vertices run counter-clockwise starting from the lexicographically
/// smallest point. Exactly collinear boundary points are not vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull2D {
    /// Hull vertices in winding order. The closing edge is implicit.
    pub vertices: Vec<Point2<f64>>,
    /// Sum of edge lengths, including the edge from the last vertex back to the first.
    pub perimeter: f64,
}

impl ConvexHull2D {
    /// Number of hull vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the hull has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Enclosed area (shoelace formula). Zero for fewer than three vertices.
    #[must_use]
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x.mul_add(b.y, -(b.x * a.y))
            })
            .sum();
        0.5 * twice.abs()
    }
}

/// Compute the convex hull of a planar point set and its perimeter.
///
/// Points are sorted by `(x, y)`. Lower and upper chains are built by
/// popping while the last two chain points and the candidate fail to make a
/// strict left turn (cross product `<= 0`), so collinear and duplicate
/// points never become vertices. Fully collinear input yields a two-vertex
/// "hull" whose perimeter is twice the segment length.
///
/// # Errors
///
/// Returns [`MeasureError::InsufficientPoints`] for fewer than
/// [`MIN_HULL_POINTS`] input points.
///
/// # Example
///
/// ```
/// use morpho_measure::convex_hull_2d;
/// use nalgebra::Point2;
///
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.5, 0.5),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let hull = convex_hull_2d(&square).unwrap();
/// assert_eq!(hull.len(), 4);
/// assert!((hull.perimeter - 4.0).abs() < 1e-12);
/// ```
pub fn convex_hull_2d(points: &[Point2<f64>]) -> MeasureResult<ConvexHull2D> {
    if points.len() < MIN_HULL_POINTS {
        return Err(MeasureError::InsufficientPoints {
            required: MIN_HULL_POINTS,
            actual: points.len(),
        });
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut lower = half_chain(sorted.iter());
    let mut upper = half_chain(sorted.iter().rev());

    // The last point of each chain is the first point of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);

    let perimeter = perimeter(&lower);
    Ok(ConvexHull2D {
        vertices: lower,
        perimeter,
    })
}

fn half_chain<'a>(points: impl Iterator<Item = &'a Point2<f64>>) -> Vec<Point2<f64>> {
    let mut chain: Vec<Point2<f64>> = Vec::new();
    for &p in points {
        while let [.., a, b] = chain.as_slice() {
            if cross(a, b, &p) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Z component of `(a - o) × (b - o)`; positive for a left turn.
// Unfused: exactly collinear triples must give exactly zero.
#[allow(clippy::suboptimal_flops)]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn perimeter(vertices: &[Point2<f64>]) -> f64 {
    let n = vertices.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| (vertices[(i + 1) % n] - vertices[i]).norm())
        .sum()
}
