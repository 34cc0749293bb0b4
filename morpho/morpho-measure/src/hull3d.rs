//! Volume of the 3D convex hull of a point set.
//!
//! Incremental construction: start from a maximal tetrahedron, then add the
//! remaining points in input order, replacing the faces each point can see
//! by a fan of faces over the visibility horizon. Faces stay outward-oriented
//! throughout, so the final volume is a plain divergence-theorem sum.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{MeasureError, MeasureResult};

/// Visibility tolerance relative to the bounding-box diagonal.
const RELATIVE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
struct Face {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
}

impl Face {
    fn new(points: &[Point3<f64>], vertices: [usize; 3]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let cross = (b - a).cross(&(c - a));
        let norm = cross.norm();
        let normal = if norm > 0.0 { cross / norm } else { Vector3::zeros() };
        Self {
            vertices,
            normal,
            offset: -normal.dot(&a.coords),
        }
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Compute the volume enclosed by the convex hull of `points`.
///
/// Returns `Ok(0.0)` for fewer than four points or for coplanar, collinear
/// or coincident input.
///
/// # Errors
///
/// Returns [`MeasureError::VolumeFailed`] if any coordinate is not finite.
///
/// # Example
///
/// ```
/// use morpho_measure::convex_hull_volume;
/// use nalgebra::Point3;
///
/// let mut corners = Vec::new();
/// for x in [0.0, 2.0] {
///     for y in [0.0, 1.0] {
///         for z in [0.0, 0.5] {
///             corners.push(Point3::new(x, y, z));
///         }
///     }
/// }
/// let volume = convex_hull_volume(&corners).unwrap();
/// assert!((volume - 1.0).abs() < 1e-12);
/// ```
pub fn convex_hull_volume(points: &[Point3<f64>]) -> MeasureResult<f64> {
    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(MeasureError::volume_failed(format!(
            "vertex {index} has a non-finite coordinate"
        )));
    }
    if points.len() < 4 {
        return Ok(0.0);
    }

    let epsilon = RELATIVE_EPSILON * bounding_diagonal(points).max(f64::MIN_POSITIVE);
    let Some(seed) = initial_tetrahedron(points, epsilon) else {
        debug!(points = points.len(), "degenerate point set, hull volume is zero");
        return Ok(0.0);
    };

    let faces = build_hull(points, seed, epsilon);
    let origin = points[seed[0]];
    let volume: f64 = faces
        .iter()
        .map(|face| {
            let [a, b, c] = face.vertices.map(|i| points[i] - origin);
            a.dot(&b.cross(&c))
        })
        .sum::<f64>()
        / 6.0;

    debug!(points = points.len(), faces = faces.len(), volume, "convex hull built");
    Ok(volume.abs())
}

fn bounding_diagonal(points: &[Point3<f64>]) -> f64 {
    let mut lo = points[0];
    let mut hi = points[0];
    for p in points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (hi - lo).norm()
}

/// Four affinely independent indices spanning as much volume as a greedy pass finds.
fn initial_tetrahedron(points: &[Point3<f64>], epsilon: f64) -> Option<[usize; 4]> {
    let i0 = argmax(points, |p| -p.x)?;
    let i1 = argmax(points, |p| (p - points[i0]).norm())?;
    let axis = points[i1] - points[i0];
    if axis.norm() <= epsilon {
        return None;
    }

    let i2 = argmax(points, |p| axis.cross(&(p - points[i0])).norm() / axis.norm())?;
    let normal = axis.cross(&(points[i2] - points[i0]));
    if normal.norm() / axis.norm() <= epsilon {
        return None;
    }

    let unit = normal.normalize();
    let i3 = argmax(points, |p| unit.dot(&(p - points[i0])).abs())?;
    if unit.dot(&(points[i3] - points[i0])).abs() <= epsilon {
        return None;
    }

    Some([i0, i1, i2, i3])
}

fn argmax(points: &[Point3<f64>], score: impl Fn(&Point3<f64>) -> f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, p)| {
            let s = score(p);
            match best {
                Some((_, best_score)) if best_score >= s => best,
                _ => Some((i, s)),
            }
        })
        .map(|(i, _)| i)
}

fn build_hull(points: &[Point3<f64>], seed: [usize; 4], epsilon: f64) -> Vec<Face> {
    let [a, b, c, d] = seed;
    let inside = Point3::from(
        (points[a].coords + points[b].coords + points[c].coords + points[d].coords) / 4.0,
    );

    let mut faces: Vec<Face> = [[a, b, c], [a, d, b], [b, d, c], [c, d, a]]
        .into_iter()
        .map(|v| {
            let face = Face::new(points, v);
            if face.distance(&inside) > 0.0 {
                Face::new(points, [v[0], v[2], v[1]])
            } else {
                face
            }
        })
        .collect();

    for (index, point) in points.iter().enumerate() {
        if seed.contains(&index) {
            continue;
        }

        let visible: Vec<bool> = faces.iter().map(|f| f.distance(point) > epsilon).collect();
        if !visible.iter().any(|&v| v) {
            continue;
        }

        let visible_edges: HashSet<(usize, usize)> = faces
            .iter()
            .zip(&visible)
            .filter(|&(_, &v)| v)
            .flat_map(|(f, _)| f.edges())
            .collect();

        // Directed edges of visible faces whose twin belongs to a hidden face
        let horizon: Vec<(usize, usize)> = faces
            .iter()
            .zip(&visible)
            .filter(|&(_, &v)| v)
            .flat_map(|(f, _)| f.edges())
            .filter(|&(from, to)| !visible_edges.contains(&(to, from)))
            .collect();

        let mut kept: Vec<Face> = faces
            .iter()
            .zip(&visible)
            .filter(|&(_, &v)| !v)
            .map(|(f, _)| *f)
            .collect();
        kept.extend(
            horizon
                .into_iter()
                .map(|(from, to)| Face::new(points, [from, to, index])),
        );
        faces = kept;
    }

    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Translation3};
    use proptest::prelude::*;

    fn box_corners(lx: f64, ly: f64, lz: f64) -> Vec<Point3<f64>> {
        let mut corners = Vec::new();
        for x in [0.0, lx] {
            for y in [0.0, ly] {
                for z in [0.0, lz] {
                    corners.push(Point3::new(x, y, z));
                }
            }
        }
        corners
    }

    #[test]
    fn tetrahedron_volume() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let volume = convex_hull_volume(&points).unwrap_or(f64::NAN);
        assert_relative_eq!(volume, 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_cube_volume() {
        let volume = convex_hull_volume(&box_corners(1.0, 1.0, 1.0)).unwrap_or(f64::NAN);
        assert_relative_eq!(volume, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn interior_points_do_not_add_volume() {
        let mut points = box_corners(2.0, 1.0, 0.5);
        for i in 1..10 {
            for j in 1..10 {
                points.push(Point3::new(
                    f64::from(i) * 0.2,
                    f64::from(j) * 0.1,
                    f64::from(i + j) * 0.02,
                ));
            }
        }
        let volume = convex_hull_volume(&points).unwrap_or(f64::NAN);
        assert_relative_eq!(volume, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn surface_grid_of_box() {
        let mut points = Vec::new();
        for i in 0..=8 {
            for j in 0..=4 {
                for k in 0..=2 {
                    if i == 0 || i == 8 || j == 0 || j == 4 || k == 0 || k == 2 {
                        points.push(Point3::new(
                            f64::from(i) * 0.25,
                            f64::from(j) * 0.25,
                            f64::from(k) * 0.25,
                        ));
                    }
                }
            }
        }
        let volume = convex_hull_volume(&points).unwrap_or(f64::NAN);
        assert_relative_eq!(volume, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn octahedron_volume() {
        let points = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let volume = convex_hull_volume(&points).unwrap_or(f64::NAN);
        assert_relative_eq!(volume, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_inputs_have_zero_volume() {
        let coplanar: Vec<Point3<f64>> = (0..20)
            .map(|i| Point3::new(f64::from(i % 5), f64::from(i / 5), 0.0))
            .collect();
        assert_relative_eq!(convex_hull_volume(&coplanar).unwrap_or(f64::NAN), 0.0);

        let collinear: Vec<Point3<f64>> =
            (0..10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        assert_relative_eq!(convex_hull_volume(&collinear).unwrap_or(f64::NAN), 0.0);

        let coincident = vec![Point3::new(1.0, 2.0, 3.0); 6];
        assert_relative_eq!(convex_hull_volume(&coincident).unwrap_or(f64::NAN), 0.0);

        assert_relative_eq!(convex_hull_volume(&[]).unwrap_or(f64::NAN), 0.0);
    }

    #[test]
    fn non_finite_is_error() {
        let mut points = box_corners(1.0, 1.0, 1.0);
        points[3].y = f64::NAN;
        assert!(matches!(
            convex_hull_volume(&points),
            Err(MeasureError::VolumeFailed { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn volume_is_rigid_motion_invariant(
            roll in -3.0..3.0f64,
            pitch in -3.0..3.0f64,
            yaw in -3.0..3.0f64,
            shift in prop::array::uniform3(-50.0..50.0f64),
            interior in prop::collection::vec(prop::array::uniform3(0.05..0.95f64), 0..40),
        ) {
            let mut points = box_corners(1.0, 1.0, 1.0);
            points.extend(interior.iter().map(|&[x, y, z]| Point3::new(x, y, z)));

            let motion = Translation3::new(shift[0], shift[1], shift[2])
                * Rotation3::from_euler_angles(roll, pitch, yaw);
            let moved: Vec<Point3<f64>> = points.iter().map(|p| motion * p).collect();

            let volume = convex_hull_volume(&moved).unwrap_or(f64::NAN);
            prop_assert!((volume - 1.0).abs() < 1e-6);
        }
    }
}
