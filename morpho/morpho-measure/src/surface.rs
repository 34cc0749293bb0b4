//! Surface handles for the volume stage.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::error::{MeasureError, MeasureResult};
use crate::hull3d::convex_hull_volume;

/// A decoded scan surface that can report its own volume.
///
/// Implementations come from whatever decoded the scan file. The volume
/// stage only needs these three capabilities.
pub trait VolumeSurface {
    /// Returns true if the surface encloses a well-defined volume.
    fn is_closed_volume(&self) -> bool;

    /// Enclosed volume, in the surface's own units.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::VolumeFailed`] if the volume cannot be computed.
    fn volume(&self) -> MeasureResult<f64>;

    /// Volume of the surface's convex hull, in the surface's own units.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::VolumeFailed`] if the hull cannot be computed.
    fn convex_hull_volume(&self) -> MeasureResult<f64>;
}

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triplets.
    pub faces: Vec<[usize; 3]>,
}

impl SurfaceMesh {
    /// Create a mesh from vertices and faces.
    #[must_use]
    pub const fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Check that every face references an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::VolumeFailed`] naming the first bad face.
    pub fn check_indices(&self) -> MeasureResult<()> {
        let count = self.vertices.len();
        match self
            .faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= count))
        {
            Some((index, face)) => Err(MeasureError::volume_failed(format!(
                "face {index} references vertex {} of {count}",
                face.iter().copied().max().unwrap_or_default()
            ))),
            None => Ok(()),
        }
    }

    /// Signed volume by the divergence theorem; positive for outward winding.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::VolumeFailed`] for out-of-range face indices.
    pub fn signed_volume(&self) -> MeasureResult<f64> {
        self.check_indices()?;

        let mut volume = 0.0;
        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0].coords;
            let v1 = &self.vertices[i1].coords;
            let v2 = &self.vertices[i2].coords;
            volume += v0.dot(&v1.cross(v2));
        }
        Ok(volume / 6.0)
    }
}

impl VolumeSurface for SurfaceMesh {
    /// True when the mesh has faces and every undirected edge is shared by
    /// exactly two of them.
    fn is_closed_volume(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }

        let mut edge_faces: HashMap<(usize, usize), usize> = HashMap::new();
        for &[a, b, c] in &self.faces {
            if a == b || b == c || c == a {
                return false;
            }
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *edge_faces.entry((u.min(v), u.max(v))).or_default() += 1;
            }
        }
        edge_faces.values().all(|&count| count == 2)
    }

    fn volume(&self) -> MeasureResult<f64> {
        if self.faces.is_empty() {
            return Err(MeasureError::volume_failed("mesh has no faces"));
        }
        let volume = self.signed_volume()?.abs();
        if volume.is_finite() {
            Ok(volume)
        } else {
            Err(MeasureError::volume_failed("non-finite enclosed volume"))
        }
    }

    fn convex_hull_volume(&self) -> MeasureResult<f64> {
        convex_hull_volume(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Box `[0,lx] x [0,ly] x [0,lz]` with outward-wound faces.
    fn box_mesh(lx: f64, ly: f64, lz: f64) -> SurfaceMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(lx, 0.0, 0.0),
            Point3::new(lx, ly, 0.0),
            Point3::new(0.0, ly, 0.0),
            Point3::new(0.0, 0.0, lz),
            Point3::new(lx, 0.0, lz),
            Point3::new(lx, ly, lz),
            Point3::new(0.0, ly, lz),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        SurfaceMesh::new(vertices, faces)
    }

    #[test]
    fn closed_box_is_watertight() {
        let mesh = box_mesh(2.0, 1.0, 0.5);
        assert!(mesh.is_closed_volume());
        assert_relative_eq!(mesh.signed_volume().unwrap_or(f64::NAN), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.volume().unwrap_or(f64::NAN), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn open_box_is_not_watertight() {
        let mut mesh = box_mesh(2.0, 1.0, 0.5);
        mesh.faces.truncate(10);
        assert!(!mesh.is_closed_volume());
        assert_relative_eq!(mesh.convex_hull_volume().unwrap_or(f64::NAN), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverted_winding_gives_positive_volume() {
        let mut mesh = box_mesh(1.0, 1.0, 1.0);
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        assert!(mesh.signed_volume().unwrap_or(f64::NAN) < 0.0);
        assert_relative_eq!(mesh.volume().unwrap_or(f64::NAN), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_face_is_not_watertight() {
        let mut mesh = box_mesh(1.0, 1.0, 1.0);
        mesh.faces.push([0, 0, 1]);
        assert!(!mesh.is_closed_volume());
    }

    #[test]
    fn empty_mesh() {
        let mesh = SurfaceMesh::default();
        assert!(!mesh.is_closed_volume());
        assert!(mesh.volume().is_err());
        assert_relative_eq!(mesh.convex_hull_volume().unwrap_or(f64::NAN), 0.0);
    }

    #[test]
    fn bad_index_is_error() {
        let mut mesh = box_mesh(1.0, 1.0, 1.0);
        mesh.faces.push([0, 1, 99]);
        let err = mesh.volume();
        assert!(matches!(err, Err(MeasureError::VolumeFailed { .. })));
        assert!(
            err.map_err(|e| e.to_string())
                .err()
                .is_some_and(|msg| msg.contains("face 12 references vertex 99 of 8"))
        );
    }
}
