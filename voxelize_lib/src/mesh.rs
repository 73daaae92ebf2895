//! Basic indexed triangle mesh type consumed by the voxelizer

use nalgebra::Vector3;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::aabb::AxisAlignedBoundingBox3d;
use crate::Real;

/// A triangle as a triple of vertex indices into the mesh's vertex buffer.
pub type TriangleConnectivity = [usize; 3];

/// An indexed triangle mesh: a vertex buffer and a list of triangles referencing it by index.
#[derive(Clone, Debug, Default)]
pub struct TriMesh3d<R: Real> {
    vertices: Vec<Vector3<R>>,
    triangles: Vec<TriangleConnectivity>,
}

impl<R: Real> TriMesh3d<R> {
    /// Constructs a mesh from raw vertex positions and triangle connectivity.
    pub fn new(vertices: Vec<Vector3<R>>, triangles: Vec<TriangleConnectivity>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    pub fn vertices(&self) -> &[Vector3<R>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[TriangleConnectivity] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Returns the three vertex positions of triangle `tri_idx`.
    pub fn triangle_vertices(&self, tri_idx: usize) -> [Vector3<R>; 3] {
        let [a, b, c] = self.triangles[tri_idx];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Computes the axis-aligned bounding box of all vertices.
    ///
    /// # Panics
    /// Panics if the mesh has no vertices; callers are expected to have already rejected
    /// empty meshes via [`crate::errors::EngineError::MeshEmpty`].
    pub fn aabb(&self) -> AxisAlignedBoundingBox3d<R> {
        AxisAlignedBoundingBox3d::from_points(&self.vertices)
    }

    /// Randomly permutes the triangle order in place, to spread work evenly across the
    /// thread pool regardless of the mesh's original triangle ordering.
    pub fn shuffle_triangles(&mut self) {
        self.triangles.shuffle(&mut thread_rng());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriMesh3d<f64> {
        TriMesh3d::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn triangle_vertices_looks_up_indices() {
        let mesh = unit_triangle();
        let tri = mesh.triangle_vertices(0);
        assert_eq!(tri[0], Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(tri[1], Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(tri[2], Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn empty_mesh_detection() {
        let mesh = TriMesh3d::<f64>::default();
        assert!(mesh.is_empty());
        assert!(!unit_triangle().is_empty());
    }

    #[test]
    fn shuffle_preserves_triangle_set() {
        let mut mesh = TriMesh3d::new(
            vec![
                Vector3::new(0.0f64, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2], [0, 2, 3]],
        );
        let before: std::collections::HashSet<_> = mesh.triangles().iter().copied().collect();
        mesh.shuffle_triangles();
        let after: std::collections::HashSet<_> = mesh.triangles().iter().copied().collect();
        assert_eq!(before, after);
        assert_eq!(mesh.triangles().len(), 3);
    }
}
