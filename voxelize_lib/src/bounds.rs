//! Computation of the mesh axis-aligned bounding box and the cubic voxelization bound

use nalgebra::Vector3;
use num::ToPrimitive;

use crate::errors::EngineError;
use crate::mesh::TriMesh3d;
use crate::Real;

/// Padding applied to the raw mesh AABB before it is used to derive the world bound,
/// guarding against triangles lying exactly on a voxel boundary.
pub fn epsilon<R: Real>() -> R {
    R::from(1e-4).expect("1e-4 must be representable in the chosen Real type")
}

/// Immutable grid geometry derived once from the mesh and the chosen resolution `N`.
///
/// See spec §3/§4.2: the mesh AABB is padded by `epsilon`, then expanded to the smallest
/// cube containing it (`world_lb`/`world_ub`), from which the per-axis voxel half-size and
/// the mesh's own voxel-index bounds are derived.
#[derive(Clone, Debug)]
pub struct MeshBounds<R: Real> {
    resolution: usize,
    world_lb: Vector3<R>,
    world_ub: Vector3<R>,
    half_unit: Vector3<R>,
    mesh_lb: Vector3<R>,
    mesh_ub: Vector3<R>,
    mesh_vox_lb: [usize; 3],
    mesh_vox_ub: [usize; 3],
}

impl<R: Real> MeshBounds<R> {
    /// Computes bounds for `mesh` at grid resolution `n`.
    ///
    /// Returns [`EngineError::GridConstruction`] if the padded mesh AABB collapses to a
    /// single point along every axis (e.g. a mesh with a single distinct vertex position).
    pub fn compute(mesh: &TriMesh3d<R>, n: usize) -> Result<Self, EngineError> {
        let raw_aabb = mesh.aabb();
        let padded = raw_aabb.padded(epsilon());
        let (m, mx) = padded.cubic_extent();

        if mx <= m {
            return Err(EngineError::GridConstruction(
                "mesh bounding box is degenerate".to_string(),
            ));
        }

        let world_lb = Vector3::new(m, m, m);
        let world_ub = Vector3::new(mx, mx, mx);
        let n_r = R::from(n).expect("grid resolution must be representable in Real type");
        let two = R::from(2).expect("2 must be representable in Real type");
        let half_unit = (world_ub - world_lb) / (two * n_r);

        let mesh_lb = *padded.min();
        let mesh_ub = *padded.max();

        let mesh_vox_lb = world_to_voxel(&mesh_lb, &world_lb, &world_ub, n);
        let mesh_vox_ub = world_to_voxel(&mesh_ub, &world_lb, &world_ub, n);

        Ok(Self {
            resolution: n,
            world_lb,
            world_ub,
            half_unit,
            mesh_lb,
            mesh_ub,
            mesh_vox_lb,
            mesh_vox_ub,
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn world_lb(&self) -> &Vector3<R> {
        &self.world_lb
    }

    pub fn world_ub(&self) -> &Vector3<R> {
        &self.world_ub
    }

    pub fn half_unit(&self) -> &Vector3<R> {
        &self.half_unit
    }

    pub fn mesh_lb(&self) -> &Vector3<R> {
        &self.mesh_lb
    }

    pub fn mesh_ub(&self) -> &Vector3<R> {
        &self.mesh_ub
    }

    pub fn mesh_vox_lb(&self) -> [usize; 3] {
        self.mesh_vox_lb
    }

    pub fn mesh_vox_ub(&self) -> [usize; 3] {
        self.mesh_vox_ub
    }

    /// Converts a world-space point to an integer voxel index, clamped into `[0, N)` on
    /// every axis so that points exactly on the world bound never produce an out-of-range
    /// index.
    pub fn world_to_voxel(&self, p: &Vector3<R>) -> [usize; 3] {
        world_to_voxel(p, &self.world_lb, &self.world_ub, self.resolution)
    }

    /// Converts a voxel's lower corner back into world-space coordinates.
    pub fn voxel_to_world(&self, voxel: [usize; 3]) -> Vector3<R> {
        let n_r = R::from(self.resolution).unwrap();
        let span = self.world_ub - self.world_lb;
        Vector3::new(
            self.world_lb.x + span.x * R::from(voxel[0]).unwrap() / n_r,
            self.world_lb.y + span.y * R::from(voxel[1]).unwrap() / n_r,
            self.world_lb.z + span.z * R::from(voxel[2]).unwrap() / n_r,
        )
    }

    /// World-space center of the given voxel's cube.
    pub fn voxel_center(&self, voxel: [usize; 3]) -> Vector3<R> {
        self.voxel_to_world(voxel) + self.half_unit
    }
}

fn world_to_voxel<R: Real>(
    p: &Vector3<R>,
    world_lb: &Vector3<R>,
    world_ub: &Vector3<R>,
    n: usize,
) -> [usize; 3] {
    let span = *world_ub - *world_lb;
    let n_r = R::from(n).unwrap();
    let n_minus_one = n.saturating_sub(1);
    let axis = |p_axis: R, lb_axis: R, span_axis: R| -> usize {
        let v = ((p_axis - lb_axis) * n_r / span_axis).floor();
        let v = if v < R::zero() { 0 } else { v.to_usize().unwrap_or(n_minus_one) };
        v.min(n_minus_one)
    };
    [
        axis(p.x, world_lb.x, span.x),
        axis(p.y, world_lb.y, span.y),
        axis(p.z, world_lb.z, span.z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_mesh() -> TriMesh3d<f64> {
        // Unit cube [0,1]^3 worth of vertices, faces don't matter for bounds.
        let v = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ];
        TriMesh3d::new(v, vec![[0, 1, 2]])
    }

    #[test]
    fn cube_bounds_are_isotropic_and_padded() {
        let mesh = cube_mesh();
        let bounds = MeshBounds::compute(&mesh, 8).unwrap();
        let eps = epsilon::<f64>();
        assert!((bounds.world_lb().x - (-eps)).abs() < 1e-12);
        assert!((bounds.world_ub().x - (1.0 + eps)).abs() < 1e-12);
        // Cubic: all axes share the same bound.
        assert_eq!(bounds.world_lb().x, bounds.world_lb().y);
        assert_eq!(bounds.world_lb().x, bounds.world_lb().z);
    }

    #[test]
    fn mesh_voxel_bounds_are_in_range() {
        let mesh = cube_mesh();
        let n = 8;
        let bounds = MeshBounds::compute(&mesh, n).unwrap();
        for axis in 0..3 {
            assert!(bounds.mesh_vox_lb()[axis] <= bounds.mesh_vox_ub()[axis]);
            assert!(bounds.mesh_vox_ub()[axis] < n);
        }
    }

    #[test]
    fn degenerate_mesh_is_rejected() {
        let mesh = TriMesh3d::new(
            vec![Vector3::new(1.0, 1.0, 1.0); 3],
            vec![[0, 1, 2]],
        );
        assert!(matches!(
            MeshBounds::compute(&mesh, 8),
            Err(EngineError::GridConstruction(_))
        ));
    }

    #[test]
    fn world_to_voxel_clamps_to_grid() {
        let mesh = cube_mesh();
        let bounds = MeshBounds::compute(&mesh, 4).unwrap();
        let far = Vector3::new(1000.0, 1000.0, 1000.0);
        let voxel = bounds.world_to_voxel(&far);
        assert!(voxel.iter().all(|&c| c < 4));
    }
}
