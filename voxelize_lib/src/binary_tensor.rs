//! Dense N^3 boolean cube materialized from the final occupancy grid
//!
//! A `BinaryTensor` is a flattened, read-only snapshot of `voxels` restricted to the mesh
//! voxel AABB, built once after surface and solid voxelization have both completed. Kept
//! separate from [`crate::bitgrid::BitGrid`] because the voting and polycube stages need
//! plain boolean random access rather than atomic bit-test semantics.

use crate::bitgrid::{linear_index, BitGrid};
use crate::bounds::MeshBounds;
use crate::profile;
use crate::Real;

/// Dense `N x N x N` boolean cube, row-major in `(x, y, z)`.
#[derive(Clone, Debug)]
pub struct BinaryTensor {
    resolution: usize,
    cells: Vec<bool>,
}

impl BinaryTensor {
    /// Builds a tensor of side `n` from `voxels`, restricted to the mesh voxel AABB given by
    /// `bounds`; every cell outside that AABB is `false`.
    pub fn build<R: Real>(voxels: &BitGrid, bounds: &MeshBounds<R>) -> Self {
        profile!("binary_tensor");
        let n = bounds.resolution();
        let mut cells = vec![false; n * n * n];

        let lb = bounds.mesh_vox_lb();
        let ub = bounds.mesh_vox_ub();
        for x in lb[0]..=ub[0] {
            for y in lb[1]..=ub[1] {
                for z in lb[2]..=ub[2] {
                    let idx = linear_index(x, y, z, n);
                    if voxels.test(idx) {
                        cells[idx] = true;
                    }
                }
            }
        }

        Self { resolution: n, cells }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Returns the value at `(x, y, z)`, or `false` if any coordinate is out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        if x >= self.resolution || y >= self.resolution || z >= self.resolution {
            return false;
        }
        self.cells[linear_index(x, y, z, self.resolution)]
    }

    /// Counts set neighbors of `(x, y, z)` in the inclusive 3x3x3 window centered on it,
    /// including the cell itself, clamped at grid boundaries.
    pub fn neighborhood_count(&self, x: usize, y: usize, z: usize) -> usize {
        let mut sum = 0usize;
        for i in -1i64..=1 {
            for j in -1i64..=1 {
                for k in -1i64..=1 {
                    let (Some(nx), Some(ny), Some(nz)) = (
                        offset(x, i, self.resolution),
                        offset(y, j, self.resolution),
                        offset(z, k, self.resolution),
                    ) else {
                        continue;
                    };
                    if self.get(nx, ny, nz) {
                        sum += 1;
                    }
                }
            }
        }
        sum
    }
}

fn offset(v: usize, delta: i64, n: usize) -> Option<usize> {
    let out = v as i64 + delta;
    if out < 0 || out >= n as i64 {
        None
    } else {
        Some(out as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh3d;
    use crate::surface_voxelizer::voxelize_surface;
    use crate::thread_pool::ThreadPool;
    use nalgebra::Vector3;

    fn unit_cube_mesh() -> TriMesh3d<f64> {
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
        let triangles = vec![
            [0, 1, 2], [0, 2, 3],
            [4, 6, 5], [4, 7, 6],
            [0, 4, 5], [0, 5, 1],
            [1, 5, 6], [1, 6, 2],
            [2, 6, 7], [2, 7, 3],
            [3, 7, 4], [3, 4, 0],
        ];
        TriMesh3d::new(v, triangles)
    }

    #[test]
    fn tensor_matches_bitgrid_inside_mesh_aabb_and_is_false_outside() {
        let mesh = unit_cube_mesh();
        let bounds = MeshBounds::compute(&mesh, 4).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        let pool = ThreadPool::new(2).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);

        let tensor = BinaryTensor::build(&voxels, &bounds);
        let lb = bounds.mesh_vox_lb();
        let ub = bounds.mesh_vox_ub();
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let in_aabb = (lb[0]..=ub[0]).contains(&x)
                        && (lb[1]..=ub[1]).contains(&y)
                        && (lb[2]..=ub[2]).contains(&z);
                    if in_aabb {
                        assert_eq!(tensor.get(x, y, z), voxels.test(linear_index(x, y, z, n)));
                    } else {
                        assert!(!tensor.get(x, y, z));
                    }
                }
            }
        }
    }

    #[test]
    fn neighborhood_count_of_isolated_voxel_is_one() {
        let mesh = unit_cube_mesh();
        let bounds = MeshBounds::compute(&mesh, 4).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        voxels.set_atomic(linear_index(2, 2, 2, n));
        let tensor = BinaryTensor::build(&voxels, &bounds);
        assert_eq!(tensor.neighborhood_count(2, 2, 2), 1);
    }

    #[test]
    fn out_of_range_access_returns_false() {
        let mesh = unit_cube_mesh();
        let bounds = MeshBounds::compute(&mesh, 4).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        let tensor = BinaryTensor::build(&voxels, &bounds);
        assert!(!tensor.get(n, 0, 0));
    }
}
