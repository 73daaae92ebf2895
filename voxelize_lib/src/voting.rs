//! Per-voxel cornerness accumulator used by the polycube extractor
//!
//! For every set voxel whose 3x3x3 neighborhood is not entirely set (i.e. a boundary voxel),
//! casts three axis-aligned "streaks" of votes centered on it. Streaks concentrate along the
//! principal planar faces of an axis-aligned shape and peak near its corners. See spec §4.8.

use crate::binary_tensor::BinaryTensor;
use crate::profile;

/// Default mask half-width `K` used to cast each voting streak (spec §9: dataset-tuned,
/// exposed as a configuration parameter).
pub const DEFAULT_MASK_SIZE: i64 = 5;

/// Dense `N x N x N` accumulator of non-negative vote counts, row-major in `(x, y, z)`.
#[derive(Clone, Debug)]
pub struct VotingAccumulator {
    resolution: usize,
    cells: Vec<u32>,
}

impl VotingAccumulator {
    /// Runs the voting pass over `tensor` with mask half-width `mask_size`.
    pub fn build(tensor: &BinaryTensor, mask_size: i64) -> Self {
        profile!("voting");
        let n = tensor.resolution();
        let mut cells = vec![0u32; n * n * n];

        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    if !tensor.get(x, y, z) {
                        continue;
                    }
                    if tensor.neighborhood_count(x, y, z) == 27 {
                        continue;
                    }
                    for m in -mask_size..mask_size {
                        if let Some(mx) = shift(x, m, n) {
                            cells[mx * n * n + y * n + z] += 1;
                        }
                        if let Some(my) = shift(y, m, n) {
                            cells[x * n * n + my * n + z] += 1;
                        }
                        if let Some(mz) = shift(z, m, n) {
                            cells[x * n * n + y * n + mz] += 1;
                        }
                    }
                }
            }
        }

        Self { resolution: n, cells }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.cells[x * self.resolution * self.resolution + y * self.resolution + z]
    }
}

fn shift(v: usize, delta: i64, n: usize) -> Option<usize> {
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
    use crate::bitgrid::{linear_index, BitGrid};
    use crate::bounds::MeshBounds;
    use crate::mesh::TriMesh3d;
    use crate::surface_voxelizer::voxelize_surface;
    use crate::solid_filler::voxelize_solid;
    use crate::thread_pool::ThreadPool;
    use nalgebra::Vector3;

    fn box_mesh(lo: f64, hi: f64) -> TriMesh3d<f64> {
        let v = vec![
            Vector3::new(lo, lo, lo),
            Vector3::new(hi, lo, lo),
            Vector3::new(hi, hi, lo),
            Vector3::new(lo, hi, lo),
            Vector3::new(lo, lo, hi),
            Vector3::new(hi, lo, hi),
            Vector3::new(hi, hi, hi),
            Vector3::new(lo, hi, hi),
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
    fn votes_are_zero_for_fully_interior_voxels() {
        // A filled cube's strict interior has neighborhood count 27 everywhere except the
        // outermost shell, so interior voxels accumulate no votes.
        let mesh = box_mesh(0.0, 1.0);
        let bounds = MeshBounds::compute(&mesh, 20).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        let buffer = BitGrid::new(n * n * n);
        let pool = ThreadPool::new(2).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);
        voxelize_solid(&bounds, &voxels, &buffer, &pool);

        let tensor = BinaryTensor::build(&voxels, &bounds);
        let votes = VotingAccumulator::build(&tensor, DEFAULT_MASK_SIZE);

        let center = n / 2;
        assert_eq!(votes.get(center, center, center), 0);
    }

    #[test]
    fn boundary_voxel_accumulates_nonzero_votes() {
        let mesh = box_mesh(2.0, 14.0);
        let bounds = MeshBounds::compute(&mesh, 20).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        let buffer = BitGrid::new(n * n * n);
        let pool = ThreadPool::new(2).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);
        voxelize_solid(&bounds, &voxels, &buffer, &pool);

        let tensor = BinaryTensor::build(&voxels, &bounds);
        let votes = VotingAccumulator::build(&tensor, DEFAULT_MASK_SIZE);

        let lb = bounds.mesh_vox_lb();
        let total: u64 = (0..n * n * n)
            .map(|i| votes.cells[i] as u64)
            .sum();
        assert!(total > 0, "boundary of a non-degenerate box should cast votes");
        let _ = linear_index(lb[0], lb[1], lb[2], n);
    }

    #[test]
    fn increasing_mask_size_never_decreases_any_entry() {
        let mesh = box_mesh(3.0, 9.0);
        let bounds = MeshBounds::compute(&mesh, 16).unwrap();
        let n = bounds.resolution();
        let voxels = BitGrid::new(n * n * n);
        let buffer = BitGrid::new(n * n * n);
        let pool = ThreadPool::new(2).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);
        voxelize_solid(&bounds, &voxels, &buffer, &pool);

        let tensor = BinaryTensor::build(&voxels, &bounds);
        let small = VotingAccumulator::build(&tensor, 2);
        let large = VotingAccumulator::build(&tensor, 6);

        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    assert!(large.get(x, y, z) >= small.get(x, y, z));
                }
            }
        }
    }
}
