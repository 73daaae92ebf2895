//! Parallel, BFS-assisted surface rasterization
//!
//! For each triangle, either rasterizes its voxel AABB exhaustively (small triangles) or
//! BFS-marches outward from a seed voxel, testing collisions lazily (large triangles). One
//! task per triangle is submitted to the thread pool in the mesh's (already randomly
//! permuted, see [`crate::mesh::TriMesh3d::shuffle_triangles`]) triangle order; the caller
//! joins after all triangles have been submitted.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::bitgrid::{linear_index, BitGrid};
use crate::bounds::MeshBounds;
use crate::geometry::triangle_box_overlap;
use crate::mesh::TriMesh3d;
use crate::profile;
use crate::thread_pool::ThreadPool;
use crate::Real;

/// Below this minimum voxel-AABB extent, a triangle is rasterized exhaustively; at or above
/// it, the BFS march is used instead (spec §4.4).
const EXHAUSTIVE_RASTER_THRESHOLD: i64 = 100;

const NEIGHBOR_OFFSETS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Surface-voxelizes every triangle of `mesh` into `voxels`, submitting one task per
/// triangle to `thread_pool` and joining once all are submitted.
pub fn voxelize_surface<R: Real>(
    mesh: &TriMesh3d<R>,
    bounds: &MeshBounds<R>,
    voxels: &BitGrid,
    thread_pool: &ThreadPool,
) {
    profile!("surface_voxelization");
    debug!(
        "surface voxelization: {} triangles over a {}^3 grid",
        mesh.triangles().len(),
        bounds.resolution()
    );

    thread_pool.join_all(|scope| {
        for tri_idx in 0..mesh.triangles().len() {
            scope.submit(move || {
                voxelize_triangle(mesh, bounds, tri_idx, voxels);
            });
        }
    });
}

fn voxelize_triangle<R: Real>(
    mesh: &TriMesh3d<R>,
    bounds: &MeshBounds<R>,
    tri_idx: usize,
    voxels: &BitGrid,
) {
    let tri = mesh.triangle_vertices(tri_idx);
    let tri_aabb_lb = component_min(&tri);
    let tri_aabb_ub = component_max(&tri);

    let lb = bounds.world_to_voxel(&tri_aabb_lb);
    let ub = bounds.world_to_voxel(&tri_aabb_ub);

    let extent = |axis: usize| (ub[axis] as i64 - lb[axis] as i64);
    let smallest_extent = extent(0).min(extent(1)).min(extent(2));

    if smallest_extent < EXHAUSTIVE_RASTER_THRESHOLD {
        rasterize_exhaustive(bounds, &tri, lb, ub, voxels);
    } else {
        bfs_surface(bounds, &tri, lb, ub, voxels);
    }
}

fn rasterize_exhaustive<R: Real>(
    bounds: &MeshBounds<R>,
    tri: &[nalgebra::Vector3<R>; 3],
    lb: [usize; 3],
    ub: [usize; 3],
    voxels: &BitGrid,
) {
    let n = bounds.resolution();
    for x in lb[0]..=ub[0] {
        for y in lb[1]..=ub[1] {
            for z in lb[2]..=ub[2] {
                let idx = linear_index(x, y, z, n);
                if voxels.test(idx) {
                    continue;
                }
                let center = bounds.voxel_center([x, y, z]);
                if triangle_box_overlap(&center, bounds.half_unit(), tri) {
                    voxels.set_atomic(idx);
                }
            }
        }
    }
}

fn bfs_surface<R: Real>(
    bounds: &MeshBounds<R>,
    tri: &[nalgebra::Vector3<R>; 3],
    lb: [usize; 3],
    ub: [usize; 3],
    voxels: &BitGrid,
) {
    let n = bounds.resolution();
    let start = bounds.world_to_voxel(&tri[0]);
    let start_idx = linear_index(start[0], start[1], start[2], n);

    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();
    queue.push_back(start);
    visited.insert(start_idx);

    while let Some(voxel) = queue.pop_front() {
        let idx = linear_index(voxel[0], voxel[1], voxel[2], n);
        let center = bounds.voxel_center(voxel);
        let collides = voxels.test(idx) || triangle_box_overlap(&center, bounds.half_unit(), tri);
        if !collides {
            continue;
        }
        voxels.set_atomic(idx);

        for offset in &NEIGHBOR_OFFSETS {
            let Some(neighbor) = apply_offset(voxel, *offset, lb, ub) else {
                continue;
            };
            let neighbor_idx = linear_index(neighbor[0], neighbor[1], neighbor[2], n);
            if visited.insert(neighbor_idx) {
                queue.push_back(neighbor);
            }
        }
    }
}

/// Applies an integer axis offset to a voxel coordinate, returning `None` if the result
/// falls outside `[lb, ub]` on any axis.
fn apply_offset(
    voxel: [usize; 3],
    offset: [i64; 3],
    lb: [usize; 3],
    ub: [usize; 3],
) -> Option<[usize; 3]> {
    let mut out = [0usize; 3];
    for axis in 0..3 {
        let v = voxel[axis] as i64 + offset[axis];
        if v < lb[axis] as i64 || v > ub[axis] as i64 {
            return None;
        }
        out[axis] = v as usize;
    }
    Some(out)
}

fn component_min<R: Real>(tri: &[nalgebra::Vector3<R>; 3]) -> nalgebra::Vector3<R> {
    nalgebra::Vector3::new(
        tri[0].x.min(tri[1].x).min(tri[2].x),
        tri[0].y.min(tri[1].y).min(tri[2].y),
        tri[0].z.min(tri[1].z).min(tri[2].z),
    )
}

fn component_max<R: Real>(tri: &[nalgebra::Vector3<R>; 3]) -> nalgebra::Vector3<R> {
    nalgebra::Vector3::new(
        tri[0].x.max(tri[1].x).max(tri[2].x),
        tri[0].y.max(tri[1].y).max(tri[2].y),
        tri[0].z.max(tri[1].z).max(tri[2].z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube_mesh_n(n: usize) -> (TriMesh3d<f64>, MeshBounds<f64>, BitGrid) {
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
            [0, 1, 2], [0, 2, 3], // bottom
            [4, 6, 5], [4, 7, 6], // top
            [0, 4, 5], [0, 5, 1], // front
            [1, 5, 6], [1, 6, 2], // right
            [2, 6, 7], [2, 7, 3], // back
            [3, 7, 4], [3, 4, 0], // left
        ];
        let mesh = TriMesh3d::new(v, triangles);
        let bounds = MeshBounds::compute(&mesh, n).unwrap();
        let grid = BitGrid::new(n * n * n);
        (mesh, bounds, grid)
    }

    #[test]
    fn unit_cube_surface_marks_boundary_voxels() {
        let (mesh, bounds, voxels) = cube_mesh_n(4);
        let pool = ThreadPool::new(2).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);

        let n = bounds.resolution();
        let mut any_set = false;
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    if voxels.test(linear_index(x, y, z, n)) {
                        any_set = true;
                    }
                }
            }
        }
        assert!(any_set, "surface voxelization should mark at least one voxel");
    }

    #[test]
    fn single_triangle_in_one_voxel_sets_exactly_that_voxel() {
        // A tiny triangle fully inside a single voxel of a coarse grid.
        let v = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, 0.0, 0.0),
            Vector3::new(0.0, 0.1, 0.0),
        ];
        let mesh = TriMesh3d::new(v, vec![[0, 1, 2]]);
        let bounds = MeshBounds::compute(&mesh, 4).unwrap();
        let voxels = BitGrid::new(4 * 4 * 4);
        let pool = ThreadPool::new(1).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);

        let n = bounds.resolution();
        let set_voxels: Vec<_> = (0..n)
            .flat_map(|x| (0..n).flat_map(move |y| (0..n).map(move |z| (x, y, z))))
            .filter(|&(x, y, z)| voxels.test(linear_index(x, y, z, n)))
            .collect();
        assert!(!set_voxels.is_empty());
        for &(x, y, z) in &set_voxels {
            assert!(x <= bounds.mesh_vox_ub()[0]);
            assert!(y <= bounds.mesh_vox_ub()[1]);
            assert!(z <= bounds.mesh_vox_ub()[2]);
        }
    }

    #[test]
    fn surface_voxelization_is_idempotent() {
        let (mesh, bounds, voxels) = cube_mesh_n(6);
        let pool = ThreadPool::new(3).unwrap();
        voxelize_surface(&mesh, &bounds, &voxels, &pool);

        let n = bounds.resolution();
        let snapshot: Vec<bool> = (0..n * n * n).map(|i| voxels.test(i)).collect();

        voxelize_surface(&mesh, &bounds, &voxels, &pool);
        for i in 0..n * n * n {
            assert_eq!(voxels.test(i), snapshot[i]);
        }
    }
}
