//! Two-pass parallel exterior flood fill that turns a surface shell into a solid
//!
//! Pass 1 seeds a thin exterior shell by sweeping each of the three axis pairs from both
//! ends inward, stopping at the first surface hit. Pass 2 repeats the same sweeps, but now
//! kicks off a 6-connected BFS from every still-unmarked voxel it scans, flooding exterior
//! space through the mesh AABB. Finally `voxels` is overwritten with the complement of
//! `voxels_buffer`, turning "exterior" into "solid". See spec §4.5.

use std::collections::VecDeque;

use log::debug;

use crate::bitgrid::{linear_index, BitGrid};
use crate::bounds::MeshBounds;
use crate::profile;
use crate::thread_pool::ThreadPool;
use crate::Real;

const NEIGHBOR_OFFSETS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Runs the full two-pass solid fill, leaving `voxels` holding the solid (surface + interior)
/// occupancy and `voxels_buffer` holding the (now stale) exterior marks.
pub fn voxelize_solid<R: Real>(
    bounds: &MeshBounds<R>,
    voxels: &BitGrid,
    voxels_buffer: &BitGrid,
    thread_pool: &ThreadPool,
) {
    profile!("solid_fill");
    voxels_buffer.zero();

    debug!("solid fill pass 1 (seed exterior shell)");
    run_pass1(bounds, voxels, voxels_buffer, thread_pool);

    debug!("solid fill pass 2 (flood exterior)");
    run_pass2(bounds, voxels, voxels_buffer, thread_pool);

    debug!("solid fill: complementing exterior into solid occupancy");
    voxels.complement_into(voxels_buffer);
}

fn mesh_range<R: Real>(bounds: &MeshBounds<R>) -> ([usize; 3], [usize; 3]) {
    (bounds.mesh_vox_lb(), bounds.mesh_vox_ub())
}

fn run_pass1<R: Real>(
    bounds: &MeshBounds<R>,
    voxels: &BitGrid,
    voxels_buffer: &BitGrid,
    thread_pool: &ThreadPool,
) {
    let (lb, ub) = mesh_range(bounds);
    let n = bounds.resolution();

    thread_pool.join_all(|scope| {
        for x in lb[0]..=ub[0] {
            scope.submit(move || fill_yz(x, lb, ub, n, voxels, voxels_buffer));
        }
        for y in lb[1]..=ub[1] {
            scope.submit(move || fill_xz(y, lb, ub, n, voxels, voxels_buffer));
        }
        for z in lb[2]..=ub[2] {
            scope.submit(move || fill_xy(z, lb, ub, n, voxels, voxels_buffer));
        }
    });
}

fn run_pass2<R: Real>(
    bounds: &MeshBounds<R>,
    voxels: &BitGrid,
    voxels_buffer: &BitGrid,
    thread_pool: &ThreadPool,
) {
    let (lb, ub) = mesh_range(bounds);
    let n = bounds.resolution();

    thread_pool.join_all(|scope| {
        for x in lb[0]..=ub[0] {
            scope.submit(move || fill_yz_expand(x, lb, ub, n, voxels, voxels_buffer));
        }
        for z in lb[2]..=ub[2] {
            scope.submit(move || fill_xy_expand(z, lb, ub, n, voxels, voxels_buffer));
        }
        for y in lb[1]..=ub[1] {
            scope.submit(move || fill_xz_expand(y, lb, ub, n, voxels, voxels_buffer));
        }
    });
}

fn blocked(voxels: &BitGrid, voxels_buffer: &BitGrid, idx: usize) -> bool {
    voxels.test(idx) || voxels_buffer.test(idx)
}

/// Sweeps the YZ plane at fixed `x` from each of the two ends of the `y` range inward along
/// `z`; marks exterior voxels in `voxels_buffer` until the first surface hit.
fn fill_yz(x: usize, lb: [usize; 3], ub: [usize; 3], n: usize, voxels: &BitGrid, buffer: &BitGrid) {
    for y in lb[1]..=ub[1] {
        sweep_axis_yz(x, y, lb[2], ub[2], n, voxels, buffer);
    }
}

fn fill_xz(y: usize, lb: [usize; 3], ub: [usize; 3], n: usize, voxels: &BitGrid, buffer: &BitGrid) {
    for z in lb[2]..=ub[2] {
        sweep_axis_xz(y, z, lb[0], ub[0], n, voxels, buffer);
    }
}

fn fill_xy(z: usize, lb: [usize; 3], ub: [usize; 3], n: usize, voxels: &BitGrid, buffer: &BitGrid) {
    for x in lb[0]..=ub[0] {
        sweep_axis_xy(x, z, lb[1], ub[1], n, voxels, buffer);
    }
}

/// Sweeps ascending then descending along `z` for fixed `(x, y)`, stopping each direction at
/// the first surface hit (spec §4.5 Pass 1, ordering matters).
fn sweep_axis_yz(
    x: usize,
    y: usize,
    lz: usize,
    uz: usize,
    n: usize,
    voxels: &BitGrid,
    buffer: &BitGrid,
) {
    let mut z = lz;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if z == uz {
            return;
        }
        z += 1;
    }
    let mut z = uz;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if z == lz {
            return;
        }
        z -= 1;
    }
}

fn sweep_axis_xz(y: usize, z: usize, lx: usize, ux: usize, n: usize, voxels: &BitGrid, buffer: &BitGrid) {
    let mut x = lx;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if x == ux {
            return;
        }
        x += 1;
    }
    let mut x = ux;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if x == lx {
            return;
        }
        x -= 1;
    }
}

fn sweep_axis_xy(x: usize, z: usize, ly: usize, uy: usize, n: usize, voxels: &BitGrid, buffer: &BitGrid) {
    let mut y = ly;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if y == uy {
            return;
        }
        y += 1;
    }
    let mut y = uy;
    loop {
        let idx = linear_index(x, y, z, n);
        if voxels.test(idx) {
            break;
        }
        buffer.set_atomic(idx);
        if y == ly {
            return;
        }
        y -= 1;
    }
}

/// Pass 2: same YZ sweep as [`fill_yz`], but at every still-unmarked scanned voxel it kicks
/// off a BFS flood of the surrounding exterior space instead of marking a single cell.
fn fill_yz_expand(
    x: usize,
    lb: [usize; 3],
    ub: [usize; 3],
    n: usize,
    voxels: &BitGrid,
    buffer: &BitGrid,
) {
    for y in lb[1]..=ub[1] {
        let mut z = lb[2];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if z == ub[2] {
                break;
            }
            z += 1;
        }
        let mut z = ub[2];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if z == lb[2] {
                break;
            }
            z -= 1;
        }
    }
}

fn fill_xz_expand(
    y: usize,
    lb: [usize; 3],
    ub: [usize; 3],
    n: usize,
    voxels: &BitGrid,
    buffer: &BitGrid,
) {
    for z in lb[2]..=ub[2] {
        let mut x = lb[0];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if x == ub[0] {
                break;
            }
            x += 1;
        }
        let mut x = ub[0];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if x == lb[0] {
                break;
            }
            x -= 1;
        }
    }
}

fn fill_xy_expand(
    z: usize,
    lb: [usize; 3],
    ub: [usize; 3],
    n: usize,
    voxels: &BitGrid,
    buffer: &BitGrid,
) {
    for x in lb[0]..=ub[0] {
        let mut y = lb[1];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if y == ub[1] {
                break;
            }
            y += 1;
        }
        let mut y = ub[1];
        loop {
            let idx = linear_index(x, y, z, n);
            if voxels.test(idx) {
                break;
            }
            bfs_solid([x, y, z], lb, ub, n, voxels, buffer);
            if y == lb[1] {
                break;
            }
            y -= 1;
        }
    }
}

/// Floods exterior space by 6-connected BFS from `start`, confined to `[lb, ub]`. A voxel is
/// "blocked" (not exterior) if it is set in either `voxels` (surface) or `buffer` (already
/// flooded as exterior). Races between overlapping BFS frontiers from different slices cause
/// at worst duplicated work: the check-then-mark idiom plus atomic OR never produces an
/// incorrect mark (spec §4.5).
fn bfs_solid(
    start: [usize; 3],
    lb: [usize; 3],
    ub: [usize; 3],
    n: usize,
    voxels: &BitGrid,
    buffer: &BitGrid,
) {
    let start_idx = linear_index(start[0], start[1], start[2], n);
    if blocked(voxels, buffer, start_idx) {
        return;
    }

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(voxel) = queue.pop_front() {
        let idx = linear_index(voxel[0], voxel[1], voxel[2], n);
        if blocked(voxels, buffer, idx) {
            continue;
        }
        buffer.set_atomic(idx);

        for offset in &NEIGHBOR_OFFSETS {
            let Some(neighbor) = apply_offset(voxel, *offset, lb, ub) else {
                continue;
            };
            let neighbor_idx = linear_index(neighbor[0], neighbor[1], neighbor[2], n);
            if !blocked(voxels, buffer, neighbor_idx) {
                queue.push_back(neighbor);
            }
        }
    }
}

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
