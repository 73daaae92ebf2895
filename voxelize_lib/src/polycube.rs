//! Axis-aligned polycube extraction: corner detection followed by block growth
//!
//! Deliberately heuristic and tuned to the shapes the source pipeline was built for (a
//! dataset of car meshes): it picks a single "best" Y-slice, derives an X extent from the
//! median of per-z first/last hits at that slice, and keeps only the top few voting peaks
//! along Y and Z at the midpoint of that extent as candidate corners. See spec §4.9.

use crate::binary_tensor::BinaryTensor;
use crate::profile;
use crate::voting::VotingAccumulator;

/// Configuration for [`extract_polycube`]. Defaults reproduce the source behavior (spec §9):
/// the number of Y-plane and Z-plane corner candidates, and the block-growth neighborhood
/// radius used both when clamping votes and when sampling around a block's barycenter.
#[derive(Clone, Copy, Debug)]
pub struct PolycubeParams {
    /// Number of Y-axis corner candidates kept, highest vote first.
    pub y_levels: usize,
    /// Number of Z-axis corner candidates kept, highest vote first.
    pub z_levels: usize,
    /// Mask half-width used by the voting pass that must have already produced the
    /// [`VotingAccumulator`] passed to [`extract_polycube`]; recorded here only so callers
    /// that build both in one call can share a single source of truth.
    pub mask_size: i64,
    /// Half-width of the barycenter sampling window used during block growth.
    pub region_size: i64,
}

impl Default for PolycubeParams {
    fn default() -> Self {
        Self {
            y_levels: 3,
            z_levels: 8,
            mask_size: crate::voting::DEFAULT_MASK_SIZE,
            region_size: 1,
        }
    }
}

/// Corner-flag grid produced by [`find_borders`]: `true` marks a candidate polycube corner.
#[derive(Clone, Debug)]
pub struct CornerGrid {
    resolution: usize,
    cells: Vec<bool>,
}

impl CornerGrid {
    fn new(n: usize) -> Self {
        Self {
            resolution: n,
            cells: vec![false; n * n * n],
        }
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[self.index(x, y, z)]
    }

    fn set(&mut self, x: usize, y: usize, z: usize) {
        let idx = self.index(x, y, z);
        self.cells[idx] = true;
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x * self.resolution * self.resolution + y * self.resolution + z
    }
}

/// Dense filled polycube output: `true` marks a voxel covered by some axis-aligned block.
#[derive(Clone, Debug)]
pub struct Polycube {
    resolution: usize,
    cells: Vec<bool>,
}

impl Polycube {
    fn new(n: usize) -> Self {
        Self {
            resolution: n,
            cells: vec![false; n * n * n],
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[x * self.resolution * self.resolution + y * self.resolution + z]
    }

    fn fill_block(&mut self, lb: [usize; 3], ub_exclusive: [usize; 3]) {
        let n = self.resolution;
        for x in lb[0]..ub_exclusive[0].min(n) {
            for y in lb[1]..ub_exclusive[1].min(n) {
                for z in lb[2]..ub_exclusive[2].min(n) {
                    self.cells[x * n * n + y * n + z] = true;
                }
            }
        }
    }
}

/// Picks the densest Y-slice, derives the X extent at that slice from the median of
/// per-z first/last occupied voxels, then records the `y_levels` highest Y-votes and
/// `z_levels` highest Z-votes (projected at the X extent's midpoint) as a 2·y_levels·z_levels
/// corner-flag grid at `x_init` and `x_final` (spec §4.9 steps 1-5).
pub fn find_borders(tensor: &BinaryTensor, votes: &VotingAccumulator, params: &PolycubeParams) -> CornerGrid {
    profile!("find_borders");
    let n = tensor.resolution();

    let y_star = densest_y_slice(tensor, n);
    let (x_init, x_final) = x_extent_at_slice(tensor, n, y_star);
    let x_mid = (x_init + x_final) / 2;

    let mut mean_y = vec![0f64; n];
    let mut mean_z = vec![0f64; n];
    for j in 0..n {
        let mut sum_y = 0f64;
        let mut sum_z = 0f64;
        for k in 0..n {
            sum_y += votes.get(x_mid, j, k) as f64;
            sum_z += votes.get(x_mid, k, j) as f64;
        }
        mean_y[j] = sum_y / n as f64;
        mean_z[j] = sum_z / n as f64;
    }

    let ys = top_indices(&mut mean_y, params.y_levels);
    let zs = top_indices(&mut mean_z, params.z_levels);

    let mut output = CornerGrid::new(n);
    for &x in &[x_init, x_final] {
        for &y in &ys {
            for &z in &zs {
                output.set(x, y, z);
            }
        }
    }
    output
}

fn densest_y_slice(tensor: &BinaryTensor, n: usize) -> usize {
    let mut best_y = 0;
    let mut best_count = -1i64;
    for y in 0..n {
        let mut count = 0i64;
        for x in 0..n {
            for z in 0..n {
                if tensor.get(x, y, z) {
                    count += 1;
                }
            }
        }
        if count > best_count {
            best_count = count;
            best_y = y;
        }
    }
    best_y
}

fn x_extent_at_slice(tensor: &BinaryTensor, n: usize, y: usize) -> (usize, usize) {
    let mut inits = Vec::new();
    let mut finals = Vec::new();

    for z in 0..n {
        if let Some(first_x) = (0..n).find(|&x| tensor.get(x, y, z)) {
            let mut last_x = first_x;
            while last_x + 1 < n && tensor.get(last_x + 1, y, z) {
                last_x += 1;
            }
            inits.push(first_x);
            finals.push(last_x);
        }
    }

    if inits.is_empty() {
        return (0, 0);
    }

    inits.sort_unstable();
    finals.sort_unstable();
    let median = inits.len() / 2;
    (inits[median], finals[median])
}

/// Returns the indices of the `count` largest entries of `values`, highest first, zeroing
/// each entry as it is picked so the next iteration finds the next-highest (mirrors the
/// source's destructive "delete the maxima" scan).
fn top_indices(values: &mut [f64], count: usize) -> Vec<usize> {
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let mut best_idx = 0;
        let mut best_val = 0f64;
        for (idx, &v) in values.iter().enumerate() {
            if v > best_val {
                best_val = v;
                best_idx = idx;
            }
        }
        picked.push(best_idx);
        values[best_idx] = 0.0;
    }
    picked
}

/// Grows filled axis-aligned blocks from each corner of `edges`: for each set corner,
/// finds the nearest set corner along `+x`, `+y`, `+z`, samples a 3x3x3 window around the
/// resulting block's barycenter, and fills the block if any sampled cell is set in `tensor`
/// or if an opposite corner was missing on any axis (the source always fills in that case;
/// preserved here as a documented heuristic rather than re-derived). See spec §4.9 step 6.
pub fn build_polycube(edges: &CornerGrid, tensor: &BinaryTensor, params: &PolycubeParams) -> Polycube {
    profile!("build_polycube");
    let n = edges.resolution;
    let mut output = Polycube::new(n);
    let r = params.region_size.max(1);

    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                if !edges.get(i, j, k) {
                    continue;
                }

                let (itr_i, found_i) = next_set_along_x(edges, i, j, k, n);
                let (itr_j, found_j) = next_set_along_y(edges, i, j, k, n);
                let (itr_k, found_k) = next_set_along_z(edges, i, j, k, n);
                let all_found = found_i && found_j && found_k;

                let bary_x = (itr_i + i) / 2;
                let bary_y = (itr_j + j) / 2;
                let bary_z = (itr_k + k) / 2;

                let mut should_fill = all_found;
                if !should_fill {
                    'search: for dq in -r..=r {
                        for dw in -r..=r {
                            for de in -r..=r {
                                let (Some(bx), Some(by), Some(bz)) = (
                                    offset(bary_x, dq, n),
                                    offset(bary_y, dw, n),
                                    offset(bary_z, de, n),
                                ) else {
                                    continue;
                                };
                                if tensor.get(bx, by, bz) {
                                    should_fill = true;
                                    break 'search;
                                }
                            }
                        }
                    }
                }

                if should_fill {
                    output.fill_block([i, j, k], [itr_i, itr_j, itr_k]);
                }
            }
        }
    }

    output
}

fn offset(v: usize, delta: i64, n: usize) -> Option<usize> {
    let out = v as i64 + delta;
    if out < 0 || out >= n as i64 {
        None
    } else {
        Some(out as usize)
    }
}

fn next_set_along_x(edges: &CornerGrid, i: usize, j: usize, k: usize, n: usize) -> (usize, bool) {
    let mut itr = i + 1;
    while itr < n && !edges.get(itr, j, k) {
        itr += 1;
    }
    let found = itr < n;
    (itr.min(n.saturating_sub(1)), found)
}

fn next_set_along_y(edges: &CornerGrid, i: usize, j: usize, k: usize, n: usize) -> (usize, bool) {
    let mut itr = j + 1;
    while itr < n && !edges.get(i, itr, k) {
        itr += 1;
    }
    let found = itr < n;
    (itr.min(n.saturating_sub(1)), found)
}

fn next_set_along_z(edges: &CornerGrid, i: usize, j: usize, k: usize, n: usize) -> (usize, bool) {
    let mut itr = k + 1;
    while itr < n && !edges.get(i, j, itr) {
        itr += 1;
    }
    let found = itr < n;
    (itr.min(n.saturating_sub(1)), found)
}
