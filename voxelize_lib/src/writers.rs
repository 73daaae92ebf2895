//! Persistent output of the occupancy grid in three formats: dense-viewer ("binvox-like"),
//! compressed run-length binary, and sparse coordinate text. See spec §4.6/§6.
//!
//! Two historical quirks of the source are preserved bit-exact rather than fixed, per spec
//! §9's "open ambiguities to preserve, not guess": the compressed header writes `uz` twice
//! where the third value should read `ux` ([`write_compressed`]), and the dense-viewer
//! translate line swaps the y and z components to match the external binvox convention
//! ([`write_dense_viewer`]).

use std::io::{self, Write as IoWrite};

use crate::bitgrid::{linear_index, BitGrid};
use crate::bounds::MeshBounds;
use crate::errors::EngineError;
use crate::profile;
use crate::Real;

/// Writes the sparse coordinate-list format: a small ASCII header followed by one `"x y z"`
/// line per set voxel inside the mesh voxel AABB, in ascending lexicographic order.
///
/// If `voxels` is `None` (a caller that hit [`crate::errors::EngineError::MeshEmpty`] calling
/// this directly instead of through a [`crate::engine::VoxelEngine`]), emits only a header
/// with `N = 0` and an empty body, per spec.md §7.
pub fn write_sparse<R: Real, W: io::Write>(
    writer: &mut W,
    voxels: Option<(&BitGrid, &MeshBounds<R>)>,
) -> Result<(), EngineError> {
    profile!("write_sparse");
    let Some((voxels, bounds)) = voxels else {
        writeln!(writer, "0")?;
        writeln!(writer, "0 0 0")?;
        writeln!(writer, "0")?;
        return Ok(());
    };

    let n = bounds.resolution();
    let lb = bounds.mesh_lb();
    let voxel_size = *bounds.half_unit() * R::from(2).unwrap();

    writeln!(writer, "{n}")?;
    writeln!(writer, "{} {} {}", to_f64(lb.x), to_f64(lb.y), to_f64(lb.z))?;
    writeln!(writer, "{}", to_f64(voxel_size.x))?;

    let mesh_lb = bounds.mesh_vox_lb();
    let mesh_ub = bounds.mesh_vox_ub();
    for x in mesh_lb[0]..=mesh_ub[0] {
        for y in mesh_lb[1]..=mesh_ub[1] {
            for z in mesh_lb[2]..=mesh_ub[2] {
                if voxels.test(linear_index(x, y, z, n)) {
                    writeln!(writer, "{x} {y} {z}")?;
                }
            }
        }
    }
    Ok(())
}

/// Writes the compressed binary format: a header of one `i32` resolution, three `f64` lower
/// bound components, one `f64` voxel size, and six `i32` mesh voxel-AABB bounds written in
/// the source's order `lx ly lz uz uy uz` (the third upper bound is a repeated `uz`, not
/// `ux` — a preserved bug, not a typo here), followed by `(value, run)` byte pairs
/// run-length-encoding the mesh voxel AABB in ascending `(x, y, z)` order with runs capped at
/// 255.
pub fn write_compressed<R: Real, W: io::Write>(
    writer: &mut W,
    voxels: Option<(&BitGrid, &MeshBounds<R>)>,
) -> Result<(), EngineError> {
    profile!("write_compressed");
    let Some((voxels, bounds)) = voxels else {
        writer.write_all(&0i32.to_ne_bytes())?;
        for _ in 0..3 {
            writer.write_all(&0f64.to_ne_bytes())?;
        }
        writer.write_all(&0f64.to_ne_bytes())?;
        for _ in 0..6 {
            writer.write_all(&0i32.to_ne_bytes())?;
        }
        return Ok(());
    };

    let n = bounds.resolution();
    let lb = bounds.mesh_lb();
    let voxel_size = to_f64(bounds.half_unit().x) * 2.0;
    let mesh_lb = bounds.mesh_vox_lb();
    let mesh_ub = bounds.mesh_vox_ub();

    writer.write_all(&(n as i32).to_ne_bytes())?;
    writer.write_all(&to_f64(lb.x).to_ne_bytes())?;
    writer.write_all(&to_f64(lb.y).to_ne_bytes())?;
    writer.write_all(&to_f64(lb.z).to_ne_bytes())?;
    writer.write_all(&voxel_size.to_ne_bytes())?;

    writer.write_all(&(mesh_lb[0] as i32).to_ne_bytes())?;
    writer.write_all(&(mesh_lb[1] as i32).to_ne_bytes())?;
    writer.write_all(&(mesh_lb[2] as i32).to_ne_bytes())?;
    writer.write_all(&(mesh_ub[2] as i32).to_ne_bytes())?;
    writer.write_all(&(mesh_ub[1] as i32).to_ne_bytes())?;
    writer.write_all(&(mesh_ub[2] as i32).to_ne_bytes())?;

    write_rle_body(writer, voxels, n, mesh_lb, mesh_ub, mesh_lb, mesh_ub)
}

/// Writes the binvox-compatible dense-viewer format: an ASCII header followed by
/// `(value, run)` byte pairs run-length-encoding the *entire* `N^3` cube (not just the mesh
/// AABB) in `x`-outermost, `y`-middle, `z`-innermost order, with voxels outside the mesh
/// AABB always reading `0`.
pub fn write_dense_viewer<R: Real, W: io::Write>(
    writer: &mut W,
    voxels: Option<(&BitGrid, &MeshBounds<R>)>,
) -> Result<(), EngineError> {
    profile!("write_dense_viewer");
    let Some((voxels, bounds)) = voxels else {
        writeln!(writer, "#binvox 1")?;
        writeln!(writer, "dim 0 0 0")?;
        writeln!(writer, "translate 0 0 0")?;
        writeln!(writer, "scale 0")?;
        writeln!(writer, "data")?;
        return Ok(());
    };

    let n = bounds.resolution();
    let lb = bounds.mesh_lb();
    let extent = *bounds.world_ub() - *bounds.world_lb();
    let scale = to_f64(extent.norm());

    writeln!(writer, "#binvox 1")?;
    writeln!(writer, "dim {n} {n} {n}")?;
    // Translate line swaps the y and z components, matching the external binvox axis
    // convention; do not "fix" this to x,y,z order.
    writeln!(
        writer,
        "translate {} {} {}",
        -to_f64(lb.x),
        -to_f64(lb.z),
        -to_f64(lb.y)
    )?;
    writeln!(writer, "scale {scale}")?;
    writeln!(writer, "data")?;

    let full_lb = [0usize, 0, 0];
    let full_ub = [n - 1, n - 1, n - 1];
    let mesh_lb = bounds.mesh_vox_lb();
    let mesh_ub = bounds.mesh_vox_ub();
    write_rle_body(writer, voxels, n, full_lb, full_ub, mesh_lb, mesh_ub)
}

/// Shared run-length encoder: scans `[scan_lb, scan_ub]` in ascending `(x, y, z)` order,
/// treating a voxel as `0` whenever it falls outside `[mask_lb, mask_ub]`, and writes
/// `(value, run)` byte pairs with runs capped at 255 (a new run starts both when the value
/// changes and when a run would otherwise exceed that cap).
fn write_rle_body<W: io::Write>(
    writer: &mut W,
    voxels: &BitGrid,
    n: usize,
    scan_lb: [usize; 3],
    scan_ub: [usize; 3],
    mask_lb: [usize; 3],
    mask_ub: [usize; 3],
) -> Result<(), EngineError> {
    let in_mask = |x: usize, y: usize, z: usize| {
        x >= mask_lb[0]
            && x <= mask_ub[0]
            && y >= mask_lb[1]
            && y <= mask_ub[1]
            && z >= mask_lb[2]
            && z <= mask_ub[2]
    };
    let cell = |x: usize, y: usize, z: usize| -> u8 {
        if in_mask(x, y, z) && voxels.test(linear_index(x, y, z, n)) {
            1
        } else {
            0
        }
    };

    if scan_lb[0] > scan_ub[0] || scan_lb[1] > scan_ub[1] || scan_lb[2] > scan_ub[2] {
        return Ok(());
    }

    let mut x = scan_lb[0];
    let mut y = scan_lb[1];
    let mut z = scan_lb[2];
    loop {
        let value = cell(x, y, z);
        let mut count: u16 = 0;
        loop {
            count += 1;
            z += 1;
            if z > scan_ub[2] {
                z = scan_lb[2];
                y += 1;
                if y > scan_ub[1] {
                    y = scan_lb[1];
                    x += 1;
                }
            }
            if x > scan_ub[0] || count == 255 || (x <= scan_ub[0] && cell(x, y, z) != value) {
                break;
            }
        }
        writer.write_all(&[value, count as u8])?;
        if x > scan_ub[0] {
            break;
        }
    }
    Ok(())
}

fn to_f64<R: Real>(v: R) -> f64 {
    num::ToPrimitive::to_f64(&v).unwrap_or(0.0)
}
