//!
//! Library for voxelizing closed triangle meshes and extracting an axis-aligned
//! polycube approximation. Entry point is the [VoxelEngine] type and the
//! [voxelize] convenience function.
//!

/// Re-export the version of coarse_prof used by this crate, if profiling is enabled
#[cfg(feature = "profiling")]
pub use coarse_prof;
/// Re-export the version of nalgebra used by this crate
pub use nalgebra;
/// Re-export the version of rayon used by this crate
pub use rayon;

#[cfg(feature = "profiling")]
/// Invokes coarse_prof::profile! with the given expression
macro_rules! profile {
    ($body:expr) => {
        coarse_prof::profile!($body);
    };
}

#[cfg(not(feature = "profiling"))]
/// No-op macro if profiling is disabled
macro_rules! profile {
    ($body:expr) => {
        $body
    };
}

pub(crate) use profile;

mod aabb;
/// Dense N^3 boolean cube materialized from the final occupancy grid
pub mod binary_tensor;
/// Fixed-size packed occupancy grid with atomic OR writes
pub mod bitgrid;
/// Computation of the mesh axis-aligned bounding box and the cubic voxelization bound
pub mod bounds;
/// Top-level engine tying together bounds, grids, thread pool and the pipeline stages
pub mod engine;
/// Error types surfaced by the public operations
pub mod errors;
/// Triangle / AABB overlap test used by the surface voxelizer
pub mod geometry;
/// Basic indexed triangle mesh type
pub mod mesh;
/// Numeric trait aliases used throughout the crate
mod numeric_types;
/// Axis-aligned polycube extraction (voting, corner detection, block growth)
pub mod polycube;
/// Two-pass parallel exterior flood fill that turns a surface shell into a solid
pub mod solid_filler;
/// Parallel, BFS-assisted surface rasterization
pub mod surface_voxelizer;
/// Bounded worker pool built on top of a private rayon thread pool
pub mod thread_pool;
/// Per-voxel cornerness accumulator used by the polycube extractor
pub mod voting;
/// Persistent output of the occupancy grid in three formats
pub mod writers;

pub use aabb::AxisAlignedBoundingBox3d;
pub use engine::VoxelEngine;
pub use errors::EngineError;
pub use numeric_types::{Real, ThreadSafe};
pub use polycube::PolycubeParams;

use crate::mesh::TriMesh3d;

// TODO: expose a sparse/octree-backed grid variant for higher resolutions
// TODO: stream writer output instead of buffering the whole RLE body in memory

/// Initializes the global thread pool used by this library with the given number of
/// worker threads.
///
/// Initialization of the global thread pool happens exactly once. If you call
/// `initialize_thread_pool` a second time, it will return an error. An `Ok` result
/// indicates that this is the first initialization of the thread pool.
pub fn initialize_thread_pool(num_threads: usize) -> Result<(), anyhow::Error> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    Ok(())
}

/// Performs the full surface + solid voxelization of `mesh` into a grid of the given
/// resolution, using a worker pool of `num_threads` threads. Convenience wrapper around
/// [VoxelEngine::new], [VoxelEngine::voxelize_surface] and [VoxelEngine::voxelize_solid].
pub fn voxelize<R: Real>(
    resolution: usize,
    num_threads: usize,
    mesh: TriMesh3d<R>,
) -> Result<VoxelEngine<R>, EngineError> {
    let mut engine = VoxelEngine::new(resolution, num_threads, mesh)?;
    engine.voxelize_surface();
    engine.voxelize_solid();
    Ok(engine)
}

