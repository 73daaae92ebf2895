//! Top-level engine tying together bounds, grids, thread pool and the pipeline stages
//!
//! [`VoxelEngine`] owns everything allocated once per run (mesh, bounds, the two `BitGrid`s
//! and the thread pool) and exposes the barrier-separated public operations from spec.md
//! §5: `voxelize_surface` then `voxelize_solid` then on-demand `binary_tensor`/`voting`/
//! `polycube` and the three writers. Mirrors the role `splashsurf_lib`'s top-level
//! `reconstruct_surface` entry point plays for its own pipeline, but as a long-lived value
//! rather than a single free function, since this pipeline has more independently queryable
//! post-processing stages (binary tensor, voting, polycube).
//!
//! A mesh with zero vertices or zero triangles is rejected at construction with
//! [`EngineError::MeshEmpty`] (spec.md §7's `MeshLoadError` is "surfaced to caller"); there is
//! no constructible no-op engine state. Spec.md §7's other half — "all subsequent write
//! operations emit empty headers and zero bodies" — is satisfied by [`crate::writers`]'s free
//! functions directly, which accept `None` in place of a populated grid; callers that hit
//! [`EngineError::MeshEmpty`] call those directly instead of going through a `VoxelEngine`
//! (see `voxelize_cli`'s `main.rs` for the pattern).

use log::info;

use crate::binary_tensor::BinaryTensor;
use crate::bitgrid::BitGrid;
use crate::bounds::MeshBounds;
use crate::errors::EngineError;
use crate::mesh::TriMesh3d;
use crate::polycube::{self, CornerGrid, Polycube, PolycubeParams};
use crate::solid_filler;
use crate::surface_voxelizer;
use crate::thread_pool::ThreadPool;
use crate::voting::VotingAccumulator;
use crate::writers;
use crate::Real;

/// Owns the mesh, grid geometry, occupancy grids and worker pool for one voxelization run.
///
/// Constructed once per mesh via [`VoxelEngine::new`], which rejects an empty mesh outright;
/// every `VoxelEngine` that exists therefore has a non-empty mesh and populated bounds.
pub struct VoxelEngine<R: Real> {
    thread_pool: ThreadPool,
    state: MeshState<R>,
}

struct MeshState<R: Real> {
    mesh: TriMesh3d<R>,
    bounds: MeshBounds<R>,
    voxels: BitGrid,
    voxels_buffer: BitGrid,
}

impl<R: Real> VoxelEngine<R> {
    /// Constructs the engine for `mesh` at grid resolution `resolution`, using a worker pool
    /// of `num_threads` threads.
    ///
    /// Returns [`EngineError::InvalidParameter`] if `resolution < 1` or `num_threads < 1`,
    /// [`EngineError::MeshEmpty`] if `mesh` has zero vertices or zero triangles, or
    /// [`EngineError::GridConstruction`] if the mesh's bounding box is degenerate.
    pub fn new(resolution: usize, num_threads: usize, mut mesh: TriMesh3d<R>) -> Result<Self, EngineError> {
        if resolution < 1 {
            return Err(EngineError::InvalidParameter {
                message: format!("grid resolution must be >= 1, got {resolution}"),
            });
        }
        if mesh.is_empty() {
            return Err(EngineError::MeshEmpty);
        }
        let thread_pool = ThreadPool::new(num_threads)?;

        mesh.shuffle_triangles();
        let bounds = MeshBounds::compute(&mesh, resolution)?;
        let capacity = resolution * resolution * resolution;
        let voxels = BitGrid::new(capacity);
        let voxels_buffer = BitGrid::new(capacity);

        info!(
            "voxel engine constructed: {} vertices, {} triangles, {resolution}^3 grid, {num_threads} threads",
            mesh.vertices().len(),
            mesh.triangles().len()
        );

        Ok(Self {
            thread_pool,
            state: MeshState {
                mesh,
                bounds,
                voxels,
                voxels_buffer,
            },
        })
    }

    /// The grid resolution `N`.
    pub fn resolution(&self) -> usize {
        self.state.bounds.resolution()
    }

    /// The derived grid bounds.
    pub fn bounds(&self) -> &MeshBounds<R> {
        &self.state.bounds
    }

    /// Runs the parallel surface voxelization pass (spec.md §4.4). Idempotent: calling this
    /// twice leaves `voxels` unchanged (OR is idempotent).
    pub fn voxelize_surface(&mut self) {
        let state = &self.state;
        surface_voxelizer::voxelize_surface(&state.mesh, &state.bounds, &state.voxels, &self.thread_pool);
    }

    /// Runs the two-pass parallel solid fill (spec.md §4.5), turning the surface shell left
    /// by [`VoxelEngine::voxelize_surface`] into a filled solid.
    pub fn voxelize_solid(&mut self) {
        let state = &self.state;
        solid_filler::voxelize_solid(&state.bounds, &state.voxels, &state.voxels_buffer, &self.thread_pool);
    }

    /// Materializes the dense `N x N x N` boolean cube (spec.md §4.7).
    pub fn binary_tensor(&self) -> BinaryTensor {
        BinaryTensor::build(&self.state.voxels, &self.state.bounds)
    }

    /// Runs the per-voxel cornerness voting pass (spec.md §4.8) over `tensor` with mask
    /// half-width `mask_size`.
    pub fn voting(&self, tensor: &BinaryTensor, mask_size: i64) -> VotingAccumulator {
        VotingAccumulator::build(tensor, mask_size)
    }

    /// Runs the full polycube extraction pipeline (spec.md §4.9): voting, corner detection,
    /// and axis-aligned block growth.
    pub fn polycube(&self, params: &PolycubeParams) -> (CornerGrid, Polycube) {
        let tensor = self.binary_tensor();
        let votes = self.voting(&tensor, params.mask_size);
        let edges = polycube::find_borders(&tensor, &votes, params);
        let cube = polycube::build_polycube(&edges, &tensor, params);
        (edges, cube)
    }

    /// Writes the sparse coordinate-list format (spec.md §4.6/§6) to `writer`.
    pub fn write_sparse<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EngineError> {
        writers::write_sparse(writer, Some((&self.state.voxels, &self.state.bounds)))
    }

    /// Writes the compressed run-length binary format (spec.md §4.6/§6) to `writer`.
    pub fn write_compressed<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EngineError> {
        writers::write_compressed(writer, Some((&self.state.voxels, &self.state.bounds)))
    }

    /// Writes the binvox-compatible dense-viewer format (spec.md §4.6/§6) to `writer`.
    pub fn write_dense_viewer<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EngineError> {
        writers::write_dense_viewer(writer, Some((&self.state.voxels, &self.state.bounds)))
    }
}
