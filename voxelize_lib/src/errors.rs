//! Error types surfaced by the public operations of this crate

use thiserror::Error as ThisError;

/// Errors that can occur while constructing or operating a [`crate::VoxelEngine`].
///
/// Mirrors the structure of `splashsurf_lib`'s own reconstruction error enum: each variant
/// names the stage that failed, and propagation happens at the public operation boundary
/// rather than deep inside the pipeline (phases are barrier-separated, so no partial state
/// leaks out on failure).
#[derive(Debug, ThisError)]
pub enum EngineError {
    /// `N < 1` or `num_threads < 1`, rejected at construction.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The input mesh has zero vertices or zero triangles. Rejected by
    /// [`crate::engine::VoxelEngine::new`] before any grid is allocated — spec.md §7's
    /// `MeshLoadError` is "surfaced to caller" via this variant. A caller that hits it can
    /// still satisfy spec.md §7's "all subsequent write operations emit empty headers and
    /// zero bodies" by calling [`crate::writers`]'s write functions directly with `None`.
    #[error("mesh is empty (zero vertices or zero triangles)")]
    MeshEmpty,

    /// The mesh bounding box is degenerate (e.g. all vertices coincide), so no cubic world
    /// bound can be derived.
    #[error("could not construct voxel grid bounds: {0}")]
    GridConstruction(String),

    /// A writer failed to produce its output file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
