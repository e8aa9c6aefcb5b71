//! Error types for the voxmesh crate

use thiserror::Error;

/// Main error type for the crate.
///
/// Only two things can go wrong: the caller can request a region too large
/// for the byte-per-component vertex encoding, and the extractor can run out
/// of vertex dedup slots at a lattice column. The latter cannot happen for a
/// well-formed volume; it is surfaced rather than swallowed because
/// downstream rendering would misassociate materials.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("extraction region spans {extent} voxels on the {axis} axis, above the 255 voxel encoding limit")]
    RegionTooLarge { axis: char, extent: i32 },

    #[error("all vertex slots at lattice column ({x}, {y}) are occupied with no attribute match")]
    VertexSlotExhausted { x: u32, y: u32 },
}
