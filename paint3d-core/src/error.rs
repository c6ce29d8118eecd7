//! Error types for paint3d
//!
//! Every failure in the core is a data-validation failure raised once at a
//! boundary: camera configuration, mesh construction, mesh loading, or a
//! scene index supplied by the UI layer. Per-frame conditions (degenerate
//! faces, vertices behind the near plane) are not errors; the pipeline
//! skips them and counts them in its frame statistics.

use thiserror::Error;

/// Result type alias for paint3d operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A camera parameter is non-positive or not finite
    #[error("invalid camera {field}: {value} (must be a positive, finite value)")]
    InvalidCamera { field: &'static str, value: f32 },

    /// Camera position, target and up vector do not span a view basis
    #[error("degenerate camera view: position equals target or up is parallel to the view direction")]
    DegenerateView,

    /// A mesh entry does not have exactly three vertices
    #[error("malformed triangle at index {index}: expected 3 vertices, got {vertices}")]
    MalformedTriangle { index: usize, vertices: usize },

    /// A mesh was constructed without any triangles
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A scene operation referenced a mesh that does not exist
    #[error("mesh index {index} out of range (scene has {len} meshes)")]
    MeshIndexOutOfRange { index: usize, len: usize },

    /// STL data could not be decoded
    #[error("STL error: {0}")]
    Stl(String),
}
