use thiserror::Error;

/// Top-level error type for the boundary editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors raised by the polygon boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundaryError {
    #[error("a boundary needs at least 3 vertices, got {count}")]
    InvalidPolygon { count: usize },

    #[error("vertex index {index} is out of range for a boundary of {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the handle set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("handles are already spawned; tear them down first")]
    AlreadySpawned,

    #[error("handle index {index} is out of range for {len} handles")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{handles} handles do not match {vertices} boundary vertices")]
    CountMismatch { handles: usize, vertices: usize },
}

/// Errors related to geometric computations.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("placement scale has a zero component: ({x}, {y}, {z})")]
    ZeroScale { x: f64, y: f64, z: f64 },
}

/// Errors raised while regenerating the boundary mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Convenience type alias for results using [`EditorError`].
pub type Result<T> = std::result::Result<T, EditorError>;
