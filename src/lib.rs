//! Interactive editor for the boundary polygon of a movable area.
//!
//! Vertices are exposed as draggable [`handles`]; each frame the handles are
//! synced into a [`boundary::PolygonBoundary`] and a renderable
//! [`mesh::MeshSnapshot`] is regenerated from it. [`session::EditorSession`]
//! drives the whole pipeline from host pointer events.

pub mod boundary;
pub mod error;
pub mod handles;
pub mod math;
pub mod mesh;
pub mod session;

pub use error::{EditorError, Result};
