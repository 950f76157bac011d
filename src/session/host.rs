use crate::math::{Placement, Point3};
use crate::mesh::MeshSnapshot;

/// Boundary handed over by the host when a session starts.
#[derive(Debug, Clone)]
pub struct BoundarySource {
    /// Local-space vertex buffer, already in clockwise order.
    pub vertices: Vec<Point3>,
    pub placement: Placement,
}

/// The host object whose mesh the editor edits.
pub trait MeshSource {
    /// The boundary to edit, or `None` when no level is loaded.
    fn boundary_source(&self) -> Option<BoundarySource>;

    /// Receives every newly regenerated mesh.
    fn write_back(&mut self, mesh: &MeshSnapshot);
}

/// Notifications from the editor to the host.
pub trait EditorHost {
    /// A vertex changed value; the level has unsaved edits.
    fn mark_unsaved(&mut self);
}

/// Discrete input surfaced by the host's pointer provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { handle: usize },
    Moved { handle: usize, world: Point3 },
    Released { handle: usize },
}
