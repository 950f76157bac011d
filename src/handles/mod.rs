mod selection;

pub use selection::Selection;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::boundary::PolygonBoundary;
use crate::error::{HandleError, Result};
use crate::math::{Placement, Point3};

slotmap::new_key_type! {
    /// Unique identifier for a handle. Ids from a torn-down set never alias new handles.
    pub struct HandleId;
}

/// An interactive control point bound to one boundary vertex.
#[derive(Debug, Clone)]
pub struct Handle {
    /// Index of the vertex this handle drives.
    pub vertex_index: usize,
    /// Current world-space position.
    pub world_position: Point3,
    pub is_selected: bool,
    pub is_dragging: bool,
    /// Moved since the last sync.
    pending: bool,
}

impl Handle {
    fn new(vertex_index: usize, world_position: Point3) -> Self {
        Self {
            vertex_index,
            world_position,
            is_selected: false,
            is_dragging: false,
            pending: false,
        }
    }

    /// Whether the handle moved since the last sync.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Outcome of [`HandleSet::sync_to_boundary`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Vertex indices whose position was written.
    pub changed: Vec<usize>,
    /// Number of handles whose position matched their vertex already.
    pub unchanged: usize,
}

impl SyncReport {
    /// `true` if nothing was written, so downstream work can be skipped.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// One handle per boundary vertex, in vertex order.
#[derive(Debug, Default)]
pub struct HandleSet {
    handles: SlotMap<HandleId, Handle>,
    order: Vec<HandleId>,
}

impl HandleSet {
    /// Creates an empty handle set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Creates one handle per vertex at the vertex's world position.
    ///
    /// The selection is cleared, since it belongs to the previous session.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::AlreadySpawned` if handles exist.
    pub fn spawn(
        &mut self,
        boundary: &PolygonBoundary,
        placement: &Placement,
        selection: &mut Selection,
    ) -> Result<()> {
        if !self.order.is_empty() {
            return Err(HandleError::AlreadySpawned.into());
        }
        selection.clear();
        self.order.reserve(boundary.len());
        for (index, vertex) in boundary.vertices().iter().enumerate() {
            let world = placement.to_world(vertex);
            let id = self.handles.insert(Handle::new(index, world));
            self.order.push(id);
        }
        debug!(count = self.order.len(), "spawned handles");
        Ok(())
    }

    /// Destroys all handles and clears the selection. Idempotent.
    pub fn teardown(&mut self, selection: &mut Selection) {
        selection.clear();
        if self.order.is_empty() {
            return;
        }
        debug!(count = self.order.len(), "tearing down handles");
        self.handles.clear();
        self.order.clear();
    }

    /// Id of the handle bound to vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn id(&self, index: usize) -> Result<HandleId> {
        self.order
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Handle bound to vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn get(&self, index: usize) -> Result<&Handle> {
        let id = self.id(index)?;
        self.handles
            .get(id)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Looks up a handle by id; `None` for ids of destroyed handles.
    #[must_use]
    pub fn by_id(&self, id: HandleId) -> Option<&Handle> {
        self.handles.get(id)
    }

    /// Handles in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.order.iter().filter_map(|id| self.handles.get(*id))
    }

    /// Records a new world position for a handle without touching the boundary.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn on_drag(&mut self, index: usize, world: Point3) -> Result<()> {
        let handle = self.get_mut(index)?;
        handle.world_position = world;
        handle.pending = true;
        trace!(index, x = world.x, y = world.y, "handle moved");
        Ok(())
    }

    /// Marks a handle as being dragged.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.get_mut(index)?.is_dragging = true;
        Ok(())
    }

    /// Clears a handle's drag flag.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn end_drag(&mut self, index: usize) -> Result<()> {
        self.get_mut(index)?.is_dragging = false;
        Ok(())
    }

    /// Selects the handle at `index`. Without `additive`, replaces the selection.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid index.
    pub fn select(
        &mut self,
        index: usize,
        selection: &mut Selection,
        additive: bool,
    ) -> Result<()> {
        let id = self.id(index)?;
        if !additive {
            self.deselect_all(selection);
        }
        if let Some(handle) = self.handles.get_mut(id) {
            handle.is_selected = true;
        }
        selection.insert(id);
        Ok(())
    }

    /// Deselects every handle.
    pub fn deselect_all(&mut self, selection: &mut Selection) {
        for id in selection.ids() {
            if let Some(handle) = self.handles.get_mut(*id) {
                handle.is_selected = false;
            }
        }
        selection.clear();
    }

    /// Vertex indices of the selected handles still alive in this set.
    #[must_use]
    pub fn selected_indices(&self, selection: &Selection) -> Vec<usize> {
        selection
            .ids()
            .iter()
            .filter_map(|id| self.handles.get(*id))
            .map(|h| h.vertex_index)
            .collect()
    }

    /// Nearest handle within `radius` of `world`, measured in the XY plane.
    #[must_use]
    pub fn pick(&self, world: &Point3, radius: f64) -> Option<usize> {
        let radius_sq = radius * radius;
        self.iter()
            .map(|h| {
                let dx = h.world_position.x - world.x;
                let dy = h.world_position.y - world.y;
                (h.vertex_index, dx * dx + dy * dy)
            })
            .filter(|(_, d)| *d <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Writes every handle's local-space position into the boundary.
    ///
    /// Vertices already within `tolerance` of their handle are left alone
    /// and counted as unchanged, so an idle frame leaves the boundary clean.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::CountMismatch` if the handle count differs from
    /// the vertex count.
    pub fn sync_to_boundary(
        &mut self,
        boundary: &mut PolygonBoundary,
        placement: &Placement,
        tolerance: f64,
    ) -> Result<SyncReport> {
        if self.order.len() != boundary.len() {
            return Err(HandleError::CountMismatch {
                handles: self.order.len(),
                vertices: boundary.len(),
            }
            .into());
        }

        let mut report = SyncReport::default();
        for (index, id) in self.order.iter().enumerate() {
            let Some(handle) = self.handles.get_mut(*id) else {
                return Err(HandleError::IndexOutOfRange {
                    index,
                    len: self.order.len(),
                }
                .into());
            };
            handle.pending = false;
            let local = placement.to_local(&handle.world_position);
            let current = boundary.vertex(index)?;
            if (local - current).norm() <= tolerance {
                report.unchanged += 1;
                continue;
            }
            boundary.set_vertex(index, local)?;
            report.changed.push(index);
        }

        if !report.is_noop() {
            trace!(changed = ?report.changed, "synced handles to boundary");
        }
        Ok(report)
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Handle> {
        let id = self.id(index)?;
        let len = self.order.len();
        self.handles
            .get_mut(id)
            .ok_or_else(|| HandleError::IndexOutOfRange { index, len }.into())
    }

    fn out_of_range(&self, index: usize) -> crate::error::EditorError {
        HandleError::IndexOutOfRange {
            index,
            len: self.order.len(),
        }
        .into()
    }
}
