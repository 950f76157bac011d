mod host;

pub use host::{BoundarySource, EditorHost, MeshSource, PointerEvent};

use tracing::{debug, trace};

use crate::boundary::PolygonBoundary;
use crate::error::Result;
use crate::handles::{HandleSet, Selection};
use crate::math::{Placement, Point3};
use crate::mesh::{BoundaryMeshSync, MeshParams, MeshSnapshot};

/// Parameters for an editing session.
#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    /// World-space radius within which a pointer press picks a handle.
    pub pick_radius: f64,
    /// Local-space distance below which a handle counts as unmoved.
    pub change_tolerance: f64,
    pub mesh: MeshParams,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            pick_radius: 0.5,
            change_tolerance: 1e-9,
            mesh: MeshParams::default(),
        }
    }
}

impl SessionParams {
    #[must_use]
    pub fn with_pick_radius(mut self, radius: f64) -> Self {
        self.pick_radius = radius;
        self
    }

    #[must_use]
    pub fn with_change_tolerance(mut self, tolerance: f64) -> Self {
        self.change_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_mesh_params(mut self, mesh: MeshParams) -> Self {
        self.mesh = mesh;
        self
    }
}

/// Lifecycle of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded.
    Uninitialized,
    /// Handles exist, no interaction yet.
    Spawned,
    Idle,
    /// A handle is held by the pointer.
    Dragging { handle: usize },
    TornDown,
}

impl SessionState {
    /// `true` while a boundary and its handles are live.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Spawned | Self::Idle | Self::Dragging { .. })
    }
}

/// Owns the boundary, its handles and its mesh for one editing session.
///
/// Each frame runs input capture, then [`update`](Self::update), which syncs
/// handles into the boundary and regenerates the mesh before the host renders.
#[derive(Debug)]
pub struct EditorSession {
    params: SessionParams,
    state: SessionState,
    boundary: Option<PolygonBoundary>,
    placement: Placement,
    handles: HandleSet,
    selection: Selection,
    mesh: BoundaryMeshSync,
    published_revision: Option<u64>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionParams::default())
    }
}

impl EditorSession {
    #[must_use]
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            state: SessionState::Uninitialized,
            boundary: None,
            placement: Placement::identity(),
            handles: HandleSet::new(),
            selection: Selection::new(),
            mesh: BoundaryMeshSync::new(params.mesh),
            published_revision: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    #[must_use]
    pub fn boundary(&self) -> Option<&PolygonBoundary> {
        self.boundary.as_ref()
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Last mesh produced for the current boundary.
    #[must_use]
    pub fn snapshot(&self) -> Option<&MeshSnapshot> {
        self.mesh.snapshot()
    }

    /// Starts a session from the host's mesh source.
    ///
    /// A source without a boundary leaves the session `Uninitialized`; that
    /// is the normal state of an editor with no level loaded. An open
    /// session is torn down first.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::InvalidPolygon` if the source has fewer than
    /// 3 vertices. The session stays `Uninitialized` without handles.
    pub fn open(&mut self, source: &impl MeshSource) -> Result<SessionState> {
        if self.state.is_active() {
            self.close();
        }
        self.selection.clear();
        self.mesh.reset();
        self.published_revision = None;
        self.state = SessionState::Uninitialized;

        let Some(BoundarySource {
            vertices,
            placement,
        }) = source.boundary_source()
        else {
            debug!("no boundary to edit");
            return Ok(self.state);
        };

        let boundary = PolygonBoundary::new(vertices)?;
        self.handles
            .spawn(&boundary, &placement, &mut self.selection)?;
        debug!(vertices = boundary.len(), "editing session opened");
        self.boundary = Some(boundary);
        self.placement = placement;
        self.state = SessionState::Spawned;
        Ok(self.state)
    }

    /// Pointer pressed on a handle: `Spawned | Idle → Dragging`.
    ///
    /// Ignored when no session is open or a drag is already in progress.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid handle index.
    pub fn pointer_down(&mut self, handle: usize) -> Result<()> {
        match self.state {
            SessionState::Spawned | SessionState::Idle => {
                self.handles.begin_drag(handle)?;
                self.handles.select(handle, &mut self.selection, false)?;
                self.state = SessionState::Dragging { handle };
                trace!(handle, "drag started");
            }
            state => trace!(handle, ?state, "pointer down ignored"),
        }
        Ok(())
    }

    /// Picks the handle under `world` and presses it. Returns the picked index.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`pointer_down`](Self::pointer_down).
    pub fn pointer_down_at(&mut self, world: &Point3) -> Result<Option<usize>> {
        let Some(handle) = self.handles.pick(world, self.params.pick_radius) else {
            return Ok(None);
        };
        self.pointer_down(handle)?;
        Ok(Some(handle))
    }

    /// Pointer moved while holding `handle`. Only records the position.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` for an invalid handle index.
    pub fn pointer_move(&mut self, handle: usize, world: Point3) -> Result<()> {
        match self.state {
            SessionState::Dragging { handle: held } if held == handle => {
                self.handles.on_drag(handle, world)
            }
            state => {
                trace!(handle, ?state, "pointer move ignored");
                Ok(())
            }
        }
    }

    /// Pointer released: `Dragging → Idle`, then runs [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Propagates errors from the sync and regeneration.
    pub fn pointer_up(
        &mut self,
        handle: usize,
        source: &mut impl MeshSource,
        host: &mut impl EditorHost,
    ) -> Result<Option<&MeshSnapshot>> {
        match self.state {
            SessionState::Dragging { handle: held } if held == handle => {
                self.handles.end_drag(handle)?;
                self.state = SessionState::Idle;
                trace!(handle, "drag ended");
                self.update(source, host)
            }
            state => {
                trace!(handle, ?state, "pointer up ignored");
                Ok(None)
            }
        }
    }

    /// Dispatches a pointer event from the host's input provider.
    ///
    /// # Errors
    ///
    /// Propagates errors from the pointer handlers.
    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        source: &mut impl MeshSource,
        host: &mut impl EditorHost,
    ) -> Result<()> {
        match event {
            PointerEvent::Pressed { handle } => self.pointer_down(handle),
            PointerEvent::Moved { handle, world } => self.pointer_move(handle, world),
            PointerEvent::Released { handle } => self.pointer_up(handle, source, host).map(|_| ()),
        }
    }

    /// Runs one frame: syncs handles into the boundary, notifies the host of
    /// unsaved edits, regenerates the mesh and writes it back to the source.
    ///
    /// Returns the snapshot when a new one was published this frame.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::CountMismatch` if handles and vertices diverged,
    /// or `MeshError::Triangulation` if the mesh cannot be rebuilt.
    pub fn update(
        &mut self,
        source: &mut impl MeshSource,
        host: &mut impl EditorHost,
    ) -> Result<Option<&MeshSnapshot>> {
        if !self.state.is_active() {
            return Ok(None);
        }
        let Some(boundary) = self.boundary.as_mut() else {
            return Ok(None);
        };

        let report = self.handles.sync_to_boundary(
            boundary,
            &self.placement,
            self.params.change_tolerance,
        )?;
        if !report.is_noop() {
            host.mark_unsaved();
        }

        let snapshot = self.mesh.regenerate(boundary)?;
        if self.published_revision == Some(snapshot.revision) {
            return Ok(None);
        }
        source.write_back(snapshot);
        self.published_revision = Some(snapshot.revision);
        Ok(Some(snapshot))
    }

    /// Adds a vertex at a world position, respawning handles for the new
    /// order. Returns the new vertex's index.
    ///
    /// Pending handle moves are synced first. An in-progress drag is dropped.
    ///
    /// # Errors
    ///
    /// Propagates errors from the sync and regeneration. Without an open
    /// session nothing happens and `Ok(None)` is returned.
    pub fn insert_vertex(
        &mut self,
        world: &Point3,
        source: &mut impl MeshSource,
        host: &mut impl EditorHost,
    ) -> Result<Option<usize>> {
        if !self.state.is_active() {
            return Ok(None);
        }
        self.update(source, host)?;
        let local = self.placement.to_local(world);
        let Some(boundary) = self.boundary.as_mut() else {
            return Ok(None);
        };
        let index = boundary.insert_vertex(local);
        self.respawn_handles()?;
        host.mark_unsaved();
        self.update(source, host)?;
        Ok(Some(index))
    }

    /// Removes the vertex at `index`, respawning handles.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::InvalidPolygon` if the boundary would drop
    /// below 3 vertices, or `BoundaryError::IndexOutOfRange` for a bad index.
    pub fn remove_vertex(
        &mut self,
        index: usize,
        source: &mut impl MeshSource,
        host: &mut impl EditorHost,
    ) -> Result<Option<Point3>> {
        if !self.state.is_active() {
            return Ok(None);
        }
        self.update(source, host)?;
        let Some(boundary) = self.boundary.as_mut() else {
            return Ok(None);
        };
        let removed = boundary.remove_vertex(index)?;
        self.respawn_handles()?;
        host.mark_unsaved();
        self.update(source, host)?;
        Ok(Some(removed))
    }

    /// Ends the session. Safe to call in any state, including with no handles.
    pub fn close(&mut self) {
        self.handles.teardown(&mut self.selection);
        self.boundary = None;
        self.mesh.reset();
        self.published_revision = None;
        if self.state != SessionState::TornDown {
            debug!(from = ?self.state, "editing session closed");
        }
        self.state = SessionState::TornDown;
    }

    /// The host switched scene or context; the session cannot continue.
    pub fn context_changed(&mut self) {
        debug!("context changed");
        self.close();
    }

    fn respawn_handles(&mut self) -> Result<()> {
        self.handles.teardown(&mut self.selection);
        if let Some(boundary) = &self.boundary {
            self.handles
                .spawn(boundary, &self.placement, &mut self.selection)?;
        }
        self.state = SessionState::Idle;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{BoundaryError, EditorError};
    use crate::math::Vector3;
    use crate::mesh::DegenerateWinding;
    use approx::assert_relative_eq;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[derive(Default)]
    struct Level {
        source: Option<BoundarySource>,
        written: Vec<MeshSnapshot>,
    }

    impl Level {
        fn square(placement: Placement) -> Self {
            Self {
                source: Some(BoundarySource {
                    vertices: vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)],
                    placement,
                }),
                written: Vec::new(),
            }
        }
    }

    impl MeshSource for Level {
        fn boundary_source(&self) -> Option<BoundarySource> {
            self.source.clone()
        }

        fn write_back(&mut self, mesh: &MeshSnapshot) {
            self.written.push(mesh.clone());
        }
    }

    #[derive(Default)]
    struct Host {
        unsaved: usize,
    }

    impl EditorHost for Host {
        fn mark_unsaved(&mut self) {
            self.unsaved += 1;
        }
    }

    fn opened(level: &Level) -> EditorSession {
        let mut session = EditorSession::default();
        assert_eq!(session.open(level).unwrap(), SessionState::Spawned);
        session
    }

    #[test]
    fn open_without_level_stays_uninitialized() {
        init_tracing();
        let mut session = EditorSession::default();
        let state = session.open(&Level::default()).unwrap();
        assert_eq!(state, SessionState::Uninitialized);
        assert!(session.handles().is_empty());
        assert!(session.boundary().is_none());
    }

    #[test]
    fn open_with_too_few_vertices_fails_without_handles() {
        let level = Level {
            source: Some(BoundarySource {
                vertices: vec![p(0.0, 0.0), p(1.0, 0.0)],
                placement: Placement::identity(),
            }),
            written: Vec::new(),
        };
        let mut session = EditorSession::default();
        let err = session.open(&level).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Boundary(BoundaryError::InvalidPolygon { count: 2 })
        ));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.handles().is_empty());
    }

    #[test]
    fn first_update_publishes_mesh() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);

        let mesh = session.update(&mut level, &mut host).unwrap().unwrap();
        assert_eq!(mesh.bounds.min, p(0.0, 0.0));
        assert_eq!(mesh.bounds.max, p(2.0, 2.0));
        assert_eq!(level.written.len(), 1);
        assert_eq!(host.unsaved, 0);

        assert!(session.update(&mut level, &mut host).unwrap().is_none());
        assert_eq!(level.written.len(), 1);
    }

    #[test]
    fn drag_and_release_moves_vertex() {
        init_tracing();
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.update(&mut level, &mut host).unwrap();
        let revision = session.boundary().unwrap().revision();

        for event in [
            PointerEvent::Pressed { handle: 2 },
            PointerEvent::Moved {
                handle: 2,
                world: p(3.0, 2.0),
            },
        ] {
            session.handle_event(event, &mut level, &mut host).unwrap();
        }
        assert_eq!(session.state(), SessionState::Dragging { handle: 2 });
        assert_eq!(session.boundary().unwrap().vertex(2).unwrap(), p(2.0, 2.0));

        session
            .handle_event(PointerEvent::Released { handle: 2 }, &mut level, &mut host)
            .unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        let boundary = session.boundary().unwrap();
        assert_eq!(boundary.vertex(2).unwrap(), p(3.0, 2.0));
        assert_eq!(boundary.revision(), revision + 1);
        assert!(!boundary.is_dirty());
        assert_eq!(host.unsaved, 1);
        assert_eq!(level.written.last().unwrap().vertices[2], p(3.0, 2.0));
        assert_eq!(level.written.last().unwrap().bounds.max, p(3.0, 2.0));
    }

    #[test]
    fn live_update_while_dragging() {
        let placement = Placement::from_position(Vector3::new(10.0, 0.0, 0.0));
        let mut level = Level::square(placement);
        let mut host = Host::default();
        let mut session = opened(&level);

        session.pointer_down(0).unwrap();
        session.pointer_move(0, p(9.0, -1.0)).unwrap();
        let mesh = session.update(&mut level, &mut host).unwrap().unwrap();
        assert_relative_eq!(mesh.vertices[0], p(-1.0, -1.0));
        assert_eq!(session.state(), SessionState::Dragging { handle: 0 });
        assert_eq!(session.handles().len(), session.boundary().unwrap().len());
    }

    #[test]
    fn moves_for_other_handles_are_ignored() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.pointer_down(1).unwrap();
        session.pointer_move(3, p(-5.0, -5.0)).unwrap();
        session.pointer_up(1, &mut level, &mut host).unwrap();
        assert_eq!(session.boundary().unwrap().vertex(3).unwrap(), p(0.0, 2.0));
        assert_eq!(host.unsaved, 0);
    }

    #[test]
    fn pointer_down_at_picks_handle() {
        let level = Level::square(Placement::identity());
        let mut session = opened(&level);
        assert_eq!(session.pointer_down_at(&p(2.2, 0.1)).unwrap(), Some(1));
        assert_eq!(session.state(), SessionState::Dragging { handle: 1 });
        assert_eq!(session.handles().selected_indices(session.selection()), vec![1]);
    }

    #[test]
    fn dragging_into_reversed_winding_is_flagged() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.pointer_down(1).unwrap();
        session.pointer_move(1, p(-4.0, 1.0)).unwrap();
        let mesh = session.pointer_up(1, &mut level, &mut host).unwrap().unwrap();
        assert!(!mesh.is_valid());
        assert!(!mesh.is_simple || mesh.degenerate_winding == Some(DegenerateWinding::Reversed));
    }

    #[test]
    fn close_mid_drag_clears_selection() {
        let level = Level::square(Placement::identity());
        let mut session = opened(&level);
        session.pointer_down(2).unwrap();
        assert_eq!(session.selection().len(), 1);

        session.close();
        assert_eq!(session.state(), SessionState::TornDown);
        assert!(session.selection().is_empty());
        assert!(session.handles().is_empty());

        session.close();
        assert_eq!(session.state(), SessionState::TornDown);
    }

    #[test]
    fn context_change_tears_down_and_ignores_input() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.context_changed();
        assert_eq!(session.state(), SessionState::TornDown);
        session.pointer_down(0).unwrap();
        assert_eq!(session.state(), SessionState::TornDown);
        assert!(session.update(&mut level, &mut host).unwrap().is_none());
    }

    #[test]
    fn reopen_after_teardown_starts_fresh() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.pointer_down(0).unwrap();
        session.close();

        assert_eq!(session.open(&level).unwrap(), SessionState::Spawned);
        assert!(session.selection().is_empty());
        assert_eq!(session.handles().len(), 4);
        assert!(session.update(&mut level, &mut host).unwrap().is_some());
    }

    #[test]
    fn insert_vertex_respawns_handles() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);
        session.update(&mut level, &mut host).unwrap();

        let index = session
            .insert_vertex(&p(1.0, -1.0), &mut level, &mut host)
            .unwrap()
            .unwrap();
        let boundary = session.boundary().unwrap();
        assert_eq!(boundary.len(), 5);
        assert_eq!(boundary.vertex(index).unwrap(), p(1.0, -1.0));
        assert_eq!(session.handles().len(), 5);
        assert_eq!(session.handles().get(index).unwrap().world_position, p(1.0, -1.0));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(host.unsaved, 1);

        let mesh = level.written.last().unwrap();
        assert_eq!(mesh.vertices.len(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn remove_vertex_keeps_counts_in_step() {
        let mut level = Level::square(Placement::identity());
        let mut host = Host::default();
        let mut session = opened(&level);

        let removed = session.remove_vertex(3, &mut level, &mut host).unwrap();
        assert_eq!(removed, Some(p(0.0, 2.0)));
        assert_eq!(session.handles().len(), 3);
        assert_eq!(level.written.last().unwrap().vertices.len(), 3);

        assert!(session.remove_vertex(0, &mut level, &mut host).is_err());
        assert_eq!(session.handles().len(), 3);
    }
}
