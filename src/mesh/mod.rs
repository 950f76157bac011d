mod triangulate;

pub use triangulate::triangulate_boundary;

use tracing::{debug, warn};

use crate::boundary::PolygonBoundary;
use crate::error::Result;
use crate::math::polygon_2d::{is_simple_2d, newell_normal};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Parameters controlling mesh regeneration.
#[derive(Debug, Clone, Copy)]
pub struct MeshParams {
    /// Fill simple boundaries with triangles.
    pub triangulate: bool,
    /// Minimum normal length (twice the area) below which winding counts as collinear.
    pub tolerance: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            triangulate: true,
            tolerance: TOLERANCE,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing all points; `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points[1..].iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.inf(p),
                max: acc.max.sup(p),
            },
        ))
    }

    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }
}

/// Winding problems found while regenerating. Reported on the snapshot, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateWinding {
    /// The boundary runs counter-clockwise; normals point away from the viewer.
    Reversed,
    /// The boundary has no area; normals are zero.
    Collinear,
}

/// Renderable geometry derived from a boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSnapshot {
    /// Mirror of the boundary vertices, local space.
    pub vertices: Vec<Point3>,
    /// One normal per vertex, all equal for a flat boundary.
    pub normals: Vec<Vector3>,
    /// Triangle fill; empty when the boundary is not simple or filling is disabled.
    pub indices: Vec<[u32; 3]>,
    pub bounds: Aabb,
    /// Boundary revision this snapshot was built from.
    pub revision: u64,
    pub is_simple: bool,
    pub degenerate_winding: Option<DegenerateWinding>,
}

impl MeshSnapshot {
    /// Normal that a clockwise boundary in the XY plane produces.
    pub const FRONT_NORMAL: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    /// `false` if the host should warn that the mesh is suspect.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_simple && self.degenerate_winding.is_none()
    }
}

/// Keeps a mesh snapshot in step with a boundary.
#[derive(Debug, Default)]
pub struct BoundaryMeshSync {
    params: MeshParams,
    snapshot: Option<MeshSnapshot>,
}

impl BoundaryMeshSync {
    #[must_use]
    pub fn new(params: MeshParams) -> Self {
        Self {
            params,
            snapshot: None,
        }
    }

    /// Last snapshot produced, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<&MeshSnapshot> {
        self.snapshot.as_ref()
    }

    /// Drops the current snapshot so the next regeneration rebuilds.
    pub fn reset(&mut self) {
        self.snapshot = None;
    }

    /// Rebuilds the mesh from a dirty boundary, then marks it clean.
    ///
    /// A clean boundary returns the previous snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns `MeshError::Triangulation` if the boundary cannot be filled.
    pub fn regenerate(&mut self, boundary: &mut PolygonBoundary) -> Result<&MeshSnapshot> {
        let stale = match &self.snapshot {
            Some(snapshot) => boundary.is_dirty() || snapshot.revision != boundary.revision(),
            None => true,
        };
        let snapshot = match self.snapshot.take() {
            Some(previous) if !stale => previous,
            previous => match build_snapshot(boundary, &self.params) {
                Ok(snapshot) => {
                    boundary.mark_clean();
                    snapshot
                }
                Err(err) => {
                    self.snapshot = previous;
                    return Err(err);
                }
            },
        };
        Ok(&*self.snapshot.insert(snapshot))
    }
}

fn build_snapshot(boundary: &PolygonBoundary, params: &MeshParams) -> Result<MeshSnapshot> {
    let vertices = boundary.vertices().to_vec();
    let bounds = Aabb::from_points(&vertices).unwrap_or(Aabb {
        min: Point3::origin(),
        max: Point3::origin(),
    });

    let raw = newell_normal(&vertices);
    let degenerate_winding = classify_winding(&raw, params.tolerance);
    let normal = if degenerate_winding == Some(DegenerateWinding::Collinear) {
        Vector3::zeros()
    } else {
        raw.normalize()
    };
    let normals = vec![normal; vertices.len()];

    let is_simple = is_simple_2d(&vertices);
    let indices = if is_simple && params.triangulate && degenerate_winding.is_none() {
        triangulate_boundary(&vertices)?
    } else {
        Vec::new()
    };

    if let Some(defect) = degenerate_winding {
        warn!(?defect, revision = boundary.revision(), "boundary winding is degenerate");
    }
    if !is_simple {
        warn!(revision = boundary.revision(), "boundary is self-intersecting");
    }
    debug!(
        vertices = vertices.len(),
        triangles = indices.len(),
        revision = boundary.revision(),
        "regenerated boundary mesh"
    );

    Ok(MeshSnapshot {
        vertices,
        normals,
        indices,
        bounds,
        revision: boundary.revision(),
        is_simple,
        degenerate_winding,
    })
}

fn classify_winding(normal: &Vector3, tolerance: f64) -> Option<DegenerateWinding> {
    let facing = normal.dot(&MeshSnapshot::FRONT_NORMAL);
    if normal.norm() <= tolerance || facing.abs() <= tolerance {
        Some(DegenerateWinding::Collinear)
    } else if facing < 0.0 {
        Some(DegenerateWinding::Reversed)
    } else {
        None
    }
}
