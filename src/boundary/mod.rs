use crate::error::{BoundaryError, Result};
use crate::math::clockwise::{sort_clockwise, sort_clockwise_around_centroid};
use crate::math::polygon_2d::{
    centroid, has_consecutive_duplicates, is_simple_2d, signed_area_2d,
};
use crate::math::{Placement, Point3, TOLERANCE};

/// Ordered vertex list of a movable-area polygon, in the boundary's local space.
///
/// A vertex's index is its identity for the lifetime of the boundary. Every
/// successful mutation marks the boundary dirty and bumps its revision so
/// the mesh sync knows to regenerate.
#[derive(Debug, Clone)]
pub struct PolygonBoundary {
    vertices: Vec<Point3>,
    dirty: bool,
    revision: u64,
}

impl PolygonBoundary {
    /// Creates a boundary from points already in clockwise order.
    ///
    /// The points are stored verbatim. A new boundary starts dirty so the
    /// first regeneration always builds a mesh.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::InvalidPolygon` if fewer than 3 points are given.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 3 {
            return Err(BoundaryError::InvalidPolygon {
                count: points.len(),
            }
            .into());
        }
        Ok(Self {
            vertices: points,
            dirty: true,
            revision: 0,
        })
    }

    /// Creates a boundary from points in arbitrary order, sorting them
    /// clockwise around their centroid first.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::InvalidPolygon` if fewer than 3 points are given.
    pub fn from_unordered(mut points: Vec<Point3>) -> Result<Self> {
        sort_clockwise_around_centroid(&mut points);
        Self::new(points)
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Returns the vertex at `index`.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::IndexOutOfRange` for an invalid index.
    pub fn vertex(&self, index: usize) -> Result<Point3> {
        self.vertices
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false` for a constructed boundary; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the vertices changed since the last [`mark_clean`](Self::mark_clean).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of mutations applied since construction.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clears the dirty flag once downstream consumers caught up.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replaces the vertex at `index`. No reordering is performed.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::IndexOutOfRange` for an invalid index.
    pub fn set_vertex(&mut self, index: usize, point: Point3) -> Result<()> {
        let Some(slot) = self.vertices.get_mut(index) else {
            return Err(self.out_of_range(index));
        };
        *slot = point;
        self.touch();
        Ok(())
    }

    /// Adds a vertex and re-establishes clockwise order around the centroid
    /// of the new vertex set. Returns the index the new vertex ended up at.
    ///
    /// Every vertex may change index, so handles bound to this boundary
    /// must be respawned.
    pub fn insert_vertex(&mut self, point: Point3) -> usize {
        self.vertices.push(point);
        let origin = centroid(&self.vertices);
        sort_clockwise(&mut self.vertices, origin);
        self.touch();
        self.vertices
            .iter()
            .position(|v| *v == point)
            .unwrap_or(self.vertices.len() - 1)
    }

    /// Removes the vertex at `index`, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::IndexOutOfRange` for an invalid index and
    /// `BoundaryError::InvalidPolygon` if the boundary would drop below 3 vertices.
    pub fn remove_vertex(&mut self, index: usize) -> Result<Point3> {
        if index >= self.vertices.len() {
            return Err(self.out_of_range(index));
        }
        if self.vertices.len() <= 3 {
            return Err(BoundaryError::InvalidPolygon {
                count: self.vertices.len() - 1,
            }
            .into());
        }
        let removed = self.vertices.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Signed area in the XY plane; positive when clockwise.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.vertices)
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() > TOLERANCE
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        centroid(&self.vertices)
    }

    /// `true` if no edges cross or touch. May be temporarily false during a drag.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        is_simple_2d(&self.vertices)
    }

    #[must_use]
    pub fn has_consecutive_duplicates(&self) -> bool {
        has_consecutive_duplicates(&self.vertices)
    }

    /// Converts a world-space point into this boundary's local space.
    #[must_use]
    pub fn to_local_space(world: &Point3, placement: &Placement) -> Point3 {
        placement.to_local(world)
    }

    /// Converts a local-space point into world space.
    #[must_use]
    pub fn to_world_space(local: &Point3, placement: &Placement) -> Point3 {
        placement.to_world(local)
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn out_of_range(&self, index: usize) -> crate::error::EditorError {
        BoundaryError::IndexOutOfRange {
            index,
            len: self.vertices.len(),
        }
        .into()
    }
}
