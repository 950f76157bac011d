use std::collections::{HashMap, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{MeshError, Result};
use crate::math::Point3;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Fills a simple boundary with triangles.
///
/// Indices refer to positions in `points`. Triangles keep the boundary's
/// winding (positive area in the XY plane). Coincident input points map to
/// the first occurrence.
///
/// # Errors
///
/// Returns `MeshError::Triangulation` if a point cannot be inserted (NaN or
/// out of range) or the boundary edges cross.
#[allow(clippy::cast_possible_truncation)]
pub fn triangulate_boundary(points: &[Point3]) -> Result<Vec<[u32; 3]>> {
    if points.len() < 3 {
        return Err(
            MeshError::Triangulation("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut cdt = Cdt::new();
    let handles = insert_constraint_loop(&mut cdt, points)?;

    let mut boundary_index: HashMap<usize, u32> = HashMap::with_capacity(points.len());
    for (i, handle) in handles.iter().enumerate() {
        boundary_index.entry(handle.index()).or_insert(i as u32);
    }

    let depths = crossing_depths(&cdt);
    let mut indices = Vec::with_capacity(points.len().saturating_sub(2));
    for face in cdt.inner_faces() {
        if !depths.get(&face.fix().index()).copied().is_some_and(is_interior) {
            continue;
        }
        let mut tri = [0u32; 3];
        for (slot, vh) in face.vertices().iter().enumerate() {
            let Some(&idx) = boundary_index.get(&vh.fix().index()) else {
                return Err(
                    MeshError::Triangulation("triangle vertex not on the boundary".into()).into(),
                );
            };
            tri[slot] = idx;
        }
        indices.push(tri);
    }
    Ok(indices)
}

fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point3]) -> Result<Vec<FixedVertexHandle>> {
    let mut handles = Vec::with_capacity(points.len());
    for pt in points {
        let h = cdt
            .insert(SpadePoint2::new(pt.x, pt.y))
            .map_err(|e: InsertionError| MeshError::Triangulation(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(MeshError::Triangulation(format!(
                "boundary edge {i} crosses another edge"
            ))
            .into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(handles)
}

/// Number of boundary edges crossed to reach each inner face from outside.
///
/// Faces on the convex hull start at 0, or 1 when their hull edge is itself a
/// boundary edge. The fill spreads breadth-first and adds one per boundary
/// edge crossed. Keys are spade face indices.
fn crossing_depths(cdt: &Cdt) -> HashMap<usize, u32> {
    let mut depths: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();
    let outer = cdt.outer_face().fix();

    let hull_faces = cdt
        .directed_edges()
        .filter(|edge| edge.face().fix() == outer)
        .filter_map(|edge| {
            let inner = edge.rev().face().as_inner()?;
            let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
            Some((inner.fix(), u32::from(crossed)))
        });
    for (face, depth) in hull_faces {
        if depths.insert(face.index(), depth).is_none() {
            queue.push_back((face, depth));
        }
    }

    while let Some((face, depth)) = queue.pop_front() {
        for edge in cdt.face(face).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let key = neighbor.fix().index();
            if depths.contains_key(&key) {
                continue;
            }
            let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
            let next = depth + u32::from(crossed);
            depths.insert(key, next);
            queue.push_back((neighbor.fix(), next));
        }
    }

    depths
}

/// Odd crossing depth means the face lies inside the boundary.
fn is_interior(depth: u32) -> bool {
    depth % 2 == 1
}
