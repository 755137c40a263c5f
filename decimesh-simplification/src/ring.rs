//! One-ring ("star shape") extraction
//!
//! A vertex only knows its incident triangles as an unordered list. The
//! boundary polygon left behind by removing it is rebuilt by chaining those
//! triangles through their shared edges, marking each one as it is used.

use crate::adjacency::{AdjacencyEntry, AdjacencyModel, VertexId};
use crate::error::DecimationError;
use decimesh_core::Point3d;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// The ordered, closed boundary of a vertex's neighborhood.
///
/// Holds each neighbor once; the closing edge from the last vertex back to
/// the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring(Vec<VertexId>);

impl Ring {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[VertexId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.0.contains(&v)
    }

    pub fn positions(&self, model: &AdjacencyModel) -> Vec<Point3d> {
        self.iter().map(|v| *model.vertex(v).position()).collect()
    }

    /// Non-adjacent ring positions `(i, j)`, `i < j`, whose vertices are
    /// already joined by an edge that does not belong to `center`'s fan.
    pub fn existing_links(&self, model: &AdjacencyModel, center: VertexId) -> HashSet<(usize, usize)> {
        let n = self.len();
        let slot: HashMap<VertexId, usize> = self.iter().enumerate().map(|(k, v)| (v, k)).collect();
        let mut links = HashSet::new();

        for (i, u) in self.iter().enumerate() {
            for (_, t) in model.incident_triangles(u) {
                if t.contains(center) {
                    continue;
                }
                for w in t.vertices() {
                    let Some(&j) = slot.get(&w) else { continue };
                    let (lo, hi) = (i.min(j), i.max(j));
                    if hi - lo >= 2 && !(lo == 0 && hi == n - 1) {
                        links.insert((lo, hi));
                    }
                }
            }
        }
        links
    }

    /// A three-vertex ring whose triangle already exists outside the fan
    pub fn is_capped(&self, model: &AdjacencyModel, center: VertexId) -> bool {
        let [a, b, c] = match self.0.as_slice() {
            &[a, b, c] => [a, b, c],
            _ => return false,
        };
        model
            .incident_triangles(a)
            .any(|(_, t)| !t.contains(center) && t.contains(b) && t.contains(c))
    }
}

/// Clears the walk marks of one adjacency list when dropped
struct VisitMarks<'a> {
    entries: &'a mut [AdjacencyEntry],
}

impl Drop for VisitMarks<'_> {
    fn drop(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.visited = false;
        }
    }
}

/// Walk the triangles around `v` and return its neighbors in cyclic order.
///
/// The ring starts with the two corners following `v` in the first incident
/// triangle, so on a consistently wound mesh it runs in the same direction
/// as the triangles. Fails with [`DecimationError::OpenRing`] for boundary
/// vertices, neighborhoods with fewer than three neighbors and non-manifold
/// fans. The walk marks are always cleared before returning.
pub fn extract_ring(model: &mut AdjacencyModel, v: VertexId) -> Result<Ring, DecimationError> {
    let open = DecimationError::OpenRing { vertex: v };
    let AdjacencyModel {
        vertices, triangles, ..
    } = model;
    let triangles = &*triangles;
    let marks = VisitMarks {
        entries: &mut vertices[v.index()].adjacency,
    };

    let edge_of = |entry: &AdjacencyEntry| {
        triangles[entry.triangle.index()]
            .as_ref()
            .and_then(|t| t.opposite_edge(v))
    };

    let Some(first) = marks.entries.first_mut() else {
        return Err(open);
    };
    let [a, b] = edge_of(&*first).ok_or_else(|| open.clone())?;
    first.visited = true;
    let mut ring = vec![a, b];

    loop {
        let last = ring[ring.len() - 1];
        if last == ring[0] {
            break;
        }

        let next = marks.entries.iter_mut().find_map(|entry| {
            if entry.visited {
                return None;
            }
            let [x, y] = edge_of(&*entry)?;
            let third = if x == last {
                y
            } else if y == last {
                x
            } else {
                return None;
            };
            entry.visited = true;
            Some(third)
        });

        match next {
            Some(third) => ring.push(third),
            None => break,
        }
    }

    let closed = ring.len() >= 4 && ring[0] == ring[ring.len() - 1];
    if !closed || marks.entries.iter().any(|e| !e.visited) {
        return Err(open);
    }
    ring.pop();
    if !ring.iter().all_unique() {
        return Err(open);
    }
    Ok(Ring(ring))
}
