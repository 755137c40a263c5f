//! Mutable vertex/triangle incidence graph
//!
//! Every vertex owns an unordered list of the triangles that use it; every
//! triangle names its three vertices and caches its normal, centroid and
//! area. Nothing is ever physically freed during a run: vertices are flagged
//! `deleted`, destroyed triangles leave an empty slot behind.

use decimesh_core::{triangle_geometry, Error, Point3d, Result, Vector3d};
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(pub usize);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl TriangleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A vertex -> triangle relation plus the scratch flag used by ring walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyEntry {
    pub triangle: TriangleId,
    pub visited: bool,
}

#[derive(Debug, Clone)]
pub struct Vertex {
    position: Point3d,
    normal: Option<Vector3d>,
    pub(crate) adjacency: Vec<AdjacencyEntry>,
    pub(crate) deleted: bool,
    pub(crate) removal_attempts: usize,
}

impl Vertex {
    fn new(position: Point3d, normal: Option<Vector3d>) -> Self {
        Self {
            position,
            normal,
            adjacency: Vec::new(),
            deleted: false,
            removal_attempts: 0,
        }
    }

    pub fn position(&self) -> &Point3d {
        &self.position
    }

    /// Input normal, or the area-weighted face normal once resolved
    pub fn normal(&self) -> Option<Vector3d> {
        self.normal
    }

    pub fn adjacency(&self) -> &[AdjacencyEntry] {
        &self.adjacency
    }

    /// Number of live triangles using this vertex
    pub fn incidence(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Accepted rings this vertex joined during the current pass
    pub fn removal_attempts(&self) -> usize {
        self.removal_attempts
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [VertexId; 3],
    normal: Vector3d,
    centroid: Point3d,
    area: f64,
    degenerate: bool,
}

impl Triangle {
    fn new(vertices: [VertexId; 3], positions: [&Point3d; 3]) -> Self {
        let (normal, doubled_area, centroid) =
            triangle_geometry(positions[0], positions[1], positions[2]);
        Self {
            vertices,
            normal: normal.unwrap_or_else(Vector3d::zeros),
            centroid,
            area: doubled_area * 0.5,
            degenerate: normal.is_none(),
        }
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Unit normal; zero for degenerate triangles
    pub fn normal(&self) -> &Vector3d {
        &self.normal
    }

    pub fn centroid(&self) -> &Point3d {
        &self.centroid
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    /// The two corners following `v` in winding order, or `None` if `v` is
    /// not a corner of this triangle.
    pub fn opposite_edge(&self, v: VertexId) -> Option<[VertexId; 2]> {
        let k = self.vertices.iter().position(|&x| x == v)?;
        Some([self.vertices[(k + 1) % 3], self.vertices[(k + 2) % 3]])
    }
}

/// The shared vertex pool and live triangle set of a decimation run.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyModel {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Option<Triangle>>,
    live_triangles: usize,
}

impl AdjacencyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
            live_triangles: 0,
        }
    }

    pub fn add_vertex(&mut self, position: Point3d, normal: Option<Vector3d>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::new(position, normal));
        id
    }

    /// Create a triangle and register it with its three corners.
    ///
    /// The corners must be distinct, live vertices of this model.
    pub fn add_triangle(&mut self, corners: [VertexId; 3]) -> TriangleId {
        debug_assert!(corners.iter().all_unique(), "triangle corners must be distinct");
        debug_assert!(corners.iter().all(|v| !self.vertices[v.index()].deleted));

        let positions = corners.map(|v| &self.vertices[v.index()].position);
        let triangle = Triangle::new(corners, positions);
        let id = TriangleId(self.triangles.len());
        self.triangles.push(Some(triangle));
        self.live_triangles += 1;

        for v in corners {
            self.vertices[v.index()].adjacency.push(AdjacencyEntry {
                triangle: id,
                visited: false,
            });
        }
        id
    }

    /// Detach a triangle from its corners and destroy it
    pub fn remove_triangle(&mut self, id: TriangleId) -> Option<Triangle> {
        let triangle = self.triangles.get_mut(id.index())?.take()?;
        for v in triangle.vertices {
            self.vertices[v.index()].adjacency.retain(|e| e.triangle != id);
        }
        self.live_triangles -= 1;
        Some(triangle)
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id.index()).and_then(Option::as_ref)
    }

    /// All vertex slots, deleted ones included
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    /// Live triangles in creation order
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TriangleId(i), t)))
    }

    pub fn incident_triangles(&self, v: VertexId) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.vertices[v.index()].adjacency.iter().filter_map(move |e| {
            self.triangles[e.triangle.index()]
                .as_ref()
                .map(|t| (e.triangle, t))
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn live_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| !v.deleted).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.live_triangles
    }

    pub(crate) fn reset_removal_attempts(&mut self) {
        for v in &mut self.vertices {
            v.removal_attempts = 0;
        }
    }

    /// Give every vertex without an input normal the area-weighted normal of
    /// its incident triangles.
    pub(crate) fn resolve_missing_normals(&mut self) {
        for i in 0..self.vertices.len() {
            if self.vertices[i].normal.is_some() {
                continue;
            }
            let sum: Vector3d = self
                .incident_triangles(VertexId(i))
                .map(|(_, t)| t.normal * t.area)
                .sum();
            self.vertices[i].normal = Some(sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::z));
        }
    }

    /// Check the incidence invariants: triangle corners are distinct and
    /// back-referenced, adjacency entries point at live triangles that
    /// contain the vertex, deleted vertices own no entries.
    pub fn validate(&self) -> Result<()> {
        for (id, triangle) in self.triangles() {
            if !triangle.vertices.iter().all_unique() {
                return Err(Error::InvalidData(format!(
                    "triangle {:?} repeats a corner: {:?}",
                    id, triangle.vertices
                )));
            }
            for v in triangle.vertices {
                let vertex = &self.vertices[v.index()];
                if vertex.deleted {
                    return Err(Error::InvalidData(format!(
                        "triangle {:?} uses deleted vertex {:?}",
                        id, v
                    )));
                }
                if !vertex.adjacency.iter().any(|e| e.triangle == id) {
                    return Err(Error::InvalidData(format!(
                        "vertex {:?} does not list triangle {:?}",
                        v, id
                    )));
                }
            }
        }

        for (v, vertex) in self.vertices() {
            if vertex.deleted && !vertex.adjacency.is_empty() {
                return Err(Error::InvalidData(format!(
                    "deleted vertex {:?} still has {} adjacency entries",
                    v,
                    vertex.adjacency.len()
                )));
            }
            if !vertex.adjacency.iter().map(|e| e.triangle).all_unique() {
                return Err(Error::InvalidData(format!(
                    "vertex {:?} lists a triangle twice",
                    v
                )));
            }
            for entry in &vertex.adjacency {
                match self.triangle(entry.triangle) {
                    Some(t) if t.contains(v) => {}
                    _ => {
                        return Err(Error::InvalidData(format!(
                            "vertex {:?} lists stale triangle {:?}",
                            v, entry.triangle
                        )))
                    }
                }
                if entry.visited {
                    return Err(Error::InvalidData(format!(
                        "vertex {:?} has a dangling visited mark",
                        v
                    )));
                }
            }
        }
        Ok(())
    }
}
