//! Flatness test deciding which vertices are worth removing

use crate::adjacency::{AdjacencyModel, VertexId};
use decimesh_core::{Point3d, Vector3d};

/// Area-weighted average plane of a vertex's incident triangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragePlane {
    pub normal: Vector3d,
    pub centroid: Point3d,
}

impl AveragePlane {
    /// Unsigned distance of `p` from the plane
    pub fn distance(&self, p: &Point3d) -> f64 {
        (p - self.centroid).dot(&self.normal).abs()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    pub distance_threshold: f64,
    pub removal_attempt_limit: usize,
}

impl CandidateSelector {
    pub fn new(distance_threshold: f64, removal_attempt_limit: usize) -> Self {
        Self {
            distance_threshold,
            removal_attempt_limit,
        }
    }

    /// Area-weighted normal and centroid over the triangles incident to `v`.
    ///
    /// `None` when the neighborhood has no area or its normals cancel out.
    pub fn average_plane(&self, model: &AdjacencyModel, v: VertexId) -> Option<AveragePlane> {
        let mut normal = Vector3d::zeros();
        let mut centroid = Vector3d::zeros();
        let mut total_area = 0.0;

        for (_, t) in model.incident_triangles(v) {
            normal += t.normal() * t.area();
            centroid += t.centroid().coords * t.area();
            total_area += t.area();
        }

        if !(total_area > 0.0) {
            return None;
        }
        let normal = normal.try_normalize(f64::EPSILON)?;
        Some(AveragePlane {
            normal,
            centroid: Point3d::from(centroid / total_area),
        })
    }

    /// Decide whether `v` should be offered for removal.
    ///
    /// Returns the plane the retriangulation must respect when it should.
    pub fn select(&self, model: &AdjacencyModel, v: VertexId) -> Option<AveragePlane> {
        let vertex = model.vertex(v);
        if vertex.is_deleted()
            || vertex.removal_attempts() >= self.removal_attempt_limit
            || vertex.incidence() < 3
        {
            return None;
        }

        let plane = self.average_plane(model, v)?;
        (plane.distance(vertex.position()) < self.distance_threshold).then_some(plane)
    }

    pub fn is_removable(&self, model: &AdjacencyModel, v: VertexId) -> bool {
        self.select(model, v).is_some()
    }
}
