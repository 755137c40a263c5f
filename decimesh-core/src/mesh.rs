//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and optional per-vertex normals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3d>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3d) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Set vertex normals; ignored when the length does not match the vertices
    pub fn set_normals(&mut self, normals: Vec<Vector3d>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Check that every face references existing vertices and that the
    /// normals, when present, cover every vertex.
    pub fn validate(&self) -> Result<()> {
        if let Some(normals) = &self.normals {
            if normals.len() != self.vertices.len() {
                return Err(Error::InvalidData(format!(
                    "{} normals for {} vertices",
                    normals.len(),
                    self.vertices.len()
                )));
            }
        }
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&vi| vi >= self.vertices.len()) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    fi,
                    bad,
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// The three corners of a face as position/normal records
    pub fn corners(&self, face: usize) -> [NormalPoint3d; 3] {
        let f = self.faces[face];
        f.map(|vi| NormalPoint3d {
            position: self.vertices[vi],
            normal: self.normals.as_ref().map(|n| n[vi]),
        })
    }

    /// Calculate unit face normals; degenerate faces get a zero vector
    pub fn calculate_face_normals(&self) -> Vec<Vector3d> {
        self.faces
            .iter()
            .map(|face| {
                let (normal, _, _) = triangle_geometry(
                    &self.vertices[face[0]],
                    &self.vertices[face[1]],
                    &self.vertices[face[2]],
                );
                normal.unwrap_or_else(Vector3d::zeros)
            })
            .collect()
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|face| {
                let (_, doubled_area, _) = triangle_geometry(
                    &self.vertices[face[0]],
                    &self.vertices[face[1]],
                    &self.vertices[face[2]],
                );
                doubled_area * 0.5
            })
            .sum()
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_counts_and_area() {
        let mesh = unit_square();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.is_empty());
        assert_relative_eq!(mesh.surface_area(), 1.0);
        for n in mesh.calculate_face_normals() {
            assert_relative_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_clear() {
        let mut mesh = unit_square();
        mesh.set_normals(vec![Vector3d::z(); 4]);
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.normals.is_none());
        assert_eq!(mesh, TriangleMesh::default());
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = unit_square();
        mesh.add_face([0, 1, 7]);
        assert!(matches!(mesh.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_validate_rejects_short_normals() {
        let mut mesh = unit_square();
        mesh.normals = Some(vec![Vector3d::z(); 3]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_set_normals_length_mismatch_ignored() {
        let mut mesh = unit_square();
        mesh.set_normals(vec![Vector3d::z(); 2]);
        assert!(mesh.normals.is_none());
        mesh.set_normals(vec![Vector3d::z(); 4]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_corners_carry_normals() {
        let mut mesh = unit_square();
        assert!(mesh.corners(0).iter().all(|c| c.normal.is_none()));
        mesh.set_normals(vec![Vector3d::z(); 4]);
        let corners = mesh.corners(1);
        assert_eq!(corners[2].position, Point3d::new(0.0, 1.0, 0.0));
        assert_eq!(corners[2].normal, Some(Vector3d::z()));
    }
}
