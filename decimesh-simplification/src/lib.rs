//! Planar vertex-removal mesh decimation
//!
//! Vertices whose neighborhood is flat to within a distance threshold are
//! removed and the hole left behind is refilled by recursively splitting the
//! one-ring polygon:
//! - Spatial hashing welds coincident input corners into shared vertices
//! - An adjacency model tracks vertex/triangle incidence during editing
//! - Candidate selection tests a vertex against its average plane
//! - Ring extraction orders the neighbors of a vertex into a closed loop
//! - Split-plane retriangulation fills the loop without overlaps

pub mod adjacency;
pub mod spatial_index;
pub mod candidate;
pub mod ring;
pub mod retriangulate;
pub mod editor;
pub mod decimate;
pub mod config;
pub mod error;

pub use adjacency::*;
pub use spatial_index::*;
pub use candidate::*;
pub use ring::*;
pub use retriangulate::*;
pub use editor::*;
pub use decimate::*;
pub use config::*;
pub use error::*;

use decimesh_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify `mesh` according to the simplifier's own configuration
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh>;
}
