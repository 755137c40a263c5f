//! Engine-level errors for a decimation run

use crate::adjacency::VertexId;
use thiserror::Error;

/// Why a vertex could not be removed, or why a run had to stop.
///
/// Only [`DecimationError::Domain`] aborts a run. Every other variant is a
/// per-vertex verdict: the vertex is left alone for the current pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecimationError {
    #[error("spatial hash key {key} outside of {bucket_count} buckets")]
    Domain { key: f64, bucket_count: usize },

    #[error("one-ring of vertex {vertex:?} does not close")]
    OpenRing { vertex: VertexId },

    #[error("no plane-consistent split for a ring of {ring_len} vertices")]
    NoValidSplit { ring_len: usize },

    #[error("vertex {vertex:?} is not a removal candidate")]
    NotACandidate { vertex: VertexId },

    #[error("ring member {member:?} of vertex {vertex:?} reached its attempt limit")]
    RingExhausted { vertex: VertexId, member: VertexId },
}

impl DecimationError {
    /// Whether the driver may skip the vertex and keep going
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DecimationError::Domain { .. })
    }
}

impl From<DecimationError> for decimesh_core::Error {
    fn from(e: DecimationError) -> Self {
        match e {
            DecimationError::Domain { .. } => decimesh_core::Error::Domain(e.to_string()),
            other => decimesh_core::Error::Algorithm(other.to_string()),
        }
    }
}
