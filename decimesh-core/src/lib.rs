//! Core data structures and traits for decimesh
//!
//! This crate provides the plain indexed-triangle mesh consumed and produced
//! by the decimation engine, double precision geometry aliases, and the
//! shared error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
