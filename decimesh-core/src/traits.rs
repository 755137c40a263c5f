//! Core traits for decimesh

use crate::{mesh::*, point::*};

/// Trait for objects with an axis-aligned extent
pub trait Bounded {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3d, Point3d);

    /// Get the center point of the object
    fn center(&self) -> Point3d {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Largest side of the bounding box
    fn max_extent(&self) -> f64 {
        let (min, max) = self.bounding_box();
        (max - min).max()
    }
}

impl Bounded for [Point3d] {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        let Some(first) = self.first() else {
            return (Point3d::origin(), Point3d::origin());
        };

        self.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        })
    }
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        self.vertices.as_slice().bounding_box()
    }
}
