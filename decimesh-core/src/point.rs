//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A triangle corner: position plus the normal carried by that corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPoint3d {
    pub position: Point3d,
    pub normal: Option<Vector3d>,
}

impl NormalPoint3d {
    pub fn new(position: Point3d, normal: Option<Vector3d>) -> Self {
        Self { position, normal }
    }
}

impl Default for NormalPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            normal: None,
        }
    }
}

/// Unit normal, doubled area and centroid of the triangle `(a, b, c)`.
///
/// The normal follows the right-hand rule over `(b - a) x (c - a)` and is
/// `None` when the corners are collinear relative to the longest edge.
pub fn triangle_geometry(a: &Point3d, b: &Point3d, c: &Point3d) -> (Option<Vector3d>, f64, Point3d) {
    let cross = (b - a).cross(&(c - a));
    let doubled_area = cross.norm();
    let longest = (b - a)
        .norm_squared()
        .max((c - b).norm_squared())
        .max((a - c).norm_squared());
    let centroid = Point3d::from((a.coords + b.coords + c.coords) / 3.0);

    let normal = if doubled_area.is_finite() && doubled_area > DEGENERATE_EPSILON * longest {
        Some(cross / doubled_area)
    } else {
        None
    };
    (normal, doubled_area, centroid)
}

/// Relative collinearity tolerance used by [`triangle_geometry`]
pub const DEGENERATE_EPSILON: f64 = 1e-12;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_geometry_unit_right_triangle() {
        let (normal, doubled_area, centroid) = triangle_geometry(
            &Point3d::new(0.0, 0.0, 0.0),
            &Point3d::new(1.0, 0.0, 0.0),
            &Point3d::new(0.0, 1.0, 0.0),
        );
        let normal = normal.unwrap();
        assert_relative_eq!(normal.z, 1.0);
        assert_relative_eq!(doubled_area, 1.0);
        assert_relative_eq!(centroid.x, 1.0 / 3.0);
        assert_relative_eq!(centroid.y, 1.0 / 3.0);
    }

    #[test]
    fn test_triangle_geometry_collinear() {
        let (normal, doubled_area, _) = triangle_geometry(
            &Point3d::new(0.0, 0.0, 0.0),
            &Point3d::new(1.0, 1.0, 1.0),
            &Point3d::new(2.0, 2.0, 2.0),
        );
        assert!(normal.is_none());
        assert_relative_eq!(doubled_area, 0.0);
    }
}
