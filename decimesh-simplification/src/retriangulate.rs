//! Recursive split-plane triangulation of a vertex ring
//!
//! A ring of `n` points is cut along the diagonal `(i, j)` whose split plane
//! (through both ends, containing the average normal) keeps each remaining
//! chain strictly on one side, the two chains on opposite sides, and whose
//! clearance-to-length ratio is largest. Both halves are cut the same way
//! until only triangles remain, which yields `n - 2` triangles that cannot
//! overlap each other.

use crate::error::DecimationError;
use decimesh_core::{Point3d, Vector3d};
use itertools::Itertools;
use std::collections::HashSet;

/// Distances below this fraction of the split length count as "on the plane"
const ON_PLANE_EPSILON: f64 = 1e-12;

/// One accepted cut: `polygon` holds ring indices, `i < j` index into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub polygon: Vec<usize>,
    pub i: usize,
    pub j: usize,
    pub aspect_ratio: f64,
}

/// Triangles over ring indices, plus every cut taken to produce them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub triangles: Vec<[usize; 3]>,
    pub splits: Vec<Split>,
}

#[derive(Debug, Clone, Copy)]
pub struct Retriangulator {
    pub min_aspect_ratio: f64,
}

impl Retriangulator {
    pub fn new(min_aspect_ratio: f64) -> Self {
        Self { min_aspect_ratio }
    }

    /// Triangulate the closed ring `points` as seen along `normal`.
    pub fn retriangulate(
        &self,
        points: &[Point3d],
        normal: &Vector3d,
    ) -> Result<Triangulation, DecimationError> {
        self.retriangulate_avoiding(points, normal, &HashSet::new())
    }

    /// Like [`Retriangulator::retriangulate`], but never cuts along a ring
    /// index pair listed in `blocked` (stored as `(min, max)`).
    pub fn retriangulate_avoiding(
        &self,
        points: &[Point3d],
        normal: &Vector3d,
        blocked: &HashSet<(usize, usize)>,
    ) -> Result<Triangulation, DecimationError> {
        if points.len() < 3 {
            return Err(DecimationError::NoValidSplit { ring_len: points.len() });
        }
        let polygon: Vec<usize> = (0..points.len()).collect();
        let mut out = Triangulation::default();
        self.split_polygon(points, normal, blocked, &polygon, &mut out)?;
        Ok(out)
    }

    fn split_polygon(
        &self,
        points: &[Point3d],
        normal: &Vector3d,
        blocked: &HashSet<(usize, usize)>,
        polygon: &[usize],
        out: &mut Triangulation,
    ) -> Result<(), DecimationError> {
        let n = polygon.len();
        if n == 3 {
            out.triangles.push([polygon[0], polygon[1], polygon[2]]);
            return Ok(());
        }

        let (i, j, aspect_ratio) = self
            .best_split(points, normal, blocked, polygon)
            .ok_or(DecimationError::NoValidSplit { ring_len: n })?;
        out.splits.push(Split {
            polygon: polygon.to_vec(),
            i,
            j,
            aspect_ratio,
        });

        let wrapped: Vec<usize> = polygon[j..].iter().chain(&polygon[..=i]).copied().collect();
        self.split_polygon(points, normal, blocked, &polygon[i..=j], out)?;
        self.split_polygon(points, normal, blocked, &wrapped, out)
    }

    /// The admissible cut with the largest aspect ratio; ties keep the first
    /// pair in `(i, j)` order.
    pub fn best_split(
        &self,
        points: &[Point3d],
        normal: &Vector3d,
        blocked: &HashSet<(usize, usize)>,
        polygon: &[usize],
    ) -> Option<(usize, usize, f64)> {
        let n = polygon.len();
        (0..n)
            .tuple_combinations()
            .filter(|&(i, j)| j >= i + 2 && !(i == 0 && j == n - 1))
            .filter(|&(i, j)| {
                let (a, b) = (polygon[i], polygon[j]);
                !blocked.contains(&(a.min(b), a.max(b)))
            })
            .filter_map(|(i, j)| {
                split_aspect_ratio(points, normal, polygon, i, j).map(|ratio| (i, j, ratio))
            })
            .filter(|&(_, _, ratio)| ratio > self.min_aspect_ratio)
            .fold(None, |best, candidate| match best {
                Some(b) if b.2 >= candidate.2 => Some(b),
                _ => Some(candidate),
            })
    }
}

/// Which side of the split plane a chain of signed distances lies on.
///
/// `None` if any member touches the plane or the sign flips along the chain.
fn chain_side(distances: impl Iterator<Item = f64>, tolerance: f64) -> Option<bool> {
    let mut side = None;
    for d in distances {
        if !d.is_finite() || d.abs() <= tolerance {
            return None;
        }
        let positive = d > 0.0;
        match side {
            None => side = Some(positive),
            Some(previous) if previous != positive => return None,
            Some(_) => {}
        }
    }
    side
}

/// Aspect ratio of the cut `(i, j)` through `polygon`, or `None` when the cut
/// is not plane-consistent.
///
/// The split plane passes through `polygon[i]` and `polygon[j]` and contains
/// `normal`. The chain strictly between `i` and `j` and the wrapped chain
/// from `j` back to `i` must each stay strictly on one side, on opposite
/// sides from each other. The ratio is the smallest distance of any other
/// polygon point from the plane over the cut length.
pub fn split_aspect_ratio(
    points: &[Point3d],
    normal: &Vector3d,
    polygon: &[usize],
    i: usize,
    j: usize,
) -> Option<f64> {
    let n = polygon.len();
    if i >= j || j >= n {
        return None;
    }
    let a = points[polygon[i]];
    let segment = points[polygon[j]] - a;
    let length = segment.norm();
    let plane_normal = segment.cross(normal).try_normalize(f64::EPSILON)?;
    let tolerance = ON_PLANE_EPSILON * length;
    let distance = |k: usize| plane_normal.dot(&(points[polygon[k]] - a));

    let inner = chain_side((i + 1..j).map(distance), tolerance)?;
    let outer = chain_side((j + 1..n).chain(0..i).map(distance), tolerance)?;
    if inner == outer {
        return None;
    }

    let clearance = (0..n)
        .filter(|&k| k != i && k != j)
        .map(|k| distance(k).abs())
        .fold(f64::INFINITY, f64::min);
    Some(clearance / length)
}

/// Whether the cut `(i, j)` through `polygon` is plane-consistent
pub fn is_plane_consistent(
    points: &[Point3d],
    normal: &Vector3d,
    polygon: &[usize],
    i: usize,
    j: usize,
) -> bool {
    split_aspect_ratio(points, normal, polygon, i, j).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regular_polygon(n: usize) -> Vec<Point3d> {
        (0..n)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / n as f64;
                Point3d::new(a.cos(), a.sin(), 0.0)
            })
            .collect()
    }

    fn signed_area(points: &[Point3d], t: &[usize; 3]) -> f64 {
        let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
        (b - a).cross(&(c - a)).z * 0.5
    }

    fn polygon_area(points: &[Point3d]) -> f64 {
        let n = points.len();
        (0..n)
            .map(|k| {
                let (p, q) = (points[k], points[(k + 1) % n]);
                p.x * q.y - q.x * p.y
            })
            .sum::<f64>()
            * 0.5
    }

    fn assert_tiles_polygon(points: &[Point3d], t: &Triangulation) {
        assert_eq!(t.triangles.len(), points.len() - 2);
        for tri in &t.triangles {
            assert!(signed_area(points, tri) > 0.0, "triangle {:?} is flipped", tri);
        }
        let total: f64 = t.triangles.iter().map(|tri| signed_area(points, tri)).sum();
        assert_relative_eq!(total, polygon_area(points), epsilon = 1e-12);
    }

    #[test]
    fn test_single_triangle() {
        let points = regular_polygon(3);
        let t = Retriangulator::new(0.1).retriangulate(&points, &Vector3d::z()).unwrap();
        assert_eq!(t.triangles, vec![[0, 1, 2]]);
        assert!(t.splits.is_empty());
    }

    #[test]
    fn test_square_takes_first_diagonal() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let t = Retriangulator::new(0.1).retriangulate(&points, &Vector3d::z()).unwrap();
        // (0, 2) and (1, 3) tie, the first one wins
        assert_eq!(t.splits[0].i, 0);
        assert_eq!(t.splits[0].j, 2);
        assert_relative_eq!(t.splits[0].aspect_ratio, 0.5);
        assert_tiles_polygon(&points, &t);
    }

    #[test]
    fn test_hexagon_cut_through_center() {
        let points = regular_polygon(6);
        let t = Retriangulator::new(0.05).retriangulate(&points, &Vector3d::z()).unwrap();
        let first = &t.splits[0];
        assert_eq!((first.i, first.j), (0, 3));
        assert_relative_eq!(first.aspect_ratio, 3f64.sqrt() / 4.0, epsilon = 1e-12);
        assert_tiles_polygon(&points, &t);
    }

    #[test]
    fn test_concave_ring() {
        // an arrow head: vertex 2 is a reflex corner
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, -1.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(2.0, 1.0, 0.0),
        ];
        let t = Retriangulator::new(0.01).retriangulate(&points, &Vector3d::z()).unwrap();
        // (1, 3) would run outside the ring
        assert_eq!((t.splits[0].i, t.splits[0].j), (0, 2));
        assert_tiles_polygon(&points, &t);
    }

    #[test]
    fn test_splits_remain_plane_consistent() {
        let points: Vec<Point3d> = regular_polygon(8)
            .into_iter()
            .map(|p| Point3d::new(p.x * 2.0, p.y, 0.0))
            .collect();
        let normal = Vector3d::z();
        let t = Retriangulator::new(0.01).retriangulate(&points, &normal).unwrap();
        assert_eq!(t.splits.len(), 5);
        for split in &t.splits {
            assert!(is_plane_consistent(&points, &normal, &split.polygon, split.i, split.j));
        }
        assert_tiles_polygon(&points, &t);
    }

    #[test]
    fn test_collinear_ring_has_no_split() {
        let points: Vec<Point3d> = (0..4).map(|k| Point3d::new(k as f64, 0.0, 0.0)).collect();
        let err = Retriangulator::new(0.01)
            .retriangulate(&points, &Vector3d::z())
            .unwrap_err();
        assert_eq!(err, DecimationError::NoValidSplit { ring_len: 4 });
    }

    #[test]
    fn test_aspect_ratio_floor() {
        let points = regular_polygon(6);
        assert!(Retriangulator::new(0.5).retriangulate(&points, &Vector3d::z()).is_err());
    }

    #[test]
    fn test_blocked_diagonal_is_avoided() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let blocked: HashSet<(usize, usize)> = [(0, 2)].into_iter().collect();
        let t = Retriangulator::new(0.1)
            .retriangulate_avoiding(&points, &Vector3d::z(), &blocked)
            .unwrap();
        assert_eq!((t.splits[0].i, t.splits[0].j), (1, 3));

        let both: HashSet<(usize, usize)> = [(0, 2), (1, 3)].into_iter().collect();
        assert!(Retriangulator::new(0.1)
            .retriangulate_avoiding(&points, &Vector3d::z(), &both)
            .is_err());
    }

    #[test]
    fn test_degenerate_ring_sizes() {
        let r = Retriangulator::new(0.1);
        assert!(r.retriangulate(&regular_polygon(2), &Vector3d::z()).is_err());
        assert!(!is_plane_consistent(&regular_polygon(5), &Vector3d::z(), &[0, 1, 2, 3, 4], 3, 1));
    }
}
