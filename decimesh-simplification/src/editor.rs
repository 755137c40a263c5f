//! Applying an accepted vertex removal to the adjacency model

use crate::adjacency::{AdjacencyModel, TriangleId, VertexId};
use crate::retriangulate::Triangulation;
use crate::ring::Ring;
use decimesh_core::Vector3d;

/// What a single removal changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalRecord {
    pub vertex: VertexId,
    pub ring_len: usize,
    pub triangles_removed: usize,
    pub triangles_added: usize,
}

/// Replace the fan around `v` with `triangulation` of its `ring`.
///
/// `triangulation` indexes into `ring`, `plane_normal` is the average plane
/// normal the triangulation was computed against. New triangles are wound so
/// their normals agree with it. The caller guarantees that the ring is the
/// closed one-ring of a live vertex and that every ring vertex is live.
pub fn apply_removal(
    model: &mut AdjacencyModel,
    v: VertexId,
    ring: &Ring,
    triangulation: &Triangulation,
    plane_normal: &Vector3d,
) -> RemovalRecord {
    debug_assert!(!model.vertex(v).is_deleted());
    debug_assert!(ring
        .iter()
        .all(|u| u != v && !model.vertex(u).is_deleted()));

    let fan: Vec<TriangleId> = model
        .vertex(v)
        .adjacency()
        .iter()
        .map(|e| e.triangle)
        .collect();
    for &t in &fan {
        model.remove_triangle(t);
    }
    debug_assert!(model.vertex(v).adjacency().is_empty());
    model.vertices[v.index()].deleted = true;

    for u in ring.iter() {
        model.vertices[u.index()].removal_attempts += 1;
    }

    let slots = ring.as_slice();
    for &[a, b, c] in &triangulation.triangles {
        let corners = orient(model, [slots[a], slots[b], slots[c]], plane_normal);
        model.add_triangle(corners);
    }

    RemovalRecord {
        vertex: v,
        ring_len: ring.len(),
        triangles_removed: fan.len(),
        triangles_added: triangulation.triangles.len(),
    }
}

/// Flip `(a, b, c)` to `(a, c, b)` when its winding opposes `normal`
fn orient(model: &AdjacencyModel, [a, b, c]: [VertexId; 3], normal: &Vector3d) -> [VertexId; 3] {
    let pa = model.vertex(a).position();
    let pb = model.vertex(b).position();
    let pc = model.vertex(c).position();
    let winding = (pb - pa).cross(&(pc - pb));
    if winding.dot(normal) < 0.0 {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriangulate::Retriangulator;
    use crate::ring::extract_ring;
    use approx::assert_relative_eq;
    use decimesh_core::Point3d;

    fn make_fan(n: usize) -> (AdjacencyModel, VertexId) {
        let mut model = AdjacencyModel::new();
        let center = model.add_vertex(Point3d::origin(), None);
        let rim: Vec<VertexId> = (0..n)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / n as f64;
                model.add_vertex(Point3d::new(a.cos(), a.sin(), 0.0), None)
            })
            .collect();
        for k in 0..n {
            model.add_triangle([center, rim[k], rim[(k + 1) % n]]);
        }
        (model, center)
    }

    #[test]
    fn test_hexagon_removal() {
        let (mut model, center) = make_fan(6);
        let area_before: f64 = model.triangles().map(|(_, t)| t.area()).sum();
        let ring = extract_ring(&mut model, center).unwrap();
        let points = ring.positions(&model);
        let triangulation = Retriangulator::new(0.05)
            .retriangulate(&points, &Vector3d::z())
            .unwrap();

        let record = apply_removal(&mut model, center, &ring, &triangulation, &Vector3d::z());

        assert_eq!(record.ring_len, 6);
        assert_eq!(record.triangles_removed, 6);
        assert_eq!(record.triangles_added, 4);
        assert_eq!(model.triangle_count(), 4);
        assert!(model.vertex(center).is_deleted());
        assert_eq!(model.live_vertex_count(), 6);
        for u in ring.iter() {
            assert_eq!(model.vertex(u).removal_attempts(), 1);
        }
        for (_, t) in model.triangles() {
            assert_relative_eq!(t.normal().z, 1.0);
            assert!(!t.contains(center));
        }
        let area_after: f64 = model.triangles().map(|(_, t)| t.area()).sum();
        assert_relative_eq!(area_before, area_after, epsilon = 1e-12);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_orientation_follows_plane_normal() {
        let (mut model, center) = make_fan(4);
        let ring = extract_ring(&mut model, center).unwrap();
        let points = ring.positions(&model);
        // triangulate against -z: the split search is symmetric, the
        // editor must still wind the result toward the given normal
        let down = -Vector3d::z();
        let triangulation = Retriangulator::new(0.05).retriangulate(&points, &down).unwrap();
        apply_removal(&mut model, center, &ring, &triangulation, &down);
        for (_, t) in model.triangles() {
            assert_relative_eq!(t.normal().z, -1.0);
        }
    }
}
