//! Hashed-bucket vertex welding
//!
//! Triangle-soup corners are merged into shared vertices by hashing the
//! coordinate sum `x + y + z` into one of `bucket_count` buckets spanning the
//! input's sum range. Identity is decided by the weld tolerance, not the
//! hash: a query probes every bucket its tolerance window touches and returns
//! the first vertex whose coordinates all lie within the tolerance.

use crate::adjacency::{AdjacencyModel, VertexId};
use crate::error::DecimationError;
use decimesh_core::{Bounded, Point3d, Vector3d};

/// The coordinate-sum range covered by the buckets and the weld tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialDomain {
    pub min: f64,
    pub size: f64,
    pub tolerance: f64,
}

impl SpatialDomain {
    /// Domain of the finite points in `points`. The tolerance is
    /// `weld_tolerance` times the largest bounding box extent.
    pub fn from_points(points: &[Point3d], weld_tolerance: f64) -> Self {
        let finite: Vec<Point3d> = points
            .iter()
            .filter(|p| p.iter().all(|c| c.is_finite()))
            .copied()
            .collect();
        if finite.is_empty() {
            return Self { min: 0.0, size: 0.0, tolerance: 0.0 };
        }

        let (min, max) = finite
            .iter()
            .map(|p| p.x + p.y + p.z)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));

        Self {
            min,
            size: max - min,
            tolerance: weld_tolerance * finite.as_slice().max_extent(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpatialVertexIndex {
    domain: SpatialDomain,
    buckets: Vec<Vec<VertexId>>,
}

impl SpatialVertexIndex {
    pub fn new(domain: SpatialDomain, bucket_count: usize) -> Self {
        Self {
            domain,
            buckets: vec![Vec::new(); bucket_count.max(1)],
        }
    }

    pub fn domain(&self) -> &SpatialDomain {
        &self.domain
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Fractional bucket coordinate of a coordinate sum
    fn raw_key(&self, sum: f64) -> f64 {
        let offset = sum - self.domain.min;
        if self.domain.size > 0.0 {
            offset / self.domain.size * self.buckets.len() as f64
        } else if offset.abs() <= 3.0 * self.domain.tolerance {
            // flat domain: everything within tolerance lands in bucket 0
            0.0
        } else {
            offset.signum() * f64::INFINITY
        }
    }

    /// Bucket holding `position`.
    ///
    /// Fails with [`DecimationError::Domain`] when the position lies outside
    /// the domain the index was built for.
    pub fn bucket_key(&self, position: &Point3d) -> Result<usize, DecimationError> {
        let n = self.buckets.len();
        let raw = self.raw_key(position.x + position.y + position.z);
        let slack = 3.0 * self.domain.tolerance;
        let below = self.raw_key(self.domain.min - slack);
        let above = self.raw_key(self.domain.min + self.domain.size + slack);
        if !raw.is_finite() || raw < below.min(0.0) || raw > above.max(n as f64) {
            return Err(DecimationError::Domain { key: raw, bucket_count: n });
        }
        Ok((raw.max(0.0) as usize).min(n - 1))
    }

    /// Inclusive bucket range a query at `position` must probe
    fn probe_range(&self, position: &Point3d) -> (usize, usize) {
        let n = self.buckets.len();
        let sum = position.x + position.y + position.z;
        let slack = 3.0 * self.domain.tolerance;
        let clamp = |raw: f64| {
            if raw.is_nan() {
                0
            } else {
                (raw.max(0.0) as usize).min(n - 1)
            }
        };
        (clamp(self.raw_key(sum - slack)), clamp(self.raw_key(sum + slack)))
    }

    /// Return the vertex matching `position` within the weld tolerance, or
    /// allocate a new one in `model`.
    pub fn insert_or_get(
        &mut self,
        model: &mut AdjacencyModel,
        position: Point3d,
        normal: Option<Vector3d>,
    ) -> Result<VertexId, DecimationError> {
        let key = self.bucket_key(&position)?;
        let tolerance = self.domain.tolerance;

        let (lo, hi) = self.probe_range(&position);
        let existing = self.buckets[lo..=hi].iter().flatten().copied().find(|&v| {
            let p = model.vertex(v).position();
            (p - position).iter().all(|d| d.abs() <= tolerance)
        });
        if let Some(v) = existing {
            return Ok(v);
        }

        let v = model.add_vertex(position, normal);
        self.buckets[key].push(v);
        Ok(v)
    }

    /// Every indexed vertex, bucket by bucket, insertion order within a bucket
    pub fn vertices_in_bucket_order(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.buckets.iter().flatten().copied()
    }
}
