//! Tunables for planar vertex-removal decimation

use decimesh_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration of a decimation run.
///
/// `distance_threshold` and `min_aspect_ratio` are independent knobs: the
/// first decides which vertices are flat enough to remove, the second which
/// holes can be refilled. Tightening one can starve the other, so calibrate
/// them separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationConfig {
    /// Maximum distance of a vertex from its area-weighted average plane
    pub distance_threshold: f64,
    /// Number of full sweeps over the vertex set
    pub pass_count: usize,
    /// How many accepted rings a vertex may belong to within one pass
    pub removal_attempt_limit: usize,
    /// Minimum clearance-to-length ratio of a retriangulation split
    pub min_aspect_ratio: f64,
    /// Vertex weld tolerance, relative to the largest bounding box extent
    pub weld_tolerance: f64,
    /// Spatial hash bucket count; `None` uses one bucket per input vertex
    pub bucket_count: Option<usize>,
}

impl Default for DecimationConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 1e-4,
            pass_count: 3,
            removal_attempt_limit: 3,
            min_aspect_ratio: 0.05,
            weld_tolerance: 1e-9,
            bucket_count: None,
        }
    }
}

impl DecimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(
        distance_threshold: f64,
        pass_count: usize,
        removal_attempt_limit: usize,
        min_aspect_ratio: f64,
    ) -> Self {
        Self {
            distance_threshold,
            pass_count,
            removal_attempt_limit,
            min_aspect_ratio,
            ..Self::default()
        }
    }

    pub fn with_distance_threshold(mut self, distance_threshold: f64) -> Self {
        self.distance_threshold = distance_threshold;
        self
    }

    pub fn with_pass_count(mut self, pass_count: usize) -> Self {
        self.pass_count = pass_count;
        self
    }

    pub fn with_removal_attempt_limit(mut self, limit: usize) -> Self {
        self.removal_attempt_limit = limit;
        self
    }

    pub fn with_min_aspect_ratio(mut self, min_aspect_ratio: f64) -> Self {
        self.min_aspect_ratio = min_aspect_ratio;
        self
    }

    pub fn with_weld_tolerance(mut self, weld_tolerance: f64) -> Self {
        self.weld_tolerance = weld_tolerance;
        self
    }

    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = Some(bucket_count);
        self
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "distance_threshold must be a finite non-negative length, got {}",
                self.distance_threshold
            )));
        }
        if self.pass_count == 0 {
            return Err(Error::InvalidConfig("pass_count must be positive".to_string()));
        }
        if self.removal_attempt_limit == 0 {
            return Err(Error::InvalidConfig(
                "removal_attempt_limit must be positive".to_string(),
            ));
        }
        if !self.min_aspect_ratio.is_finite() || self.min_aspect_ratio <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_aspect_ratio must be finite and > 0, got {}",
                self.min_aspect_ratio
            )));
        }
        if !self.weld_tolerance.is_finite() || self.weld_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "weld_tolerance must be finite and >= 0, got {}",
                self.weld_tolerance
            )));
        }
        if self.bucket_count == Some(0) {
            return Err(Error::InvalidConfig("bucket_count must be positive".to_string()));
        }
        Ok(())
    }
}
