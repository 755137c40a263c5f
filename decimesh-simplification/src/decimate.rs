//! Planar vertex-removal decimation driver
//!
//! Builds the adjacency model once, sweeps every vertex for a fixed number of
//! passes (select, extract ring, retriangulate, edit), then exports the
//! surviving triangles as an indexed mesh. Individual removals fail locally
//! and silently; only a spatial hash domain violation aborts the run.

use crate::adjacency::{AdjacencyModel, VertexId};
use crate::candidate::CandidateSelector;
use crate::config::DecimationConfig;
use crate::editor::{apply_removal, RemovalRecord};
use crate::error::DecimationError;
use crate::retriangulate::Retriangulator;
use crate::ring::extract_ring;
use crate::spatial_index::{SpatialDomain, SpatialVertexIndex};
use crate::MeshSimplifier;
use decimesh_core::{Error, Result, TriangleMesh, Vector3d};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, info_span, trace};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Indexing,
    Pass(usize),
    Exporting,
    Done,
}

/// Per-pass counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    pub pass: usize,
    pub removed: usize,
    pub not_candidate: usize,
    pub open_ring: usize,
    pub no_valid_split: usize,
    pub ring_exhausted: usize,
    pub triangles_before: usize,
    pub triangles_after: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimationStats {
    pub input_vertices: usize,
    pub input_triangles: usize,
    /// Distinct vertices left after welding
    pub welded_vertices: usize,
    /// Input faces dropped at ingestion (collapsed by welding or repeated)
    pub skipped_faces: usize,
    pub passes: Vec<PassStats>,
    pub degenerate_dropped: usize,
    pub output_vertices: usize,
    pub output_triangles: usize,
}

impl DecimationStats {
    pub fn vertices_removed(&self) -> usize {
        self.passes.iter().map(|p| p.removed).sum()
    }
}

/// The decimated mesh plus what it took to get there
#[derive(Debug, Clone)]
pub struct DecimationOutcome {
    pub mesh: TriangleMesh,
    pub stats: DecimationStats,
}

/// A single decimation run over one mesh.
///
/// Owns the adjacency model for its whole lifetime. Use
/// [`PlanarDecimator`] for the one-call version.
#[derive(Debug)]
pub struct DecimationEngine {
    config: DecimationConfig,
    model: AdjacencyModel,
    order: Vec<VertexId>,
    /// Smallest input vertex index welded into each vertex
    source: Vec<usize>,
    state: DriverState,
    removals: Vec<RemovalRecord>,
    stats: DecimationStats,
}

impl DecimationEngine {
    /// Validate the inputs and weld `mesh` into a fresh adjacency model.
    pub fn from_mesh(mesh: &TriangleMesh, config: DecimationConfig) -> Result<Self> {
        config.validate()?;
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        mesh.validate()?;

        let mut engine = Self {
            config,
            model: AdjacencyModel::with_capacity(mesh.vertex_count(), mesh.face_count()),
            order: Vec::new(),
            source: Vec::with_capacity(mesh.vertex_count()),
            state: DriverState::Idle,
            removals: Vec::new(),
            stats: DecimationStats {
                input_vertices: mesh.vertex_count(),
                input_triangles: mesh.face_count(),
                ..Default::default()
            },
        };
        engine.transition(DriverState::Indexing);
        engine.index(mesh)?;
        Ok(engine)
    }

    fn index(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let domain = SpatialDomain::from_points(&mesh.vertices, self.config.weld_tolerance);
        let bucket_count = self
            .config
            .bucket_count
            .unwrap_or_else(|| mesh.vertex_count().max(1));
        let mut index = SpatialVertexIndex::new(domain, bucket_count);
        let mut seen: HashSet<[VertexId; 3]> = HashSet::with_capacity(mesh.face_count());

        for fi in 0..mesh.face_count() {
            let mut corners = [VertexId(0); 3];
            let inputs = mesh.faces[fi];
            for ((slot, corner), input) in corners.iter_mut().zip(mesh.corners(fi)).zip(inputs) {
                let v = index.insert_or_get(&mut self.model, corner.position, corner.normal)?;
                match self.source.get_mut(v.index()) {
                    Some(first) => *first = (*first).min(input),
                    None => self.source.push(input),
                }
                *slot = v;
            }

            let mut key = corners;
            key.sort();
            if key[0] == key[1] || key[1] == key[2] || !seen.insert(key) {
                self.stats.skipped_faces += 1;
                continue;
            }
            self.model.add_triangle(corners);
        }

        self.model.resolve_missing_normals();
        self.order = index
            .vertices_in_bucket_order()
            .filter(|&v| self.model.vertex(v).incidence() > 0)
            .collect();
        self.stats.welded_vertices = self.model.vertex_count();

        debug!(
            "Indexed {} faces into {} vertices over {} buckets ({} faces skipped)",
            mesh.face_count(),
            self.stats.welded_vertices,
            index.bucket_count(),
            self.stats.skipped_faces
        );
        Ok(())
    }

    fn transition(&mut self, next: DriverState) {
        debug!(from = ?self.state, to = ?next, "decimation state change");
        self.state = next;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &DecimationConfig {
        &self.config
    }

    pub fn model(&self) -> &AdjacencyModel {
        &self.model
    }

    pub fn stats(&self) -> &DecimationStats {
        &self.stats
    }

    /// Every removal accepted so far, in application order
    pub fn removals(&self) -> &[RemovalRecord] {
        &self.removals
    }

    /// Live vertices in the order passes visit them
    pub fn vertex_order(&self) -> &[VertexId] {
        &self.order
    }

    /// Try to remove one vertex: select, extract ring, retriangulate, edit.
    ///
    /// Any error leaves the model exactly as it was.
    pub fn try_remove_vertex(&mut self, v: VertexId) -> std::result::Result<RemovalRecord, DecimationError> {
        let limit = self.config.removal_attempt_limit;
        let selector = CandidateSelector::new(self.config.distance_threshold, limit);
        let plane = selector
            .select(&self.model, v)
            .ok_or(DecimationError::NotACandidate { vertex: v })?;

        let ring = extract_ring(&mut self.model, v)?;
        if let Some(member) = ring
            .iter()
            .find(|&u| self.model.vertex(u).removal_attempts() >= limit)
        {
            return Err(DecimationError::RingExhausted { vertex: v, member });
        }
        if ring.is_capped(&self.model, v) {
            return Err(DecimationError::NoValidSplit { ring_len: ring.len() });
        }

        let points = ring.positions(&self.model);
        let blocked = ring.existing_links(&self.model, v);
        let triangulation = Retriangulator::new(self.config.min_aspect_ratio)
            .retriangulate_avoiding(&points, &plane.normal, &blocked)?;

        let record = apply_removal(&mut self.model, v, &ring, &triangulation, &plane.normal);
        self.removals.push(record);
        Ok(record)
    }

    /// Run one sweep over all live vertices
    pub fn run_pass(&mut self) -> PassStats {
        let pass = self.stats.passes.len() + 1;
        self.transition(DriverState::Pass(pass));
        self.model.reset_removal_attempts();

        let mut stats = PassStats {
            pass,
            triangles_before: self.model.triangle_count(),
            ..Default::default()
        };

        for k in 0..self.order.len() {
            let v = self.order[k];
            if self.model.vertex(v).is_deleted() {
                continue;
            }
            match self.try_remove_vertex(v) {
                Ok(record) => {
                    trace!(vertex = v.index(), ring = record.ring_len, "vertex removed");
                    stats.removed += 1;
                }
                Err(DecimationError::NotACandidate { .. }) => stats.not_candidate += 1,
                Err(DecimationError::OpenRing { .. }) => {
                    trace!(vertex = v.index(), "open ring");
                    stats.open_ring += 1;
                }
                Err(DecimationError::NoValidSplit { ring_len }) => {
                    trace!(vertex = v.index(), ring_len, "no valid split");
                    stats.no_valid_split += 1;
                }
                Err(DecimationError::RingExhausted { member, .. }) => {
                    trace!(vertex = v.index(), member = member.index(), "ring member exhausted");
                    stats.ring_exhausted += 1;
                }
                Err(e @ DecimationError::Domain { .. }) => {
                    debug_assert!(false, "vertex removal hashed a position: {}", e);
                }
            }
        }

        let model = &self.model;
        self.order.retain(|&v| !model.vertex(v).is_deleted());
        debug_assert!(self.model.validate().is_ok());

        stats.triangles_after = self.model.triangle_count();
        debug!(
            "Pass {}: removed {} vertices, {} -> {} triangles ({} open rings, {} without split, {} exhausted)",
            pass,
            stats.removed,
            stats.triangles_before,
            stats.triangles_after,
            stats.open_ring,
            stats.no_valid_split,
            stats.ring_exhausted
        );
        self.stats.passes.push(stats.clone());
        stats
    }

    /// Emit the surviving, non-degenerate triangles as an indexed mesh.
    ///
    /// Vertices keep the relative order of the input vertices they were
    /// welded from.
    pub fn export(&mut self) -> TriangleMesh {
        self.transition(DriverState::Exporting);

        let mut faces = Vec::with_capacity(self.model.triangle_count());
        let mut degenerate = 0;
        for (_, t) in self.model.triangles() {
            if t.is_degenerate() {
                degenerate += 1;
                continue;
            }
            faces.push(t.vertices());
        }

        let mut used: Vec<VertexId> = faces.iter().flatten().copied().collect();
        used.sort_unstable_by_key(|v| self.source[v.index()]);
        used.dedup();
        let old_to_new: HashMap<VertexId, usize> =
            used.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let vertices = used.iter().map(|&v| *self.model.vertex(v).position()).collect();
        let normals = used
            .iter()
            .map(|&v| self.model.vertex(v).normal().unwrap_or_else(Vector3d::z))
            .collect();
        let faces = faces
            .into_iter()
            .map(|f| f.map(|v| old_to_new[&v]))
            .collect();

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.set_normals(normals);

        self.stats.degenerate_dropped = degenerate;
        self.stats.output_vertices = mesh.vertex_count();
        self.stats.output_triangles = mesh.face_count();
        self.transition(DriverState::Done);
        mesh
    }

    /// Run the configured passes and export. A pass that removes nothing
    /// leaves the model unchanged, so the remaining passes are skipped.
    pub fn run(mut self) -> DecimationOutcome {
        for _ in 0..self.config.pass_count {
            if self.run_pass().removed == 0 {
                break;
            }
        }
        let mesh = self.export();
        DecimationOutcome {
            mesh,
            stats: self.stats,
        }
    }
}

/// Planar vertex-removal simplifier.
///
/// Removes vertices whose neighborhood lies within `distance_threshold` of
/// its area-weighted average plane and refills each hole with a
/// non-overlapping triangulation of the vertex's one-ring.
#[derive(Debug, Clone, Default)]
pub struct PlanarDecimator {
    pub config: DecimationConfig,
}

impl PlanarDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecimationConfig) -> Self {
        Self { config }
    }

    pub fn with_params(
        distance_threshold: f64,
        pass_count: usize,
        removal_attempt_limit: usize,
        min_aspect_ratio: f64,
    ) -> Self {
        Self::with_config(DecimationConfig::with_params(
            distance_threshold,
            pass_count,
            removal_attempt_limit,
            min_aspect_ratio,
        ))
    }

    pub fn decimate(&self, mesh: &TriangleMesh) -> Result<DecimationOutcome> {
        let span = info_span!(
            "decimate",
            vertices = mesh.vertex_count(),
            triangles = mesh.face_count()
        );
        let _enter = span.enter();

        let outcome = DecimationEngine::from_mesh(mesh, self.config.clone())?.run();
        info!(
            "Decimated {} -> {} triangles, removed {} vertices in {} passes",
            outcome.stats.input_triangles,
            outcome.stats.output_triangles,
            outcome.stats.vertices_removed(),
            outcome.stats.passes.len()
        );
        Ok(outcome)
    }

    /// Decimate independent meshes in parallel, one sequential run per mesh
    pub fn decimate_batch(&self, meshes: &[TriangleMesh]) -> Vec<Result<DecimationOutcome>> {
        meshes.par_iter().map(|mesh| self.decimate(mesh)).collect()
    }
}

impl MeshSimplifier for PlanarDecimator {
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh> {
        Ok(self.decimate(mesh)?.mesh)
    }
}
