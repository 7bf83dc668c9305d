//! Per-vertex SH encoding of refraction transport.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::trace::{LocalFrame, RefractionTracer, TraceMesh};
use crate::config::BakeConfig;
use crate::geom::{SourceMesh, TransparentVertex};
use crate::sh::{hemisphere_samples, project, ShBlock};
use crate::util::DVec3;

/// Encodes one vertex at a time against a fixed mesh and sample set.
///
/// Holds only shared references, so one encoder serves every worker thread.
#[derive(Debug, Clone, Copy)]
pub struct VertexEncoder<'a> {
    tracer: RefractionTracer<'a>,
    samples: &'a [DVec3],
    bounces: u32,
}

impl<'a> VertexEncoder<'a> {
    pub fn new(tracer: RefractionTracer<'a>, samples: &'a [DVec3], bounces: u32) -> Self {
        Self { tracer, samples, bounces }
    }

    /// Project the vertex's width/exit-direction function onto the SH basis.
    pub fn encode(&self, vertex: &TransparentVertex) -> ShBlock {
        let origin = vertex.position_f64();
        let frame = LocalFrame::from_normal(vertex.inward_normal());
        project(self.samples, |dir| {
            self.tracer
                .trace_world(origin, frame.to_world(dir), self.bounces)
                .into()
        })
    }
}

/// Fill the SH block of every vertex of `mesh`, in parallel.
///
/// Workers read the shared triangle set and sample set and each writes only
/// its own vertex. Returns once every vertex is written.
#[tracing::instrument(skip_all, fields(vertices = mesh.vertex_count(), triangles = mesh.triangle_count(), bounces = bounces))]
pub fn encode_mesh(mesh: &mut SourceMesh, bounces: u32, config: &BakeConfig) {
    let trace_mesh = TraceMesh::from_mesh(mesh);
    let samples = hemisphere_samples(config.sample_count);
    let tracer = RefractionTracer::new(&trace_mesh, config.ior);
    let encoder = VertexEncoder::new(tracer, &samples, bounces);

    let total = mesh.vertices.len();
    let interval = config.progress_interval;
    let done = AtomicUsize::new(0);

    mesh.vertices.par_iter_mut().for_each(|vertex| {
        vertex.sh = encoder.encode(vertex);

        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if interval > 0 && finished % interval == 0 {
            tracing::info!("Vertex: {finished}/{total}");
        }
    });
}
