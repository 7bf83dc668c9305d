//! Combines baked meshes into shared vertex/index buffers.
//!
//! Each consumed mesh gets its SH payload from the cache file when one is
//! usable, otherwise it is computed and the cache rewritten. Its vertices
//! and rebased indices are then appended to the combined lump, which
//! [`MeshAssembler::finalize`] hands off to the uploader.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use super::cache::{read_cache, write_cache, CacheStatus};
use crate::config::{BakeConfig, FillType};
use crate::geom::{SourceMesh, TransparentVertex, VertexLayout};
use crate::transport::encode_mesh;
use crate::util::{Error, Result};

/// Where a consumed mesh lives inside the combined buffers.
///
/// Indices are already rebased, so draws use a vertex offset of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRange {
    pub first_index: u32,
    pub index_count: u32,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// How the SH payload of a consumed mesh was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShSource {
    /// Loaded from an existing cache file.
    CacheHit,
    /// Traced and projected; `cache_written` tells whether the file was refreshed.
    Computed { cache_written: bool },
}

/// Report of a single [`MeshAssembler::consume`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub range: MeshRange,
    pub source: ShSource,
}

/// Combined geometry of all consumed meshes.
#[derive(Debug, Clone, Default)]
pub struct GeometryLump {
    pub vertices: Vec<TransparentVertex>,
    pub indices: Vec<u32>,
}

impl GeometryLump {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Vertex buffer contents.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents (u32).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Receiver of the combined geometry, e.g. a GPU buffer uploader.
pub trait GeometryUpload {
    /// Take ownership of the lump.
    fn upload(&mut self, lump: GeometryLump, layout: &VertexLayout) -> Result<()>;
}

/// Accumulates baked meshes into one vertex/index lump.
#[derive(Debug, Default)]
pub struct MeshAssembler {
    config: BakeConfig,
    ranges: HashMap<String, MeshRange>,
    lump: GeometryLump,
    vertex_offset: u32,
}

impl MeshAssembler {
    pub fn new(config: BakeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    /// Attribute layout of the combined vertex buffer.
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::transparent()
    }

    /// Range recorded for `key`, if consumed.
    pub fn range(&self, key: &str) -> Option<MeshRange> {
        self.ranges.get(key).copied()
    }

    pub fn ranges(&self) -> &HashMap<String, MeshRange> {
        &self.ranges
    }

    /// Geometry accumulated since the last finalize.
    pub fn lump(&self) -> &GeometryLump {
        &self.lump
    }

    /// Bake (or load) the SH payload of `mesh` and append it to the lump.
    ///
    /// Nothing is appended if the mesh is malformed or the key was already
    /// consumed.
    #[tracing::instrument(skip_all, fields(key = %key, fill = %fill))]
    pub fn consume(
        &mut self,
        key: &str,
        mut mesh: SourceMesh,
        cache_path: impl AsRef<Path>,
        fill: FillType,
    ) -> Result<ConsumeOutcome> {
        let cache_path = cache_path.as_ref();
        if self.ranges.contains_key(key) {
            return Err(Error::DuplicateMesh(key.to_string()));
        }
        mesh.validate()?;

        let vertex_count = mesh.vertex_count();
        let source = match read_cache(cache_path, vertex_count) {
            CacheStatus::Loaded(blocks) => {
                tracing::info!("SH cache hit: {}", cache_path.display());
                for (vertex, block) in mesh.vertices.iter_mut().zip(blocks) {
                    vertex.sh = block;
                }
                ShSource::CacheHit
            }
            status => {
                if let CacheStatus::Invalid(reason) = &status {
                    tracing::warn!("Discarding SH cache {}: {reason}", cache_path.display());
                }
                let bounces = fill.bounce_count();
                tracing::info!(
                    "Computing SH for {key}: {vertex_count} vertices, {} triangles, {bounces} bounces",
                    mesh.triangle_count()
                );

                let start = Instant::now();
                encode_mesh(&mut mesh, bounces, &self.config);
                tracing::info!("SH for {key} done in {:.2?}", start.elapsed());

                let cache_written = match write_cache(cache_path, mesh.vertices.iter().map(|v| &v.sh)) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Failed to write SH cache {}: {e}", cache_path.display());
                        false
                    }
                };
                ShSource::Computed { cache_written }
            }
        };

        let range = self.append(mesh);
        self.ranges.insert(key.to_string(), range);
        tracing::debug!("{key}: {range:?}");

        Ok(ConsumeOutcome { range, source })
    }

    fn append(&mut self, mesh: SourceMesh) -> MeshRange {
        let range = MeshRange {
            first_index: self.lump.indices.len() as u32,
            index_count: mesh.indices.len() as u32,
            first_vertex: self.vertex_offset,
            vertex_count: mesh.vertices.len() as u32,
        };

        let base = self.vertex_offset;
        self.lump.vertices.extend(mesh.vertices);
        self.lump.indices.extend(mesh.indices.into_iter().map(|i| i + base));
        self.vertex_offset += range.vertex_count;
        range
    }

    /// Take the combined lump, leaving the assembler's buffers empty.
    ///
    /// Recorded ranges stay valid for drawing from the uploaded buffers.
    pub fn take_lump(&mut self) -> GeometryLump {
        std::mem::take(&mut self.lump)
    }

    /// Hand the combined lump to `uploader` and clear it.
    pub fn finalize(&mut self, uploader: &mut impl GeometryUpload) -> Result<()> {
        let layout = self.layout();
        let lump = self.take_lump();
        tracing::debug!(
            "Uploading {} vertices ({} bytes), {} indices",
            lump.vertices.len(),
            lump.vertex_bytes().len(),
            lump.indices.len()
        );
        uploader.upload(lump, &layout)
    }
}
