//! Indexed mesh construction from position/normal tables and polygon faces.
//!
//! Corners reference the tables with 1-based indices. Polygons are
//! fan-triangulated and identical `(position, normal)` corners collapse
//! into one shared vertex.

use std::collections::HashMap;

use super::vertex::TransparentVertex;
use crate::util::{Error, Mat4, Result, Vec3};

/// One polygon corner: 1-based position and normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corner {
    pub position: u32,
    pub normal: u32,
}

impl Corner {
    pub const fn new(position: u32, normal: u32) -> Self {
        Self { position, normal }
    }
}

/// Triangle mesh ready for the SH bake.
#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    pub vertices: Vec<TransparentVertex>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl SourceMesh {
    /// Wrap raw buffers, checking the index buffer against the vertex count.
    pub fn new(vertices: Vec<TransparentVertex>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: SourceMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Check index buffer shape and range.
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::invalid(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let count = self.vertices.len();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::IndexOutOfRange { index: bad as usize, count });
        }
        Ok(())
    }
}

/// Incremental builder mirroring what a line-oriented mesh reader produces.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    transform: Option<Mat4>,
    corner_map: HashMap<Corner, u32>,
    mesh: SourceMesh,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `transform` to positions (w=1) and normals (w=0) as they are added.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Add a position; returns its 1-based index.
    pub fn add_position(&mut self, p: Vec3) -> u32 {
        let p = match self.transform {
            Some(m) => m.transform_point3(p),
            None => p,
        };
        self.positions.push(p);
        self.positions.len() as u32
    }

    /// Add a normal; returns its 1-based index.
    pub fn add_normal(&mut self, n: Vec3) -> u32 {
        let n = match self.transform {
            Some(m) => m.transform_vector3(n),
            None => n,
        };
        self.normals.push(n);
        self.normals.len() as u32
    }

    /// Add a polygon with three or more corners, fan-triangulated around the first.
    pub fn add_face(&mut self, corners: &[Corner]) -> Result<()> {
        if corners.len() < 3 {
            return Err(Error::invalid(format!(
                "face needs at least 3 corners, got {}",
                corners.len()
            )));
        }

        // Resolve every corner before touching the index buffer so a bad
        // face leaves the mesh unchanged.
        let mut resolved = Vec::with_capacity(corners.len());
        for &corner in corners {
            resolved.push(self.resolve_corner(corner)?);
        }

        for i in 1..resolved.len() - 1 {
            self.mesh.indices.extend_from_slice(&[resolved[0], resolved[i], resolved[i + 1]]);
        }
        Ok(())
    }

    fn resolve_corner(&mut self, corner: Corner) -> Result<u32> {
        if let Some(&index) = self.corner_map.get(&corner) {
            return Ok(index);
        }

        let position = lookup(&self.positions, corner.position, "position")?;
        let normal = lookup(&self.normals, corner.normal, "normal")?;

        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(TransparentVertex::new(position, normal));
        self.corner_map.insert(corner, index);
        Ok(index)
    }

    /// Number of unique vertices so far.
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    pub fn build(self) -> SourceMesh {
        self.mesh
    }
}

fn lookup(table: &[Vec3], one_based: u32, what: &str) -> Result<Vec3> {
    if one_based == 0 {
        return Err(Error::invalid(format!("{what} index 0 (indices are 1-based)")));
    }
    table
        .get(one_based as usize - 1)
        .copied()
        .ok_or(Error::IndexOutOfRange { index: one_based as usize, count: table.len() })
}
