//! Transparent-mesh vertex record and its attribute layout.
//!
//! The record is shared byte-for-byte with the rendering front end:
//! position at float 0, normal at float 3, SH block at float 6.

use bytemuck::{Pod, Zeroable};

use crate::sh::{ShBlock, SH_CHANNELS, SH_TERMS};
use crate::util::{DVec3, Vec3};

/// Float offset of the position within a vertex.
pub const VERTEX_POSITION_START: usize = 0;
/// Float offset of the normal within a vertex.
pub const VERTEX_NORMAL_START: usize = 3;
/// Float offset of the SH block within a vertex.
pub const VERTEX_SH_START: usize = 6;
/// Floats per vertex: 6 + 25 * 4.
pub const VERTEX_FLOATS: usize = VERTEX_SH_START + SH_TERMS * SH_CHANNELS;

/// GPU-friendly transparent vertex (424 bytes).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct TransparentVertex {
    pub position: [f32; 3],
    /// Outward surface normal; the tracer negates it to step into the solid.
    pub normal: [f32; 3],
    pub sh: ShBlock,
}

impl TransparentVertex {
    /// New vertex with an all-zero SH block.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            sh: [[0.0; SH_CHANNELS]; SH_TERMS],
        }
    }

    #[inline]
    pub fn position_f64(&self) -> DVec3 {
        Vec3::from(self.position).as_dvec3()
    }

    /// Direction pointing into the solid.
    #[inline]
    pub fn inward_normal(&self) -> DVec3 {
        -Vec3::from(self.normal).as_dvec3()
    }
}

impl std::fmt::Debug for TransparentVertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransparentVertex")
            .field("position", &self.position)
            .field("normal", &self.normal)
            .field("sh_dc", &self.sh[0])
            .finish()
    }
}

/// Component format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float32x3,
    Float32x4,
}

impl AttributeFormat {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            AttributeFormat::Float32x3 => 12,
            AttributeFormat::Float32x4 => 16,
        }
    }
}

/// One attribute of the vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u32,
}

/// Vertex stream description handed to the rendering front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    /// Bytes per vertex.
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout of [`TransparentVertex`]: position, normal, then one
    /// `Float32x4` (width, x, y, z) per SH term.
    pub fn transparent() -> Self {
        const F32: u32 = std::mem::size_of::<f32>() as u32;

        let mut attributes = Vec::with_capacity(2 + SH_TERMS);
        attributes.push(VertexAttribute {
            location: 0,
            format: AttributeFormat::Float32x3,
            offset: VERTEX_POSITION_START as u32 * F32,
        });
        attributes.push(VertexAttribute {
            location: 1,
            format: AttributeFormat::Float32x3,
            offset: VERTEX_NORMAL_START as u32 * F32,
        });
        for term in 0..SH_TERMS as u32 {
            attributes.push(VertexAttribute {
                location: 2 + term,
                format: AttributeFormat::Float32x4,
                offset: (VERTEX_SH_START as u32 + term * SH_CHANNELS as u32) * F32,
            });
        }

        Self {
            stride: VERTEX_FLOATS as u32 * F32,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_record_matches_float_offsets() {
        assert_eq!(VERTEX_FLOATS, 106);
        assert_eq!(size_of::<TransparentVertex>(), VERTEX_FLOATS * 4);
        assert_eq!(offset_of!(TransparentVertex, position), VERTEX_POSITION_START * 4);
        assert_eq!(offset_of!(TransparentVertex, normal), VERTEX_NORMAL_START * 4);
        assert_eq!(offset_of!(TransparentVertex, sh), VERTEX_SH_START * 4);
    }

    #[test]
    fn test_layout_covers_stride() {
        let layout = VertexLayout::transparent();
        assert_eq!(layout.stride, 424);
        assert_eq!(layout.attributes.len(), 27);
        let last = layout.attributes.last().unwrap();
        assert_eq!(last.offset + last.format.size(), layout.stride);
        for pair in layout.attributes.windows(2) {
            assert_eq!(pair[0].offset + pair[0].format.size(), pair[1].offset);
            assert_eq!(pair[0].location + 1, pair[1].location);
        }
    }

    #[test]
    fn test_inward_normal_is_negated() {
        let v = TransparentVertex::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(v.inward_normal(), -DVec3::Z);
    }
}
