//! Refraction path tracing through a closed transparent mesh.
//!
//! A ray starts at a surface vertex heading into the solid and is refracted
//! at each wall it reaches. Odd bounces leave the material (eta = IOR),
//! even bounces re-enter it (eta = 1/IOR). Stored normals point out of the
//! material.

use crate::geom::{intersect_triangle, SourceMesh, TransparentVertex, TriangleHit};
use crate::util::{refract, DMat3, DVec3, Vec3, FALLBACK_AXIS, REFRACT_EPSILON, UP};
use crate::sh::TransportSample;

/// Triangle prepared for tracing: corner positions and averaged corner normal.
#[derive(Debug, Clone, Copy)]
pub struct TraceTriangle {
    pub corners: [DVec3; 3],
    /// Normalized mean of the three corner normals.
    pub normal: DVec3,
}

impl TraceTriangle {
    #[inline]
    pub fn intersect(&self, origin: DVec3, dir: DVec3) -> Option<TriangleHit> {
        let [v0, v1, v2] = self.corners;
        intersect_triangle(origin, dir, v0, v1, v2)
    }
}

/// Read-only triangle soup in double precision, shared by all tracing workers.
#[derive(Debug, Clone, Default)]
pub struct TraceMesh {
    triangles: Vec<TraceTriangle>,
}

impl TraceMesh {
    /// Build from an indexed vertex buffer. Indices must be in range.
    pub fn from_indexed(vertices: &[TransparentVertex], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| {
                let v = [
                    &vertices[tri[0] as usize],
                    &vertices[tri[1] as usize],
                    &vertices[tri[2] as usize],
                ];
                let normal_sum: Vec3 = v.iter().map(|v| Vec3::from(v.normal)).sum();
                TraceTriangle {
                    corners: v.map(|v| v.position_f64()),
                    normal: (normal_sum.as_dvec3() / 3.0).normalize_or_zero(),
                }
            })
            .collect();
        Self { triangles }
    }

    pub fn from_mesh(mesh: &SourceMesh) -> Self {
        Self::from_indexed(&mesh.vertices, &mesh.indices)
    }

    #[inline]
    pub fn triangles(&self) -> &[TraceTriangle] {
        &self.triangles
    }

    /// Closest hit over every triangle. Ties keep the earlier triangle.
    pub fn closest_hit(&self, origin: DVec3, dir: DVec3) -> Option<(TriangleHit, &TraceTriangle)> {
        let mut best: Option<(TriangleHit, &TraceTriangle)> = None;
        for tri in &self.triangles {
            if let Some(hit) = tri.intersect(origin, dir) {
                if best.map_or(true, |(b, _)| hit.t < b.t) {
                    best = Some((hit, tri));
                }
            }
        }
        best
    }
}

/// Orthonormal frame whose local +Z is the inward vertex normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame(pub DMat3);

impl LocalFrame {
    pub fn from_normal(normal: DVec3) -> Self {
        let z = normal.try_normalize().unwrap_or(DVec3::Z);
        let x = if 1.0 - UP.dot(z).abs() < 1e-12 {
            FALLBACK_AXIS
        } else {
            UP.cross(z).normalize()
        };
        let y = z.cross(x).normalize();
        Self(DMat3::from_cols(x, y, z))
    }

    /// Rotate a local-frame direction into object space.
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.0 * local
    }
}

/// Outcome of tracing one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    /// Shortest hit distance over all bounces; 0 when nothing was hit.
    pub width: f64,
    /// Direction after the last refraction; zero after total internal
    /// reflection or when nothing was hit.
    pub exit_direction: DVec3,
    /// Number of walls reached.
    pub hits: u32,
}

impl TraceResult {
    /// Nothing traced or nothing hit.
    pub const NONE: Self = Self { width: 0.0, exit_direction: DVec3::ZERO, hits: 0 };
}

impl From<TraceResult> for TransportSample {
    fn from(r: TraceResult) -> Self {
        TransportSample { width: r.width, direction: r.exit_direction }
    }
}

/// Refraction tracer over one mesh.
#[derive(Debug, Clone, Copy)]
pub struct RefractionTracer<'a> {
    mesh: &'a TraceMesh,
    ior: f64,
}

impl<'a> RefractionTracer<'a> {
    pub fn new(mesh: &'a TraceMesh, ior: f64) -> Self {
        Self { mesh, ior }
    }

    /// Trace `local_dir` (in the frame of `inward_normal`) from `position`.
    pub fn trace(&self, position: DVec3, inward_normal: DVec3, local_dir: DVec3, bounces: u32) -> TraceResult {
        if bounces == 0 {
            return TraceResult::NONE;
        }
        let frame = LocalFrame::from_normal(inward_normal);
        self.trace_world(position, frame.to_world(local_dir), bounces)
    }

    /// Trace an object-space direction from `position`.
    pub fn trace_world(&self, position: DVec3, dir: DVec3, bounces: u32) -> TraceResult {
        let mut origin = position;
        let mut dir = dir;
        let mut width = f64::INFINITY;
        let mut hits = 0;

        for bounce in 1..=bounces {
            let Some((hit, tri)) = self.mesh.closest_hit(origin, dir) else {
                break;
            };
            hits += 1;
            width = width.min(hit.t);

            let (eta, normal) = if bounce % 2 == 1 {
                (self.ior, -tri.normal)
            } else {
                (1.0 / self.ior, tri.normal)
            };

            let refracted = refract(dir, normal, eta);
            if refracted.length_squared() <= REFRACT_EPSILON {
                dir = DVec3::ZERO;
                break;
            }
            dir = refracted.normalize();
            // Next segment starts one hit distance along the refracted
            // direction from the current origin.
            origin += dir * hit.t;
        }

        if hits == 0 {
            return TraceResult::NONE;
        }
        TraceResult { width, exit_direction: dir, hits }
    }
}
