//! Ray/triangle intersection (Möller–Trumbore).

use crate::util::{DVec3, RAY_EPSILON};

/// A ray hit on a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Signed distance along the (unnormalized) ray direction.
    pub t: f64,
    /// Barycentric weight of `v1`.
    pub u: f64,
    /// Barycentric weight of `v2`.
    pub v: f64,
}

/// Intersect the ray `origin + t * dir` with triangle `(v0, v1, v2)`.
///
/// Two-sided. Returns `None` for rays parallel to the triangle plane,
/// hits outside the triangle, and hits with `t <= RAY_EPSILON` (behind or
/// at the origin).
#[inline]
pub fn intersect_triangle(origin: DVec3, dir: DVec3, v0: DVec3, v1: DVec3, v2: DVec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if t > RAY_EPSILON {
        Some(TriangleHit { t, u, v })
    } else {
        None
    }
}
