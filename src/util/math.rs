//! Math type re-exports and the fixed geometric constants of the bake.
//!
//! All transport math runs in double precision; only the final SH
//! coefficients are narrowed to `f32`.

// Re-export glam types
pub use glam::{
    // Single precision
    Vec3, Mat4,
    // Double precision
    DVec2, DVec3, DMat3,
};

use std::f64::consts::PI;

/// Half angle of the polar cone the hemisphere samples are restricted to.
pub const CONE_HALF_ANGLE: f64 = PI / 12.0;

/// `cos(pi/2 - CONE_HALF_ANGLE)`, i.e. `sin(pi/12) = (sqrt(6) - sqrt(2)) / 4`.
pub const COS_THRESHOLD: f64 = 0.258_819_045_102_520_74;

/// Solid angle of the integration domain used by the SH estimator.
pub const INTEGRATION_AREA: f64 = 2.0 * PI * COS_THRESHOLD;

/// Global up axis used to build per-vertex tangent frames.
pub const UP: DVec3 = DVec3::Y;

/// Reference axis used when the normal is parallel to [`UP`].
pub const FALLBACK_AXIS: DVec3 = DVec3::X;

/// Parallel-ray and self-intersection threshold for ray/triangle tests.
pub const RAY_EPSILON: f64 = 1.0e-6;

/// Squared length below which a refracted vector counts as total internal reflection.
pub const REFRACT_EPSILON: f64 = f32::EPSILON as f64;

/// Refract incident direction `i` through a surface with normal `n`.
///
/// `n` must face against `i` and `eta` is the ratio of indices
/// (incident over transmitted). Returns the zero vector past the
/// critical angle.
#[inline]
pub fn refract(i: DVec3, n: DVec3, eta: f64) -> DVec3 {
    let cos_i = n.dot(i);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        DVec3::ZERO
    } else {
        eta * i - (eta * cos_i + k.sqrt()) * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cos_threshold_matches_cone() {
        let expected = (PI / 2.0 - CONE_HALF_ANGLE).cos();
        assert!((COS_THRESHOLD - expected).abs() < 1e-15);
    }

    #[test]
    fn test_refract_normal_incidence_passes_straight() {
        let i = DVec3::new(0.0, 0.0, -1.0);
        let t = refract(i, DVec3::Z, 1.0 / 1.45);
        assert!((t - i).length() < 1e-12);
    }

    #[test]
    fn test_refract_snell() {
        // 30 degrees from air into glass
        let theta = 30f64.to_radians();
        let i = DVec3::new(theta.sin(), 0.0, -theta.cos());
        let eta = 1.0 / 1.45;
        let t = refract(i, DVec3::Z, eta).normalize();
        let sin_t = t.x;
        assert!((sin_t - theta.sin() * eta).abs() < 1e-12);
        assert!(t.z < 0.0);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // 60 degrees from glass into air exceeds the critical angle (~43.6 deg)
        let theta = 60f64.to_radians();
        let i = DVec3::new(theta.sin(), 0.0, -theta.cos());
        let t = refract(i, DVec3::Z, 1.45);
        assert_eq!(t, DVec3::ZERO);
    }
}
