//! Hammersley hemisphere sampling.
//!
//! Directions are uniform in solid angle over a polar cap whose extent is
//! set by [`COS_THRESHOLD`]. The full set for a given count is built once
//! and shared read-only across every vertex of every mesh.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::util::{DVec2, DVec3, COS_THRESHOLD};

/// Immutable, shareable set of sample directions.
pub type SampleSet = Arc<[DVec3]>;

/// Van der Corput radical inverse in base 2, in `[0, 1)`.
#[inline]
pub fn radical_inverse(i: u32) -> f64 {
    // reverse_bits(i) / 2^32
    f64::from(i.reverse_bits()) * 2.328_306_436_538_696_3e-10
}

/// The `i`-th point of an `n`-point Hammersley set.
#[inline]
pub fn hammersley_point(i: u32, n: u32) -> DVec2 {
    DVec2::new(f64::from(i) / f64::from(n), radical_inverse(i))
}

/// Map a unit-square point onto the sampling cap around +Z.
#[inline]
pub fn sample_cone(h: DVec2) -> DVec3 {
    let phi = h.y * std::f64::consts::TAU;
    let cos_theta = 1.0 - h.x * COS_THRESHOLD;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    DVec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
}

/// Build `count` hemisphere directions. Pure function of `count`.
pub fn generate_hemisphere_samples(count: u32) -> Vec<DVec3> {
    (0..count)
        .map(|i| sample_cone(hammersley_point(i, count)))
        .collect()
}

fn sample_cache() -> &'static RwLock<HashMap<u32, SampleSet>> {
    static CACHE: OnceLock<RwLock<HashMap<u32, SampleSet>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide shared sample set for `count` directions.
///
/// The first caller for a given count generates the set; later callers get
/// the same `Arc`.
pub fn hemisphere_samples(count: u32) -> SampleSet {
    if let Some(set) = sample_cache().read().get(&count) {
        return Arc::clone(set);
    }

    let mut cache = sample_cache().write();
    let set = cache
        .entry(count)
        .or_insert_with(|| generate_hemisphere_samples(count).into());
    Arc::clone(set)
}
