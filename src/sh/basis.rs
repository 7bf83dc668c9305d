//! Real spherical harmonics up to band 4.
//!
//! Each basis function is stored as its bare polynomial in the direction
//! components; the squared normalization constant is applied once, at
//! projection time. Reconstruction therefore only needs the polynomials.
//!
//! The table order is load-bearing: the cache file and the vertex layout
//! both store coefficients in exactly this order.

use std::f64::consts::PI;

use crate::util::{DVec3, INTEGRATION_AREA};

/// Number of SH terms (bands 0..=4).
pub const SH_TERMS: usize = 25;

/// Values encoded per term: width, exit x, exit y, exit z.
pub const SH_CHANNELS: usize = 4;

/// Floats per vertex SH block.
pub const SH_FLOATS: usize = SH_TERMS * SH_CHANNELS;

/// Per-vertex SH payload, term-major: `block[term][channel]`.
pub type ShBlock = [[f32; SH_CHANNELS]; SH_TERMS];

/// One entry of the basis table.
#[derive(Clone, Copy)]
pub struct ShTerm {
    /// Band `l`.
    pub band: u8,
    /// Order `m` in `-l..=l`.
    pub order: i8,
    /// Polynomial part of `Y_l^m`.
    pub eval: fn(DVec3) -> f64,
    /// Squared normalization constant `K_l^m^2`.
    pub norm_sq: f64,
}

impl std::fmt::Debug for ShTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Y({}, {})", self.band, self.order)
    }
}

/// Value a single sampled direction contributes to the projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSample {
    /// Path length through the solid.
    pub width: f64,
    /// Direction the ray leaves the solid with.
    pub direction: DVec3,
}

impl TransportSample {
    /// No transmission: zero width, zero direction.
    pub const NONE: Self = Self { width: 0.0, direction: DVec3::ZERO };

    /// Channel values in block order.
    #[inline]
    pub fn channels(&self) -> [f64; SH_CHANNELS] {
        [self.width, self.direction.x, self.direction.y, self.direction.z]
    }
}

#[inline]
fn pow3(x: f64) -> f64 {
    x * x * x
}

#[inline]
fn pow4(x: f64) -> f64 {
    let y = x * x;
    y * y
}

macro_rules! term {
    ($band:expr, $order:expr, $norm_sq:expr, |$x:ident, $y:ident, $z:ident| $body:expr) => {
        ShTerm {
            band: $band,
            order: $order,
            eval: {
                #[allow(unused_variables)]
                fn eval(d: DVec3) -> f64 {
                    let ($x, $y, $z) = (d.x, d.y, d.z);
                    $body
                }
                eval
            },
            norm_sq: $norm_sq,
        }
    };
}

/// The basis table, band 0 first, `m` ascending within each band.
pub static SH_BASIS: [ShTerm; SH_TERMS] = [
    term!(0, 0, 1.0 / (4.0 * PI), |x, y, z| 1.0),

    term!(1, -1, 3.0 / (4.0 * PI), |x, y, z| y),
    term!(1, 0, 3.0 / (4.0 * PI), |x, y, z| z),
    term!(1, 1, 3.0 / (4.0 * PI), |x, y, z| x),

    term!(2, -2, 15.0 / (4.0 * PI), |x, y, z| x * y),
    term!(2, -1, 15.0 / (4.0 * PI), |x, y, z| y * z),
    term!(2, 0, 5.0 / (16.0 * PI), |x, y, z| 3.0 * z * z - 1.0),
    term!(2, 1, 15.0 / (4.0 * PI), |x, y, z| x * z),
    term!(2, 2, 15.0 / (16.0 * PI), |x, y, z| x * x - y * y),

    term!(3, -3, 35.0 / (32.0 * PI), |x, y, z| y * (3.0 * x * x - y * y)),
    term!(3, -2, 105.0 / (4.0 * PI), |x, y, z| x * y * z),
    term!(3, -1, 21.0 / (32.0 * PI), |x, y, z| y * (5.0 * z * z - 1.0)),
    term!(3, 0, 7.0 / (16.0 * PI), |x, y, z| 5.0 * pow3(z) - 3.0 * z),
    term!(3, 1, 21.0 / (32.0 * PI), |x, y, z| x * (5.0 * z * z - 1.0)),
    term!(3, 2, 105.0 / (16.0 * PI), |x, y, z| (x * x - y * y) * z),
    term!(3, 3, 35.0 / (32.0 * PI), |x, y, z| x * (x * x - 3.0 * y * y)),

    term!(4, -4, 315.0 / (16.0 * PI), |x, y, z| x * y * (x * x - y * y)),
    term!(4, -3, 315.0 / (32.0 * PI), |x, y, z| y * (3.0 * x * x - y * y) * z),
    term!(4, -2, 45.0 / (16.0 * PI), |x, y, z| x * y * (7.0 * z * z - 1.0)),
    term!(4, -1, 45.0 / (32.0 * PI), |x, y, z| y * (7.0 * pow3(z) - 3.0 * z)),
    term!(4, 0, 9.0 / (256.0 * PI), |x, y, z| 35.0 * pow4(z) - 30.0 * z * z + 3.0),
    term!(4, 1, 45.0 / (32.0 * PI), |x, y, z| x * (7.0 * pow3(z) - 3.0 * z)),
    term!(4, 2, 45.0 / (64.0 * PI), |x, y, z| (x * x - y * y) * (7.0 * z * z - 1.0)),
    term!(4, 3, 315.0 / (32.0 * PI), |x, y, z| x * z * (x * x - 3.0 * y * y)),
    term!(4, 4, 315.0 / (256.0 * PI), |x, y, z| x * x * (x * x - 3.0 * y * y) - y * y * (3.0 * x * x - y * y)),
];

/// Monte-Carlo projection of a per-direction transport function onto the basis.
///
/// Accumulates in `f64`; each coefficient is scaled by
/// `INTEGRATION_AREA / samples.len()` and the term's squared normalization,
/// then narrowed to `f32`.
pub fn project<F>(samples: &[DVec3], mut data_fn: F) -> ShBlock
where
    F: FnMut(DVec3) -> TransportSample,
{
    let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
    if samples.is_empty() {
        return block;
    }

    let mut sums = [[0.0f64; SH_CHANNELS]; SH_TERMS];
    for &dir in samples {
        let channels = data_fn(dir).channels();
        for (term, sum) in SH_BASIS.iter().zip(sums.iter_mut()) {
            let basis = (term.eval)(dir);
            for (acc, value) in sum.iter_mut().zip(channels) {
                *acc += basis * value;
            }
        }
    }

    let scale = INTEGRATION_AREA / samples.len() as f64;
    for ((term, sum), out) in SH_BASIS.iter().zip(&sums).zip(block.iter_mut()) {
        for (dst, acc) in out.iter_mut().zip(sum) {
            *dst = (acc * scale * term.norm_sq) as f32;
        }
    }
    block
}

/// Reconstruct the four channels at `dir` from a projected block.
pub fn evaluate(block: &ShBlock, dir: DVec3) -> [f64; SH_CHANNELS] {
    let mut out = [0.0; SH_CHANNELS];
    for (term, coeffs) in SH_BASIS.iter().zip(block) {
        let basis = (term.eval)(dir);
        for (dst, &c) in out.iter_mut().zip(coeffs) {
            *dst += f64::from(c) * basis;
        }
    }
    out
}

/// Flatten a block into its 100 floats in storage order.
#[inline]
pub fn flatten(block: &ShBlock) -> &[f32; SH_FLOATS] {
    bytemuck::cast_ref(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sh::generate_hemisphere_samples;

    #[test]
    fn test_table_order() {
        let mut expected = Vec::new();
        for l in 0..=4i8 {
            for m in -l..=l {
                expected.push((l as u8, m));
            }
        }
        let actual: Vec<_> = SH_BASIS.iter().map(|t| (t.band, t.order)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_constant_term() {
        let d = DVec3::new(0.3, -0.4, 0.866).normalize();
        assert_eq!((SH_BASIS[0].eval)(d), 1.0);
        assert!((SH_BASIS[0].norm_sq - 1.0 / (4.0 * PI)).abs() < 1e-15);
    }

    #[test]
    fn test_linear_terms_follow_components() {
        let d = DVec3::new(0.2, 0.3, 0.9).normalize();
        assert_eq!((SH_BASIS[1].eval)(d), d.y);
        assert_eq!((SH_BASIS[2].eval)(d), d.z);
        assert_eq!((SH_BASIS[3].eval)(d), d.x);
    }

    #[test]
    fn test_higher_terms_read_all_components() {
        let d = DVec3::new(0.48, 0.6, 0.64);
        let (x, y, z) = (d.x, d.y, d.z);
        let eval = |i: usize| (SH_BASIS[i].eval)(d);

        assert_eq!(eval(6), 3.0 * z * z - 1.0);
        assert_eq!(eval(10), x * y * z);
        assert_eq!(eval(15), x * (x * x - 3.0 * y * y));
        assert_eq!(eval(20), 35.0 * pow4(z) - 30.0 * z * z + 3.0);
        assert_eq!(eval(24), x * x * (x * x - 3.0 * y * y) - y * y * (3.0 * x * x - y * y));

        // Zonal terms at the pole.
        assert_eq!((SH_BASIS[6].eval)(DVec3::Z), 2.0);
        assert_eq!((SH_BASIS[12].eval)(DVec3::Z), 2.0);
        assert_eq!((SH_BASIS[20].eval)(DVec3::Z), 8.0);
        // Sectoral band-4 term along +X.
        assert_eq!((SH_BASIS[24].eval)(DVec3::X), 1.0);
    }

    #[test]
    fn test_project_constant_width() {
        // A constant width w integrates to w * area / (4 pi) in the DC term.
        let samples = generate_hemisphere_samples(256);
        let block = project(&samples, |_| TransportSample { width: 2.0, direction: DVec3::ZERO });
        let expected = 2.0 * INTEGRATION_AREA / (4.0 * PI);
        assert!((f64::from(block[0][0]) - expected).abs() < 1e-6);
        for term in &block {
            assert_eq!(&term[1..], &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_channel_order() {
        let samples = generate_hemisphere_samples(64);
        let block = project(&samples, |_| TransportSample {
            width: 1.0,
            direction: DVec3::new(2.0, 3.0, 4.0),
        });
        let dc = block[0];
        assert!((dc[1] / dc[0] - 2.0).abs() < 1e-5);
        assert!((dc[2] / dc[0] - 3.0).abs() < 1e-5);
        assert!((dc[3] / dc[0] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_samples() {
        let block = project(&[], |_| TransportSample { width: 1.0, direction: DVec3::X });
        assert!(block.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_evaluate_dc_only() {
        let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
        block[0] = [1.5, 0.0, 0.25, -1.0];
        let out = evaluate(&block, DVec3::Z);
        assert_eq!(out, [1.5, 0.0, 0.25, -1.0]);
    }

    #[test]
    fn test_flatten_is_term_major() {
        let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
        block[2][3] = 7.0;
        assert_eq!(flatten(&block)[2 * SH_CHANNELS + 3], 7.0);
    }
}
