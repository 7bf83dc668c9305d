//! Procedural closed meshes with outward normals.

use std::f32::consts::{PI, TAU};

use super::builder::{Corner, MeshBuilder, SourceMesh};
use crate::util::{Result, Vec3};

/// Built-in mesh kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Sphere,
    Cube,
}

impl Primitive {
    /// Build the primitive with the given radius (half extent for the cube).
    pub fn build(self, radius: f32) -> Result<SourceMesh> {
        match self {
            Primitive::Sphere => uv_sphere(Vec3::ZERO, radius, 16, 32),
            Primitive::Cube => cube(Vec3::ZERO, radius),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Sphere => "sphere",
            Primitive::Cube => "cube",
        }
    }
}

impl std::str::FromStr for Primitive {
    type Err = crate::util::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sphere" => Ok(Primitive::Sphere),
            "cube" => Ok(Primitive::Cube),
            other => Err(crate::util::Error::other(format!("unknown primitive: {other}"))),
        }
    }
}

/// Latitude/longitude sphere with smooth normals.
///
/// `stacks` counts latitude bands (>= 2), `slices` longitude segments (>= 3).
pub fn uv_sphere(center: Vec3, radius: f32, stacks: u32, slices: u32) -> Result<SourceMesh> {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut b = MeshBuilder::new();

    let mut add = |dir: Vec3| -> u32 {
        let p = b.add_position(center + dir * radius);
        b.add_normal(dir);
        p
    };

    let top = add(Vec3::Y);
    let mut rings = Vec::with_capacity((stacks - 1) as usize);
    for i in 1..stacks {
        let theta = PI * i as f32 / stacks as f32;
        let ring: Vec<u32> = (0..slices)
            .map(|j| {
                let phi = TAU * j as f32 / slices as f32;
                add(Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()))
            })
            .collect();
        rings.push(ring);
    }
    let bottom = add(-Vec3::Y);

    // Positions and normals share indices.
    let c = |i: u32| Corner::new(i, i);
    let n = slices as usize;

    let first = &rings[0];
    for j in 0..n {
        b.add_face(&[c(top), c(first[(j + 1) % n]), c(first[j])])?;
    }
    for pair in rings.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for j in 0..n {
            let k = (j + 1) % n;
            b.add_face(&[c(upper[j]), c(upper[k]), c(lower[k]), c(lower[j])])?;
        }
    }
    let last = &rings[rings.len() - 1];
    for j in 0..n {
        b.add_face(&[c(bottom), c(last[j]), c(last[(j + 1) % n])])?;
    }

    Ok(b.build())
}

/// Axis-aligned cube with flat per-face normals (24 vertices).
pub fn cube(center: Vec3, half_extent: f32) -> Result<SourceMesh> {
    let mut b = MeshBuilder::new();
    for i in 0..8u32 {
        let sign = |bit: u32| if i & bit != 0 { 1.0 } else { -1.0 };
        b.add_position(center + Vec3::new(sign(1), sign(2), sign(4)) * half_extent);
    }

    // (normal, four corner position indices, 1-based)
    let faces: [(Vec3, [u32; 4]); 6] = [
        (Vec3::X, [2, 4, 8, 6]),
        (-Vec3::X, [1, 5, 7, 3]),
        (Vec3::Y, [3, 7, 8, 4]),
        (-Vec3::Y, [1, 2, 6, 5]),
        (Vec3::Z, [5, 6, 8, 7]),
        (-Vec3::Z, [1, 3, 4, 2]),
    ];
    for (normal, quad) in faces {
        let ni = b.add_normal(normal);
        let corners = quad.map(|p| Corner::new(p, ni));
        b.add_face(&corners)?;
    }

    Ok(b.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let mesh = cube(Vec3::ZERO, 1.0).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_cube_face_normals_point_outward() {
        let mesh = cube(Vec3::ZERO, 1.0).unwrap();
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!(p.dot(n) > 0.0);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(Vec3::ZERO, 2.0, 8, 12).unwrap();
        assert_eq!(mesh.vertex_count(), 2 + 7 * 12);
        assert_eq!(mesh.triangle_count(), 2 * 12 + 6 * 12 * 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_sphere_on_radius() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let mesh = uv_sphere(center, 3.0, 6, 9).unwrap();
        for v in &mesh.vertices {
            let d = Vec3::from(v.position) - center;
            assert!((d.length() - 3.0).abs() < 1e-5);
            assert!((Vec3::from(v.normal) - d / 3.0).length() < 1e-5);
        }
    }
}
