//! # refract-sh
//!
//! Offline precomputation of per-vertex refraction transport for
//! transparent meshes.
//!
//! For every vertex, a cone of Hammersley directions is traced into the
//! solid, refracting at each wall it reaches. The resulting path width and
//! exit direction are projected onto 25 real spherical harmonics
//! (bands 0..=4), giving a 100-float block per vertex that a shader can
//! evaluate cheaply. Blocks are memoized in `.sph` side-car files.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports and fixed constants
//! - [`config`] - Bake configuration and fill types
//! - [`sh`] - Hemisphere sampling, SH basis, projection
//! - [`geom`] - Vertex record, mesh construction, ray/triangle test
//! - [`transport`] - Refraction tracer and per-vertex encoder
//! - [`bake`] - SH cache files and buffer assembly
//!
//! ## Example
//!
//! ```ignore
//! use refract_sh::prelude::*;
//!
//! let mut assembler = MeshAssembler::new(BakeConfig::default());
//! let sphere = Primitive::Sphere.build(1.0)?;
//! assembler.consume("sphere", sphere, "sphere.sph", FillType::Hollow)?;
//! let lump = assembler.take_lump();
//! ```

pub mod util;
pub mod config;
pub mod sh;
pub mod geom;
pub mod transport;
pub mod bake;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::config::{BakeConfig, FillType};
    pub use crate::sh::{ShBlock, SH_FLOATS, SH_TERMS, SH_CHANNELS};
    pub use crate::geom::{Corner, MeshBuilder, Primitive, SourceMesh, TransparentVertex, VertexLayout};
    pub use crate::transport::{encode_mesh, RefractionTracer, TraceMesh, VertexEncoder};
    pub use crate::bake::{GeometryLump, GeometryUpload, MeshAssembler, MeshRange, ShSource};
}
