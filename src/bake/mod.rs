//! Cache-backed baking of mesh SH payloads and buffer assembly.
//!
//! - [`cache`] - `.sph` side-car file format
//! - [`MeshAssembler`] - consume meshes, merge buffers, hand off for upload

pub mod cache;
mod assembler;

pub use assembler::*;
pub use cache::{cache_path_for, CacheStatus};
