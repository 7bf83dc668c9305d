//! Mesh geometry: vertex records, mesh construction and ray intersection.

mod builder;
mod intersect;
mod vertex;
pub mod primitives;

pub use builder::*;
pub use intersect::*;
pub use vertex::*;
pub use primitives::Primitive;
