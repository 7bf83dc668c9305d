//! Spherical-harmonics machinery: hemisphere sampling and the projection basis.

mod basis;
mod hammersley;

pub use basis::*;
pub use hammersley::*;
