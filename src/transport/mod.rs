//! Light transport through the transparent solid and its SH encoding.

mod encode;
mod trace;

pub use encode::*;
pub use trace::*;
