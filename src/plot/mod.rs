//! Text renderings of per-dimension shape.

pub mod sparkline;

pub use sparkline::*;
