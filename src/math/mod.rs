//! Numerical kernels: moment statistics and goodness-of-fit distances.

pub mod ks;
pub mod moments;

pub use ks::*;
pub use moments::*;
