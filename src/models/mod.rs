//! Scalar distribution models produced by the fitters.
//!
//! Models are plain immutable values so that fitting, selection and
//! equivalence code can stay generic over the family.

pub mod model;

pub use model::*;
