//! Distribution fitting and selection.
//!
//! Responsibilities:
//!
//! - fit each model family to one dimension (moment estimates + KS score)
//! - select the best candidate, penalizing the empirical fallback
//! - classify fitted models as statistically equivalent for reporting

pub mod equivalence;
pub mod fitter;
pub mod selection;

pub use equivalence::*;
pub use fitter::*;
pub use selection::*;
