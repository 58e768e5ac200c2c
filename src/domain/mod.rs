//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the samples × dimensions input (`Dataset`)
//! - per-dimension statistics (`DimensionStatistics`)
//! - fit outputs (`FitResult`, `AllFitsData`, `ExtractionResult`)

pub mod dataset;
pub mod types;

pub use dataset::*;
pub use types::*;
