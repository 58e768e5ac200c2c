//! `vshapes` library crate.
//!
//! Per-dimension distribution extraction for large vector datasets:
//!
//! - `math`: moment statistics (scalar and lane-batched) and the KS distance
//! - `fit`: model fitters, best-fit selection with presets, equivalence checks
//! - `extract`: concurrent whole-dataset extraction and its configuration
//! - `report` / `plot`: deterministic text summaries and sparklines
//!
//! The crate logs through `tracing` and installs no subscriber; the host
//! application chooses where events go.

pub mod domain;
pub mod error;
pub mod extract;
pub mod fit;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use domain::{Dataset, DimensionStatistics, ExtractionResult, FitResult, ModelType};
pub use error::{ExtractError, Result};
pub use extract::{DatasetExtractor, ExtractionConfig};
pub use fit::{BestFitSelector, ModelFitter, SelectorPreset, StatisticalEquivalenceChecker};
pub use models::ScalarModel;
