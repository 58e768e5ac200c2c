//! Whole-dataset extraction.
//!
//! The dimension axis is cut into tasks of `dimensions_per_task` adjacent
//! dimensions and the tasks run on a bounded rayon pool:
//!
//! ```text
//! dims:  [0 .. 64) [64 .. 128) ... [k*64 .. D)
//!           |          |                |
//!        batched stats + per-dimension selection (one task each)
//!           |          |                |
//!        indexed collect -> flatten in dimension order
//! ```
//!
//! Rayon's indexed collect writes each task's output into its own slot, so the
//! result order never depends on completion order. Any failing dimension fails
//! the whole call.

pub mod config;

pub use config::*;

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::domain::{
    AllFitsData, Dataset, DimensionStatistics, ExtractionResult, FitResult, ModelType,
};
use crate::error::{ExtractError, Result};
use crate::fit::BestFitSelector;
use crate::math::compute_range;
use crate::plot::{DEFAULT_SPARKLINE_WIDTH, render};

/// Dimensions handed to one worker task.
pub const DEFAULT_DIMENSIONS_PER_TASK: usize = 64;

/// Reusable dataset extractor backed by its own worker pool.
#[derive(Debug, Clone)]
pub struct DatasetExtractor {
    selector: BestFitSelector,
    pool: Arc<ThreadPool>,
    parallelism: usize,
    dimensions_per_task: usize,
    collect_all_fits: bool,
    sparkline_width: usize,
}

#[derive(Debug, Clone)]
pub struct DatasetExtractorBuilder {
    selector: BestFitSelector,
    parallelism: Option<usize>,
    dimensions_per_task: usize,
    collect_all_fits: bool,
    sparkline_width: usize,
}

impl Default for DatasetExtractorBuilder {
    fn default() -> Self {
        Self {
            selector: BestFitSelector::default_selector(),
            parallelism: None,
            dimensions_per_task: DEFAULT_DIMENSIONS_PER_TASK,
            collect_all_fits: false,
            sparkline_width: DEFAULT_SPARKLINE_WIDTH,
        }
    }
}

impl DatasetExtractorBuilder {
    pub fn selector(mut self, selector: BestFitSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Worker threads; `None` uses the machine's available parallelism.
    pub fn parallelism(mut self, threads: Option<usize>) -> Self {
        self.parallelism = threads;
        self
    }

    pub fn dimensions_per_task(mut self, dims: usize) -> Self {
        self.dimensions_per_task = dims;
        self
    }

    /// Keep every candidate's fit and a sparkline per dimension.
    pub fn collect_all_fits(mut self, enabled: bool) -> Self {
        self.collect_all_fits = enabled;
        self
    }

    pub fn sparkline_width(mut self, width: usize) -> Self {
        self.sparkline_width = width;
        self
    }

    pub fn build(self) -> Result<DatasetExtractor> {
        let parallelism = match self.parallelism {
            Some(0) => return Err(ExtractError::invalid("parallelism must be >= 1")),
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };
        if self.dimensions_per_task == 0 {
            return Err(ExtractError::invalid("dimensions_per_task must be >= 1"));
        }
        if self.sparkline_width == 0 {
            return Err(ExtractError::invalid("sparkline_width must be >= 1"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("vshapes-extract-{i}"))
            .build()?;

        Ok(DatasetExtractor {
            selector: self.selector,
            pool: Arc::new(pool),
            parallelism,
            dimensions_per_task: self.dimensions_per_task,
            collect_all_fits: self.collect_all_fits,
            sparkline_width: self.sparkline_width,
        })
    }
}

/// Everything one dimension contributes to the result.
struct DimensionOutcome {
    stats: DimensionStatistics,
    best: FitResult,
    all: Option<(BTreeMap<ModelType, FitResult>, String)>,
}

impl DatasetExtractor {
    pub fn builder() -> DatasetExtractorBuilder {
        DatasetExtractorBuilder::default()
    }

    /// Extractor with the default selector and pool size.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn selector(&self) -> &BestFitSelector {
        &self.selector
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn dimensions_per_task(&self) -> usize {
        self.dimensions_per_task
    }

    pub fn collects_all_fits(&self) -> bool {
        self.collect_all_fits
    }

    /// Fit every dimension of `dataset`.
    pub fn extract(&self, dataset: &Dataset) -> Result<ExtractionResult> {
        let started = Instant::now();
        let dims = dataset.num_dimensions();
        info!(
            dimensions = dims,
            samples = dataset.num_samples(),
            parallelism = self.parallelism,
            dimensions_per_task = self.dimensions_per_task,
            collect_all_fits = self.collect_all_fits,
            "starting extraction"
        );

        let tasks: Vec<Range<usize>> = (0..dims)
            .step_by(self.dimensions_per_task)
            .map(|start| start..(start + self.dimensions_per_task).min(dims))
            .collect();

        let per_task: Vec<Vec<DimensionOutcome>> = self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|range| self.extract_range(dataset, range))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut statistics = Vec::with_capacity(dims);
        let mut best_fits = Vec::with_capacity(dims);
        let mut fit_maps = Vec::new();
        let mut best_types = Vec::new();
        let mut sparklines = Vec::new();
        for outcome in per_task.into_iter().flatten() {
            if let Some((map, spark)) = outcome.all {
                fit_maps.push(map);
                best_types.push(outcome.best.model_type);
                sparklines.push(spark);
            }
            statistics.push(outcome.stats);
            best_fits.push(outcome.best);
        }

        let all_fits = if self.collect_all_fits {
            Some(AllFitsData::new(
                self.selector.model_types(),
                fit_maps,
                best_types,
                Some(sparklines),
            )?)
        } else {
            None
        };

        let elapsed = started.elapsed();
        info!(
            dimensions = dims,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "extraction finished"
        );
        ExtractionResult::new(statistics, best_fits, all_fits, elapsed)
    }

    fn extract_range(
        &self,
        dataset: &Dataset,
        range: Range<usize>,
    ) -> Result<Vec<DimensionOutcome>> {
        let stats = compute_range(dataset, range)?;
        stats
            .into_iter()
            .map(|s| -> Result<DimensionOutcome> {
                let values = dataset.dimension(s.dimension());
                if !self.collect_all_fits {
                    let best = self.selector.select_best_result_with_stats(&s, values)?;
                    return Ok(DimensionOutcome {
                        stats: s,
                        best,
                        all: None,
                    });
                }

                let results = self.selector.fit_all_with_stats(&s, values)?;
                let best = self
                    .selector
                    .select_from(&results)
                    .cloned()
                    .ok_or_else(|| {
                        ExtractError::invalid(format!(
                            "dimension {}: no fit results",
                            s.dimension()
                        ))
                    })?;
                let map = results.into_iter().map(|r| (r.model_type, r)).collect();
                let spark = render(values, self.sparkline_width);
                Ok(DimensionOutcome {
                    stats: s,
                    best,
                    all: Some((map, spark)),
                })
            })
            .collect()
    }
}
