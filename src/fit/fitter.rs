//! Per-family model fitters.
//!
//! Given a dimension's statistics and its raw samples, each fitter:
//! - estimates its parameters (moment formulas, no iterative optimization)
//! - scores the result by KS distance to the sample (lower = better)
//!
//! Fitters are pure: identical inputs give identical outputs. Every fitter
//! rejects an empty sample; Gamma alone turns an unsupported domain into a
//! worst-score result so that selection over many candidates stays total.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{DimensionStatistics, FitResult, ModelType};
use crate::error::{ExtractError, Result};
use crate::math::{ks_statistic, sorted_copy};
use crate::models::ScalarModel;

/// Score reported for a model that cannot describe the data at all.
pub const WORST_SCORE: f64 = f64::MAX;

/// Histogram resolution of the default empirical fitter.
pub const DEFAULT_EMPIRICAL_BINS: usize = 32;

/// Finer histogram that keeps separate modes apart.
pub const MULTIMODAL_EMPIRICAL_BINS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelFitter {
    /// Normal(mean, std); `truncated` attaches the observed `[min, max]`.
    Normal {
        #[serde(default)]
        truncated: bool,
    },
    Uniform,
    /// Method-of-moments Beta on the observed `[min, max]`.
    Beta,
    /// Method-of-moments Gamma; needs strictly positive data.
    Gamma,
    /// Student-t with df from excess kurtosis.
    StudentT,
    /// Non-parametric histogram fallback.
    Empirical {
        #[serde(default = "default_bins")]
        bins: usize,
    },
}

fn default_bins() -> usize {
    DEFAULT_EMPIRICAL_BINS
}

impl ModelFitter {
    pub const fn normal() -> Self {
        ModelFitter::Normal { truncated: false }
    }

    pub const fn truncated_normal() -> Self {
        ModelFitter::Normal { truncated: true }
    }

    pub const fn empirical() -> Self {
        ModelFitter::Empirical {
            bins: DEFAULT_EMPIRICAL_BINS,
        }
    }

    pub const fn empirical_with_bins(bins: usize) -> Self {
        ModelFitter::Empirical { bins }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ModelFitter::Normal { .. } => ModelType::Normal,
            ModelFitter::Uniform => ModelType::Uniform,
            ModelFitter::Beta => ModelType::Beta,
            ModelFitter::Gamma => ModelType::Gamma,
            ModelFitter::StudentT => ModelType::StudentT,
            ModelFitter::Empirical { .. } => ModelType::Empirical,
        }
    }

    /// Fit this family to one dimension.
    ///
    /// `stats` must describe `values` (same sample count).
    pub fn fit(&self, stats: &DimensionStatistics, values: &[f64]) -> Result<FitResult> {
        check_sample(stats, values)?;
        self.fit_sorted(stats, &sorted_copy(values))
    }

    /// Same as [`fit`](Self::fit) for a sample already sorted ascending.
    ///
    /// Lets a selector sort once and share the order across all candidates.
    pub fn fit_sorted(&self, stats: &DimensionStatistics, sorted: &[f64]) -> Result<FitResult> {
        check_sample(stats, sorted)?;
        match *self {
            ModelFitter::Normal { truncated } => fit_normal(stats, sorted, truncated),
            ModelFitter::Uniform => fit_uniform(stats, sorted),
            ModelFitter::Beta => fit_beta(stats, sorted),
            ModelFitter::Gamma => fit_gamma(stats, sorted),
            ModelFitter::StudentT => fit_student_t(stats, sorted),
            ModelFitter::Empirical { bins } => fit_empirical(stats, sorted, bins),
        }
    }
}

fn check_sample(stats: &DimensionStatistics, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ExtractError::invalid(format!(
            "dimension {}: cannot fit an empty sample",
            stats.dimension()
        )));
    }
    if stats.count() != values.len() {
        return Err(ExtractError::invalid(format!(
            "dimension {}: statistics describe {} values but {} were supplied",
            stats.dimension(),
            stats.count(),
            values.len()
        )));
    }
    Ok(())
}

fn scored(model: ScalarModel, sorted: &[f64]) -> FitResult {
    let score = ks_statistic(sorted, |x| model.cdf(x));
    FitResult::new(model, score)
}

fn fit_normal(stats: &DimensionStatistics, sorted: &[f64], truncated: bool) -> Result<FitResult> {
    let model = if truncated {
        ScalarModel::truncated_normal(stats.mean(), stats.std_dev(), stats.min(), stats.max())?
    } else {
        ScalarModel::normal(stats.mean(), stats.std_dev())?
    };
    Ok(scored(model, sorted))
}

fn fit_uniform(stats: &DimensionStatistics, sorted: &[f64]) -> Result<FitResult> {
    let model = ScalarModel::uniform(stats.min(), stats.max())?;
    Ok(scored(model, sorted))
}

/// Beta shape parameters by method of moments on `[min, max]`.
///
/// With `m`, `v` the mean and variance rescaled to the unit interval:
///
/// ```text
/// c = m(1 - m)/v - 1,   α = m·c,   β = (1 - m)·c
/// ```
///
/// Degenerate spread (zero range/variance, or `c <= 0`) gives `(1, 1)`.
pub fn beta_shapes(stats: &DimensionStatistics) -> (f64, f64) {
    let range = stats.range();
    if !(range > 0.0) || !(stats.variance() > 0.0) {
        return (1.0, 1.0);
    }
    let m = (stats.mean() - stats.min()) / range;
    let v = stats.variance() / (range * range);
    let common = m * (1.0 - m) / v - 1.0;
    let alpha = m * common;
    let beta = (1.0 - m) * common;
    if !(alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0) {
        return (1.0, 1.0);
    }
    (alpha, beta)
}

fn fit_beta(stats: &DimensionStatistics, sorted: &[f64]) -> Result<FitResult> {
    let (alpha, beta) = beta_shapes(stats);
    let model = ScalarModel::bounded_beta(alpha, beta, stats.min(), stats.max())?;
    Ok(scored(model, sorted))
}

fn fit_gamma(stats: &DimensionStatistics, sorted: &[f64]) -> Result<FitResult> {
    let mean = stats.mean();
    let variance = stats.variance();
    if !(stats.min() > 0.0 && mean > 0.0 && variance > 0.0) {
        trace!(
            dimension = stats.dimension(),
            min = stats.min(),
            "gamma needs strictly positive, non-constant data; scoring as worst"
        );
        return Ok(worst_gamma());
    }

    // Huge magnitudes overflow `mean²` or the variance itself.
    let shape = mean * mean / variance;
    let scale = variance / mean;
    if !(shape.is_finite() && shape > 0.0 && scale.is_finite() && scale > 0.0) {
        trace!(
            dimension = stats.dimension(),
            shape,
            scale,
            "gamma moments out of range; scoring as worst"
        );
        return Ok(worst_gamma());
    }

    let model = ScalarModel::gamma(shape, scale)?;
    Ok(scored(model, sorted))
}

fn worst_gamma() -> FitResult {
    FitResult::new(
        ScalarModel::Gamma {
            shape: 1.0,
            scale: 1.0,
        },
        WORST_SCORE,
    )
}

/// Student-t degrees of freedom from raw kurtosis.
///
/// Excess kurtosis of a t distribution is `6/(ν - 4)`; inverting gives
/// `ν = 6/(κ - 3) + 4`. Light or normal tails map to the normal limit (∞).
pub fn student_t_degrees_of_freedom(kurtosis: f64) -> f64 {
    if kurtosis > 3.0 {
        6.0 / (kurtosis - 3.0) + 4.0
    } else {
        f64::INFINITY
    }
}

fn fit_student_t(stats: &DimensionStatistics, sorted: &[f64]) -> Result<FitResult> {
    let df = student_t_degrees_of_freedom(stats.kurtosis());
    let model = ScalarModel::student_t(df, stats.mean(), stats.std_dev())?;
    Ok(scored(model, sorted))
}

fn fit_empirical(stats: &DimensionStatistics, sorted: &[f64], bins: usize) -> Result<FitResult> {
    if bins == 0 {
        return Err(ExtractError::invalid("empirical fitter needs at least one bin"));
    }

    let (lower, upper) = (stats.min(), stats.max());
    let mut counts = vec![0usize; bins];
    let range = upper - lower;
    for &v in sorted {
        let idx = if range > 0.0 {
            (((v - lower) / range * bins as f64) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    let n = sorted.len() as f64;
    let mut cumulative = Vec::with_capacity(bins + 1);
    cumulative.push(0.0);
    let mut running = 0usize;
    for c in counts {
        running += c;
        cumulative.push(running as f64 / n);
    }

    let model = ScalarModel::empirical(lower, upper, cumulative)?;
    Ok(scored(model, sorted))
}
