//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced once per extraction call and shared read-only afterwards
//! - handed to external renderers/persisters without conversion

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::models::ScalarModel;

/// Stable tag for every fitted model family.
///
/// The lower-case string form (`as_str`, and the serde representation) is the
/// contract with downstream renderers; do not rename variants casually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Normal,
    Uniform,
    Beta,
    Gamma,
    StudentT,
    Empirical,
}

impl ModelType {
    pub const ALL: [ModelType; 6] = [
        ModelType::Normal,
        ModelType::Uniform,
        ModelType::Beta,
        ModelType::Gamma,
        ModelType::StudentT,
        ModelType::Empirical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Normal => "normal",
            ModelType::Uniform => "uniform",
            ModelType::Beta => "beta",
            ModelType::Gamma => "gamma",
            ModelType::StudentT => "student_t",
            ModelType::Empirical => "empirical",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelType::Normal => "Normal",
            ModelType::Uniform => "Uniform",
            ModelType::Beta => "Beta",
            ModelType::Gamma => "Gamma",
            ModelType::StudentT => "StudentT",
            ModelType::Empirical => "Empirical",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive statistics for one dimension.
///
/// Values are population statistics; `kurtosis` is raw (3.0 for a normal),
/// not excess. Construct through [`crate::math::compute`] unless you already
/// hold trusted moments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionStatistics {
    dimension: usize,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    variance: f64,
    skewness: f64,
    kurtosis: f64,
}

impl DimensionStatistics {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dimension: usize,
        count: usize,
        min: f64,
        max: f64,
        mean: f64,
        variance: f64,
        skewness: f64,
        kurtosis: f64,
    ) -> Self {
        Self {
            dimension,
            count,
            min,
            max,
            mean,
            variance,
            skewness,
            kurtosis,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn skewness(&self) -> f64 {
        self.skewness
    }

    /// Raw kurtosis (3.0 = normal-like tails).
    pub fn kurtosis(&self) -> f64 {
        self.kurtosis
    }

    pub fn excess_kurtosis(&self) -> f64 {
        self.kurtosis - 3.0
    }

    /// Advisory: shape moments are close to a normal's.
    ///
    /// Heuristic only; selector presets may consult it but fitters are never
    /// skipped because of it.
    pub fn appears_normal(&self) -> bool {
        self.skewness.abs() < 0.5 && self.excess_kurtosis().abs() < 1.0
    }

    /// Advisory: the observed range is narrow relative to the spread.
    ///
    /// A normal sample would put almost all mass inside ±3σ but its extremes
    /// keep growing with n; a range under 6σ suggests hard support bounds.
    pub fn appears_bounded(&self) -> bool {
        self.range() < 6.0 * self.std_dev()
    }

    /// Advisory: flat-topped and symmetric (uniform kurtosis is 1.8).
    pub fn appears_uniform(&self) -> bool {
        self.skewness.abs() < 0.3 && self.kurtosis > 1.2 && self.kurtosis < 2.5
    }
}

impl fmt::Display for DimensionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dim={} n={} range=[{:.4}, {:.4}] mean={:.4} std={:.4} skew={:.4} kurt={:.4}",
            self.dimension,
            self.count,
            self.min,
            self.max,
            self.mean,
            self.std_dev(),
            self.skewness,
            self.kurtosis
        )
    }
}

/// Fit output for a single fitter on a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ScalarModel,
    pub model_type: ModelType,
    /// Distance between sample and model (lower = better).
    pub goodness_of_fit: f64,
}

impl FitResult {
    pub fn new(model: ScalarModel, goodness_of_fit: f64) -> Self {
        let model_type = model.model_type();
        Self {
            model,
            model_type,
            goodness_of_fit,
        }
    }
}

/// Every candidate's fit per dimension, kept when "collect all fits" is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllFitsData {
    model_types: Vec<ModelType>,
    fits: Vec<BTreeMap<ModelType, FitResult>>,
    best: Vec<ModelType>,
    sparklines: Option<Vec<String>>,
}

impl AllFitsData {
    /// Assemble per-dimension fit data.
    ///
    /// Fails if the per-dimension vectors disagree in length or a dimension's
    /// best model type has no entry in its fit map.
    pub fn new(
        model_types: Vec<ModelType>,
        fits: Vec<BTreeMap<ModelType, FitResult>>,
        best: Vec<ModelType>,
        sparklines: Option<Vec<String>>,
    ) -> Result<Self> {
        if fits.len() != best.len() {
            return Err(ExtractError::invalid(format!(
                "fit maps ({}) and best model types ({}) disagree on dimension count",
                fits.len(),
                best.len()
            )));
        }
        if let Some(lines) = &sparklines {
            if lines.len() != fits.len() {
                return Err(ExtractError::invalid(format!(
                    "sparklines ({}) and fit maps ({}) disagree on dimension count",
                    lines.len(),
                    fits.len()
                )));
            }
        }
        for (dim, (map, kind)) in fits.iter().zip(&best).enumerate() {
            if !map.contains_key(kind) {
                return Err(ExtractError::invalid(format!(
                    "dimension {dim}: best model type {kind} missing from its fits"
                )));
            }
        }

        Ok(Self {
            model_types,
            fits,
            best,
            sparklines,
        })
    }

    pub fn num_dimensions(&self) -> usize {
        self.fits.len()
    }

    /// Model types in selector declaration order.
    pub fn model_types(&self) -> &[ModelType] {
        &self.model_types
    }

    pub fn fits(&self, dimension: usize) -> Option<&BTreeMap<ModelType, FitResult>> {
        self.fits.get(dimension)
    }

    pub fn best_model_type(&self, dimension: usize) -> Option<ModelType> {
        self.best.get(dimension).copied()
    }

    pub fn score(&self, dimension: usize, model_type: ModelType) -> Option<f64> {
        self.fits
            .get(dimension)
            .and_then(|m| m.get(&model_type))
            .map(|r| r.goodness_of_fit)
    }

    pub fn sparkline(&self, dimension: usize) -> Option<&str> {
        self.sparklines
            .as_ref()
            .and_then(|s| s.get(dimension))
            .map(String::as_str)
    }
}

/// Output of one extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    statistics: Vec<DimensionStatistics>,
    best_fits: Vec<FitResult>,
    all_fits: Option<AllFitsData>,
    elapsed: Duration,
}

impl ExtractionResult {
    pub fn new(
        statistics: Vec<DimensionStatistics>,
        best_fits: Vec<FitResult>,
        all_fits: Option<AllFitsData>,
        elapsed: Duration,
    ) -> Result<Self> {
        if statistics.len() != best_fits.len() {
            return Err(ExtractError::invalid(format!(
                "statistics ({}) and best fits ({}) disagree on dimension count",
                statistics.len(),
                best_fits.len()
            )));
        }
        if let Some(all) = &all_fits {
            if all.num_dimensions() != statistics.len() {
                return Err(ExtractError::invalid(format!(
                    "all-fits data ({}) and statistics ({}) disagree on dimension count",
                    all.num_dimensions(),
                    statistics.len()
                )));
            }
        }

        Ok(Self {
            statistics,
            best_fits,
            all_fits,
            elapsed,
        })
    }

    pub fn num_dimensions(&self) -> usize {
        self.statistics.len()
    }

    pub fn statistics(&self) -> &[DimensionStatistics] {
        &self.statistics
    }

    /// Selected fit per dimension, in dimension order.
    pub fn best_fits(&self) -> &[FitResult] {
        &self.best_fits
    }

    pub fn models(&self) -> impl Iterator<Item = &ScalarModel> {
        self.best_fits.iter().map(|f| &f.model)
    }

    pub fn all_fits(&self) -> Option<&AllFitsData> {
        self.all_fits.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_fit(score: f64) -> FitResult {
        FitResult::new(
            ScalarModel::Uniform {
                lower: 0.0,
                upper: 1.0,
            },
            score,
        )
    }

    #[test]
    fn model_type_strings_match_serde() {
        for kind in ModelType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn advisory_predicates_on_textbook_moments() {
        let normal = DimensionStatistics::new(0, 1000, -3.5, 3.4, 0.0, 1.0, 0.02, 3.05);
        assert!(normal.appears_normal());
        assert!(!normal.appears_uniform());
        assert!(!normal.appears_bounded());

        // U(0,1): variance 1/12, kurtosis 1.8, range 1 < 6 * 0.2887
        let uniform = DimensionStatistics::new(0, 1000, 0.0, 1.0, 0.5, 1.0 / 12.0, 0.0, 1.8);
        assert!(uniform.appears_uniform());
        assert!(uniform.appears_bounded());
        assert!(!uniform.appears_normal());
    }

    #[test]
    fn fit_result_takes_type_from_model() {
        let fit = uniform_fit(0.1);
        assert_eq!(fit.model_type, ModelType::Uniform);
    }

    #[test]
    fn all_fits_rejects_inconsistent_dimension_counts() {
        let mut map = BTreeMap::new();
        map.insert(ModelType::Uniform, uniform_fit(0.1));

        let err = AllFitsData::new(
            vec![ModelType::Uniform],
            vec![map.clone()],
            vec![ModelType::Uniform, ModelType::Uniform],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidArgument(_)));

        let err = AllFitsData::new(
            vec![ModelType::Uniform],
            vec![map],
            vec![ModelType::Normal],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidArgument(_)));
    }

    #[test]
    fn all_fits_accessors() {
        let mut map = BTreeMap::new();
        map.insert(ModelType::Uniform, uniform_fit(0.25));
        let all = AllFitsData::new(
            vec![ModelType::Uniform],
            vec![map],
            vec![ModelType::Uniform],
            Some(vec!["▁▂▃".to_string()]),
        )
        .unwrap();

        assert_eq!(all.num_dimensions(), 1);
        assert_eq!(all.best_model_type(0), Some(ModelType::Uniform));
        assert_eq!(all.score(0, ModelType::Uniform), Some(0.25));
        assert_eq!(all.score(0, ModelType::Normal), None);
        assert_eq!(all.sparkline(0), Some("▁▂▃"));
        assert_eq!(all.sparkline(1), None);
    }
}
