//! Best-fit selection over a configured set of fitters.
//!
//! Every fitter runs on the dimension and the candidate with the lowest
//! penalized score wins:
//!
//! - parametric families: `penalized = gof`
//! - empirical: `penalized = gof + p * gof`, with `p` the empirical penalty
//!
//! The histogram always matches its own sample closely, so without the penalty
//! it would win nearly every dimension. Exact ties go to the fitter declared
//! first.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DimensionStatistics, FitResult, ModelType};
use crate::error::{ExtractError, Result};
use crate::fit::fitter::{ModelFitter, MULTIMODAL_EMPIRICAL_BINS};
use crate::math::{compute, sorted_copy};
use crate::models::ScalarModel;
use crate::report::{format_fit_summary, rank_fits};

/// Penalty applied to the empirical score by the standard presets.
pub const DEFAULT_EMPIRICAL_PENALTY: f64 = 0.5;

/// Lighter penalty that lets the histogram win on multimodal data.
pub const MULTIMODAL_EMPIRICAL_PENALTY: f64 = 0.15;

/// Serializable selector description.
///
/// A missing `fitters` field is "no configuration", which is reported
/// differently from an explicitly empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSpec {
    #[serde(default)]
    pub fitters: Option<Vec<ModelFitter>>,
    #[serde(default = "default_penalty")]
    pub empirical_penalty: f64,
}

fn default_penalty() -> f64 {
    DEFAULT_EMPIRICAL_PENALTY
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestFitSelector {
    fitters: Vec<ModelFitter>,
    empirical_penalty: f64,
}

impl BestFitSelector {
    /// Build a selector from an ordered fitter list.
    ///
    /// - `None` fails with `NullConfiguration`
    /// - an empty list or a penalty outside `[0, 1]` fails with `InvalidArgument`
    /// - later fitters repeating an earlier fitter's model type are dropped
    pub fn new(fitters: Option<Vec<ModelFitter>>, empirical_penalty: f64) -> Result<Self> {
        let Some(fitters) = fitters else {
            return Err(ExtractError::NullConfiguration(
                "fitter list is required".to_string(),
            ));
        };
        if fitters.is_empty() {
            return Err(ExtractError::invalid("at least one fitter is required"));
        }
        check_penalty(empirical_penalty)?;

        let mut unique: Vec<ModelFitter> = Vec::with_capacity(fitters.len());
        for f in fitters {
            if unique.iter().any(|u| u.model_type() == f.model_type()) {
                continue;
            }
            unique.push(f);
        }

        Ok(Self {
            fitters: unique,
            empirical_penalty,
        })
    }

    pub fn from_spec(spec: SelectorSpec) -> Result<Self> {
        Self::new(spec.fitters, spec.empirical_penalty)
    }

    /// Same fitters, different empirical penalty.
    pub fn with_empirical_penalty(self, empirical_penalty: f64) -> Result<Self> {
        check_penalty(empirical_penalty)?;
        Ok(Self {
            empirical_penalty,
            ..self
        })
    }

    // Presets. Their lists are non-empty and duplicate-free by construction.
    fn preset(fitters: Vec<ModelFitter>, empirical_penalty: f64) -> Self {
        Self {
            fitters,
            empirical_penalty,
        }
    }

    /// Truncated Normal, Beta, Uniform: data known to live in a fixed range.
    pub fn bounded_data() -> Self {
        Self::preset(
            vec![
                ModelFitter::truncated_normal(),
                ModelFitter::Beta,
                ModelFitter::Uniform,
            ],
            DEFAULT_EMPIRICAL_PENALTY,
        )
    }

    /// [`bounded_data`](Self::bounded_data) plus the empirical fallback.
    pub fn bounded_data_with_empirical() -> Self {
        Self::preset(
            vec![
                ModelFitter::truncated_normal(),
                ModelFitter::Beta,
                ModelFitter::Uniform,
                ModelFitter::empirical(),
            ],
            DEFAULT_EMPIRICAL_PENALTY,
        )
    }

    /// Every family.
    pub fn full_parametric_with_empirical() -> Self {
        Self::preset(
            vec![
                ModelFitter::normal(),
                ModelFitter::Uniform,
                ModelFitter::Beta,
                ModelFitter::Gamma,
                ModelFitter::StudentT,
                ModelFitter::empirical(),
            ],
            DEFAULT_EMPIRICAL_PENALTY,
        )
    }

    /// Fine histogram with a light penalty so separate modes survive.
    pub fn multimodal_aware() -> Self {
        Self::preset(
            vec![
                ModelFitter::normal(),
                ModelFitter::Beta,
                ModelFitter::Uniform,
                ModelFitter::empirical_with_bins(MULTIMODAL_EMPIRICAL_BINS),
            ],
            MULTIMODAL_EMPIRICAL_PENALTY,
        )
    }

    pub fn parametric_only() -> Self {
        Self::preset(
            vec![ModelFitter::normal(), ModelFitter::Uniform],
            DEFAULT_EMPIRICAL_PENALTY,
        )
    }

    pub fn default_selector() -> Self {
        Self::preset(
            vec![
                ModelFitter::normal(),
                ModelFitter::Uniform,
                ModelFitter::empirical(),
            ],
            DEFAULT_EMPIRICAL_PENALTY,
        )
    }

    pub fn fitters(&self) -> &[ModelFitter] {
        &self.fitters
    }

    pub fn empirical_penalty(&self) -> f64 {
        self.empirical_penalty
    }

    /// Model types in declaration order.
    pub fn model_types(&self) -> Vec<ModelType> {
        self.fitters.iter().map(ModelFitter::model_type).collect()
    }

    /// Run every fitter on `values` (statistics computed here, as dimension 0).
    pub fn fit_all(&self, values: &[f64]) -> Result<Vec<FitResult>> {
        let stats = compute(0, values)?;
        self.fit_all_with_stats(&stats, values)
    }

    /// Run every fitter, in declaration order, on one dimension.
    pub fn fit_all_with_stats(
        &self,
        stats: &DimensionStatistics,
        values: &[f64],
    ) -> Result<Vec<FitResult>> {
        if values.is_empty() {
            return Err(ExtractError::invalid(format!(
                "dimension {}: cannot select a model for an empty sample",
                stats.dimension()
            )));
        }
        let sorted = sorted_copy(values);
        self.fitters
            .iter()
            .map(|f| f.fit_sorted(stats, &sorted))
            .collect()
    }

    pub fn select_best_result(&self, values: &[f64]) -> Result<FitResult> {
        let stats = compute(0, values)?;
        self.select_best_result_with_stats(&stats, values)
    }

    pub fn select_best(&self, values: &[f64]) -> Result<ScalarModel> {
        Ok(self.select_best_result(values)?.model)
    }

    pub fn select_best_result_with_stats(
        &self,
        stats: &DimensionStatistics,
        values: &[f64],
    ) -> Result<FitResult> {
        let mut results = self.fit_all_with_stats(stats, values)?;
        let best = self.best_index(&results).ok_or_else(|| {
            ExtractError::invalid(format!("dimension {}: no fit results", stats.dimension()))
        })?;
        let chosen = results.swap_remove(best);
        debug!(
            dimension = stats.dimension(),
            model = chosen.model_type.as_str(),
            score = chosen.goodness_of_fit,
            "selected model"
        );
        Ok(chosen)
    }

    /// Score used for ranking: empirical fits pay `p * gof` extra.
    pub fn penalized_score(&self, result: &FitResult) -> f64 {
        let gof = result.goodness_of_fit;
        if result.model_type == ModelType::Empirical {
            gof + self.empirical_penalty * gof
        } else {
            gof
        }
    }

    /// Index of the winning result; earliest wins exact ties.
    pub fn best_index(&self, results: &[FitResult]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, r) in results.iter().enumerate() {
            let score = self.penalized_score(r);
            match best {
                Some((_, s)) if !(score < s) => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Apply the selection rule to results that were fitted elsewhere.
    pub fn select_from<'a>(&self, results: &'a [FitResult]) -> Option<&'a FitResult> {
        self.best_index(results).map(|i| &results[i])
    }

    /// Ranked, human-readable summary of every candidate on `values`.
    pub fn summarize_fits(&self, values: &[f64]) -> Result<String> {
        let stats = compute(0, values)?;
        let results = self.fit_all_with_stats(&stats, values)?;
        let selected = self.best_index(&results);
        let ranked = rank_fits(&results, |r| self.penalized_score(r), selected);
        Ok(format_fit_summary(&stats, &ranked))
    }
}

fn check_penalty(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ExtractError::invalid(format!(
            "empirical penalty must be in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Named selector configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorPreset {
    BoundedData,
    BoundedDataWithEmpirical,
    FullParametricWithEmpirical,
    MultimodalAware,
    ParametricOnly,
    #[default]
    #[serde(rename = "default")]
    Standard,
}

impl SelectorPreset {
    pub const ALL: [SelectorPreset; 6] = [
        SelectorPreset::BoundedData,
        SelectorPreset::BoundedDataWithEmpirical,
        SelectorPreset::FullParametricWithEmpirical,
        SelectorPreset::MultimodalAware,
        SelectorPreset::ParametricOnly,
        SelectorPreset::Standard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SelectorPreset::BoundedData => "bounded_data",
            SelectorPreset::BoundedDataWithEmpirical => "bounded_data_with_empirical",
            SelectorPreset::FullParametricWithEmpirical => "full_parametric_with_empirical",
            SelectorPreset::MultimodalAware => "multimodal_aware",
            SelectorPreset::ParametricOnly => "parametric_only",
            SelectorPreset::Standard => "default",
        }
    }

    pub fn selector(self) -> BestFitSelector {
        match self {
            SelectorPreset::BoundedData => BestFitSelector::bounded_data(),
            SelectorPreset::BoundedDataWithEmpirical => {
                BestFitSelector::bounded_data_with_empirical()
            }
            SelectorPreset::FullParametricWithEmpirical => {
                BestFitSelector::full_parametric_with_empirical()
            }
            SelectorPreset::MultimodalAware => BestFitSelector::multimodal_aware(),
            SelectorPreset::ParametricOnly => BestFitSelector::parametric_only(),
            SelectorPreset::Standard => BestFitSelector::default_selector(),
        }
    }
}

impl FromStr for SelectorPreset {
    type Err = ExtractError;

    /// Accepts the snake_case names, case-insensitively, with `-` for `_`.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        SelectorPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| ExtractError::Config(format!("unknown selector preset '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn evenly_spaced(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / n as f64).collect()
    }

    #[test]
    fn fit_all_returns_one_result_per_fitter() {
        let values = evenly_spaced(200);
        for preset in SelectorPreset::ALL {
            let selector = preset.selector();
            let results = selector.fit_all(&values).unwrap();
            assert_eq!(results.len(), selector.fitters().len(), "{preset:?}");
            let types: Vec<ModelType> = results.iter().map(|r| r.model_type).collect();
            assert_eq!(types, selector.model_types());
        }
    }

    #[test]
    fn penalty_keeps_uniform_ahead_of_histogram() {
        let selector = BestFitSelector::new(
            Some(vec![ModelFitter::Uniform, ModelFitter::empirical()]),
            0.5,
        )
        .unwrap();
        let best = selector.select_best_result(&evenly_spaced(1000)).unwrap();
        assert_eq!(best.model_type.as_str(), "uniform");
    }

    #[test]
    fn missing_and_empty_fitter_lists_fail_differently() {
        let err = BestFitSelector::new(None, 0.5).unwrap_err();
        assert!(matches!(err, ExtractError::NullConfiguration(_)));

        let err = BestFitSelector::new(Some(vec![]), 0.5).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidArgument(_)));
    }

    #[test]
    fn penalty_must_be_a_fraction() {
        for p in [-0.1, 1.01, f64::NAN] {
            let err = BestFitSelector::new(Some(vec![ModelFitter::Uniform]), p).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidArgument(_)), "p={p}");
        }
        assert!(BestFitSelector::parametric_only()
            .with_empirical_penalty(2.0)
            .is_err());
        let s = BestFitSelector::parametric_only()
            .with_empirical_penalty(0.0)
            .unwrap();
        assert_eq!(s.empirical_penalty(), 0.0);
    }

    #[test]
    fn duplicate_model_types_keep_first() {
        let selector = BestFitSelector::new(
            Some(vec![
                ModelFitter::truncated_normal(),
                ModelFitter::Uniform,
                ModelFitter::normal(),
            ]),
            0.5,
        )
        .unwrap();
        assert_eq!(
            selector.fitters(),
            &[ModelFitter::truncated_normal(), ModelFitter::Uniform]
        );
    }

    #[test]
    fn spec_without_fitters_is_null_configuration() {
        let spec: SelectorSpec = serde_json::from_str(r#"{"empirical_penalty": 0.2}"#).unwrap();
        let err = BestFitSelector::from_spec(spec).unwrap_err();
        assert!(matches!(err, ExtractError::NullConfiguration(_)));

        let spec: SelectorSpec =
            serde_json::from_str(r#"{"fitters": [{"type": "uniform"}]}"#).unwrap();
        let selector = BestFitSelector::from_spec(spec).unwrap();
        assert_eq!(selector.empirical_penalty(), DEFAULT_EMPIRICAL_PENALTY);
    }

    #[test]
    fn gaussian_data_selects_normal() {
        let mut rng = StdRng::seed_from_u64(42);
        let dist = Normal::new(0.0, 1.0).unwrap();
        let values: Vec<f64> = (0..10_000).map(|_| dist.sample(&mut rng)).collect();
        let model = BestFitSelector::parametric_only()
            .select_best(&values)
            .unwrap();
        assert_eq!(model.model_type(), ModelType::Normal);
    }

    #[test]
    fn uniform_data_selects_uniform() {
        let mut rng = StdRng::seed_from_u64(43);
        let values: Vec<f64> = (0..10_000).map(|_| rng.gen_range(-2.0..3.0)).collect();
        let model = BestFitSelector::parametric_only()
            .select_best(&values)
            .unwrap();
        assert_eq!(model.model_type(), ModelType::Uniform);
    }

    #[test]
    fn exact_ties_go_to_first_declared() {
        // Constant data: both models collapse to the same point mass.
        let values = [2.0; 50];
        let a = BestFitSelector::new(Some(vec![ModelFitter::Uniform, ModelFitter::normal()]), 0.5)
            .unwrap();
        let b = BestFitSelector::new(Some(vec![ModelFitter::normal(), ModelFitter::Uniform]), 0.5)
            .unwrap();
        assert_eq!(a.select_best_result(&values).unwrap().model_type, ModelType::Uniform);
        assert_eq!(b.select_best_result(&values).unwrap().model_type, ModelType::Normal);
    }

    #[test]
    fn empty_values_are_rejected() {
        let selector = BestFitSelector::default_selector();
        assert!(matches!(
            selector.fit_all(&[]).unwrap_err(),
            ExtractError::InvalidArgument(_)
        ));
        assert!(selector.select_best(&[]).is_err());
    }

    #[test]
    fn penalized_score_only_touches_empirical() {
        let selector = BestFitSelector::default_selector();
        let uniform = FitResult::new(ScalarModel::uniform(0.0, 1.0).unwrap(), 0.2);
        let hist = FitResult::new(
            ScalarModel::empirical(0.0, 1.0, vec![0.0, 1.0]).unwrap(),
            0.2,
        );
        assert_eq!(selector.penalized_score(&uniform), 0.2);
        assert!((selector.penalized_score(&hist) - 0.3).abs() < 1e-12);

        let results = vec![hist, uniform];
        assert_eq!(selector.best_index(&results), Some(1));
        assert_eq!(
            selector.select_from(&results).map(|r| r.model_type),
            Some(ModelType::Uniform)
        );
        assert_eq!(selector.select_from(&[]), None);
    }

    #[test]
    fn presets_parse_from_config_names() {
        assert_eq!(
            "multimodal-aware".parse::<SelectorPreset>().unwrap(),
            SelectorPreset::MultimodalAware
        );
        assert_eq!(
            "DEFAULT".parse::<SelectorPreset>().unwrap(),
            SelectorPreset::Standard
        );
        assert!(matches!(
            "bogus".parse::<SelectorPreset>().unwrap_err(),
            ExtractError::Config(_)
        ));
        for preset in SelectorPreset::ALL {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.as_str()));
        }
        assert_eq!(
            SelectorPreset::MultimodalAware.selector().empirical_penalty(),
            MULTIMODAL_EMPIRICAL_PENALTY
        );
    }

    #[test]
    fn summary_marks_the_selected_candidate() {
        let selector = BestFitSelector::new(
            Some(vec![ModelFitter::empirical(), ModelFitter::Uniform]),
            0.5,
        )
        .unwrap();
        let summary = selector.summarize_fits(&evenly_spaced(1000)).unwrap();
        let marked: Vec<&str> = summary.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("uniform"), "{summary}");
    }
}
