//! Reporting utilities: candidate rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, ModelType};
use crate::models::ScalarModel;

/// One candidate's place in a per-dimension ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFit {
    /// 1-based position after sorting by penalized score.
    pub rank: usize,
    /// Position in the selector's declaration order.
    pub declared: usize,
    pub model_type: ModelType,
    pub model: ScalarModel,
    pub goodness_of_fit: f64,
    pub penalized_score: f64,
    pub selected: bool,
}

/// Rank `results` by `score` ascending; equal scores keep declaration order.
///
/// `selected` is the index (into `results`) of the candidate the selector
/// chose; it is marked rather than recomputed so the ranking always agrees
/// with the selection.
pub fn rank_fits(
    results: &[FitResult],
    score: impl Fn(&FitResult) -> f64,
    selected: Option<usize>,
) -> Vec<RankedFit> {
    let mut scored: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .map(|(i, r)| (i, score(r)))
        .collect();
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(pos, (i, penalized_score))| {
            let r = &results[i];
            RankedFit {
                rank: pos + 1,
                declared: i,
                model_type: r.model_type,
                model: r.model.clone(),
                goodness_of_fit: r.goodness_of_fit,
                penalized_score,
                selected: selected == Some(i),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(model: ScalarModel, score: f64) -> FitResult {
        FitResult::new(model, score)
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let results = vec![
            fit(ScalarModel::normal(0.0, 1.0).unwrap(), 0.1),
            fit(ScalarModel::uniform(0.0, 1.0).unwrap(), 0.05),
            fit(ScalarModel::gamma(1.0, 1.0).unwrap(), 0.1),
        ];
        let ranked = rank_fits(&results, |r| r.goodness_of_fit, Some(1));

        let order: Vec<usize> = ranked.iter().map(|r| r.declared).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(ranked[0].rank, 1);
        assert!(ranked[0].selected);
        assert_eq!(ranked.iter().filter(|r| r.selected).count(), 1);
    }

    #[test]
    fn nothing_selected_marks_nothing() {
        let results = vec![fit(ScalarModel::normal(0.0, 1.0).unwrap(), 0.1)];
        let ranked = rank_fits(&results, |r| r.goodness_of_fit, None);
        assert!(!ranked[0].selected);
        assert!(rank_fits(&[], |r| r.goodness_of_fit, None).is_empty());
    }
}
