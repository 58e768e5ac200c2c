//! Pairwise statistical equivalence of fitted models.
//!
//! Used to collapse near-identical shapes when reporting across many
//! dimensions; it never changes what was fitted. Rules are checked in order
//! and the first match wins:
//!
//! 1. same model type (parameters are not compared)
//! 2. Normal vs Student-t with `ν >= 30`, Normal unbounded, matching location
//!    and scale
//! 3. Beta with both shapes near 1 vs Uniform on the same support
//! 4. bounded Normal vs Beta on the same support with close CDFs
//!
//! Two absent models are equivalent; absent vs present never is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::ScalarModel;

/// Student-t at or above this many degrees of freedom reads as Normal.
pub const STUDENT_T_NORMAL_THRESHOLD_DF: f64 = 30.0;

/// Max absolute gap between the Normal mean and the Student-t location.
pub const STUDENT_T_NORMAL_LOCATION_TOLERANCE: f64 = 0.1;

/// Max relative gap between the Normal std-dev and the Student-t scale.
pub const STUDENT_T_NORMAL_SCALE_TOLERANCE: f64 = 0.1;

/// Max distance of Beta shapes from 1.0 for the Uniform rule.
pub const BETA_UNIFORM_PARAM_TOLERANCE: f64 = 0.15;

/// Max CDF gap between a bounded Normal and a Beta on the same support.
pub const NORMAL_BETA_CDF_TOLERANCE: f64 = 0.08;

/// The support is cut into this many equal steps; interior edges are checked.
const CDF_CHECK_POINTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceReason {
    SameType,
    NormalStudentT,
    BetaUniform,
    NormalBeta,
}

impl EquivalenceReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EquivalenceReason::SameType => "same type",
            EquivalenceReason::NormalStudentT => "Normal ↔ StudentT(ν≥30)",
            EquivalenceReason::BetaUniform => "Beta(≈1,≈1) ↔ Uniform",
            EquivalenceReason::NormalBeta => "Normal[a,b] ↔ Beta[a,b]",
        }
    }
}

impl fmt::Display for EquivalenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalEquivalenceChecker;

impl StatisticalEquivalenceChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn are_equivalent(&self, a: Option<&ScalarModel>, b: Option<&ScalarModel>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => reason(a, b).is_some(),
            _ => false,
        }
    }

    /// Which rule made `a` and `b` equivalent, if any.
    ///
    /// `None` for two absent models as well: they are equivalent, but by
    /// definition rather than by a rule.
    pub fn equivalence_reason(
        &self,
        a: Option<&ScalarModel>,
        b: Option<&ScalarModel>,
    ) -> Option<EquivalenceReason> {
        reason(a?, b?)
    }

    /// Partition model indices into equivalence groups.
    ///
    /// Greedy: each model joins the first group whose representative (its
    /// first member) it is equivalent to, otherwise starts a new group. Groups
    /// come out in first-seen order.
    pub fn group_equivalent(&self, models: &[ScalarModel]) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, model) in models.iter().enumerate() {
            match groups
                .iter_mut()
                .find(|g| reason(&models[g[0]], model).is_some())
            {
                Some(group) => group.push(i),
                None => groups.push(vec![i]),
            }
        }
        groups
    }
}

fn reason(a: &ScalarModel, b: &ScalarModel) -> Option<EquivalenceReason> {
    if a.model_type() == b.model_type() {
        return Some(EquivalenceReason::SameType);
    }
    if normal_student_t(a, b) || normal_student_t(b, a) {
        return Some(EquivalenceReason::NormalStudentT);
    }
    if beta_uniform(a, b) || beta_uniform(b, a) {
        return Some(EquivalenceReason::BetaUniform);
    }
    if normal_beta(a, b) || normal_beta(b, a) {
        return Some(EquivalenceReason::NormalBeta);
    }
    None
}

fn normal_student_t(a: &ScalarModel, b: &ScalarModel) -> bool {
    match (a, b) {
        (
            ScalarModel::Normal {
                mean,
                std_dev,
                bounds: None,
            },
            ScalarModel::StudentT {
                degrees_of_freedom,
                location,
                scale,
            },
        ) => {
            *degrees_of_freedom >= STUDENT_T_NORMAL_THRESHOLD_DF
                && (mean - location).abs() <= STUDENT_T_NORMAL_LOCATION_TOLERANCE
                && (std_dev - scale).abs() / std_dev.max(0.01) <= STUDENT_T_NORMAL_SCALE_TOLERANCE
        }
        _ => false,
    }
}

fn beta_uniform(a: &ScalarModel, b: &ScalarModel) -> bool {
    match (a, b) {
        (
            ScalarModel::Beta {
                alpha,
                beta,
                lower,
                upper,
            },
            ScalarModel::Uniform {
                lower: u_lower,
                upper: u_upper,
            },
        ) => {
            (alpha - 1.0).abs() <= BETA_UNIFORM_PARAM_TOLERANCE
                && (beta - 1.0).abs() <= BETA_UNIFORM_PARAM_TOLERANCE
                && lower == u_lower
                && upper == u_upper
        }
        _ => false,
    }
}

fn normal_beta(normal: &ScalarModel, beta: &ScalarModel) -> bool {
    let (
        ScalarModel::Normal {
            bounds: Some(bounds),
            ..
        },
        ScalarModel::Beta { lower, upper, .. },
    ) = (normal, beta)
    else {
        return false;
    };
    if bounds.lower != *lower || bounds.upper != *upper || !(upper > lower) {
        return false;
    }

    let width = upper - lower;
    (1..CDF_CHECK_POINTS).all(|i| {
        let x = lower + width * i as f64 / CDF_CHECK_POINTS as f64;
        (normal.cdf(x) - beta.cdf(x)).abs() <= NORMAL_BETA_CDF_TOLERANCE
    })
}
