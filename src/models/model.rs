//! Fitted scalar distribution models.
//!
//! The family is closed; every variant carries its parameters and can
//! evaluate its CDF, which is all goodness-of-fit scoring and equivalence
//! checks need. CDFs of the named families come from `statrs`; a model whose
//! scale has collapsed to zero behaves as a point mass (step CDF).

use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF, Gamma, Normal, StudentsT};

use crate::domain::ModelType;
use crate::error::{ExtractError, Result};

/// Closed support interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub lower: f64,
    pub upper: f64,
}

impl Support {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
            return Err(ExtractError::invalid(format!(
                "invalid support [{lower}, {upper}] (must be finite with lower <= upper)"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalarModel {
    /// Normal, optionally truncated to `bounds`.
    Normal {
        mean: f64,
        std_dev: f64,
        bounds: Option<Support>,
    },
    Uniform {
        lower: f64,
        upper: f64,
    },
    /// Beta(α, β) stretched onto `[lower, upper]`.
    Beta {
        alpha: f64,
        beta: f64,
        lower: f64,
        upper: f64,
    },
    Gamma {
        shape: f64,
        scale: f64,
    },
    /// Location-scale Student-t. An infinite `degrees_of_freedom` is the
    /// normal limit.
    StudentT {
        degrees_of_freedom: f64,
        location: f64,
        scale: f64,
    },
    /// Equal-width histogram over `[lower, upper]`.
    ///
    /// `cumulative[k]` is the fraction of the sample below bin edge `k`, so the
    /// vector has `bins + 1` entries running from 0 to 1.
    Empirical {
        lower: f64,
        upper: f64,
        cumulative: Vec<f64>,
    },
}

impl ScalarModel {
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self> {
        check_location("normal mean", mean)?;
        check_scale("normal std_dev", std_dev)?;
        Ok(ScalarModel::Normal {
            mean,
            std_dev,
            bounds: None,
        })
    }

    pub fn truncated_normal(mean: f64, std_dev: f64, lower: f64, upper: f64) -> Result<Self> {
        check_location("normal mean", mean)?;
        check_scale("normal std_dev", std_dev)?;
        Ok(ScalarModel::Normal {
            mean,
            std_dev,
            bounds: Some(Support::new(lower, upper)?),
        })
    }

    pub fn uniform(lower: f64, upper: f64) -> Result<Self> {
        let s = Support::new(lower, upper)?;
        Ok(ScalarModel::Uniform {
            lower: s.lower,
            upper: s.upper,
        })
    }

    /// Beta on the standard `[0, 1]` support.
    pub fn beta(alpha: f64, beta: f64) -> Result<Self> {
        Self::bounded_beta(alpha, beta, 0.0, 1.0)
    }

    pub fn bounded_beta(alpha: f64, beta: f64, lower: f64, upper: f64) -> Result<Self> {
        check_shape("beta alpha", alpha)?;
        check_shape("beta beta", beta)?;
        let s = Support::new(lower, upper)?;
        Ok(ScalarModel::Beta {
            alpha,
            beta,
            lower: s.lower,
            upper: s.upper,
        })
    }

    pub fn gamma(shape: f64, scale: f64) -> Result<Self> {
        check_shape("gamma shape", shape)?;
        check_shape("gamma scale", scale)?;
        Ok(ScalarModel::Gamma { shape, scale })
    }

    pub fn student_t(degrees_of_freedom: f64, location: f64, scale: f64) -> Result<Self> {
        if degrees_of_freedom.is_nan() || degrees_of_freedom <= 0.0 {
            return Err(ExtractError::invalid(format!(
                "student_t degrees_of_freedom must be > 0, got {degrees_of_freedom}"
            )));
        }
        check_location("student_t location", location)?;
        check_scale("student_t scale", scale)?;
        Ok(ScalarModel::StudentT {
            degrees_of_freedom,
            location,
            scale,
        })
    }

    pub fn empirical(lower: f64, upper: f64, cumulative: Vec<f64>) -> Result<Self> {
        let s = Support::new(lower, upper)?;
        if cumulative.len() < 2 {
            return Err(ExtractError::invalid(
                "empirical model needs at least one bin (two cumulative edges)",
            ));
        }
        let monotone = cumulative.windows(2).all(|w| w[0] <= w[1]);
        let first = cumulative[0];
        let last = cumulative[cumulative.len() - 1];
        if !monotone || first.abs() > 1e-9 || (last - 1.0).abs() > 1e-9 {
            return Err(ExtractError::invalid(
                "empirical cumulative fractions must rise monotonically from 0 to 1",
            ));
        }
        Ok(ScalarModel::Empirical {
            lower: s.lower,
            upper: s.upper,
            cumulative,
        })
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ScalarModel::Normal { .. } => ModelType::Normal,
            ScalarModel::Uniform { .. } => ModelType::Uniform,
            ScalarModel::Beta { .. } => ModelType::Beta,
            ScalarModel::Gamma { .. } => ModelType::Gamma,
            ScalarModel::StudentT { .. } => ModelType::StudentT,
            ScalarModel::Empirical { .. } => ModelType::Empirical,
        }
    }

    /// Finite support, if the model has one.
    pub fn support(&self) -> Option<Support> {
        match self {
            ScalarModel::Normal { bounds, .. } => *bounds,
            ScalarModel::Uniform { lower, upper }
            | ScalarModel::Beta { lower, upper, .. }
            | ScalarModel::Empirical { lower, upper, .. } => Some(Support {
                lower: *lower,
                upper: *upper,
            }),
            ScalarModel::Gamma { .. } | ScalarModel::StudentT { .. } => None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.support().is_some()
    }

    /// Cumulative distribution function.
    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            ScalarModel::Normal {
                mean,
                std_dev,
                bounds: None,
            } => normal_cdf(x, *mean, *std_dev),
            ScalarModel::Normal {
                mean,
                std_dev,
                bounds: Some(b),
            } => truncated_normal_cdf(x, *mean, *std_dev, *b),
            ScalarModel::Uniform { lower, upper } => {
                if upper <= lower {
                    return step(x, *lower);
                }
                ((x - lower) / (upper - lower)).clamp(0.0, 1.0)
            }
            ScalarModel::Beta {
                alpha,
                beta,
                lower,
                upper,
            } => {
                if upper <= lower {
                    return step(x, *lower);
                }
                let t = (x - lower) / (upper - lower);
                if t <= 0.0 {
                    return 0.0;
                }
                if t >= 1.0 {
                    return 1.0;
                }
                Beta::new(*alpha, *beta)
                    .map(|d| d.cdf(t))
                    .unwrap_or_else(|_| t)
            }
            ScalarModel::Gamma { shape, scale } => {
                if x <= 0.0 {
                    return 0.0;
                }
                Gamma::new(*shape, 1.0 / scale)
                    .map(|d| d.cdf(x))
                    .unwrap_or_else(|_| step(x, shape * scale))
            }
            ScalarModel::StudentT {
                degrees_of_freedom,
                location,
                scale,
            } => {
                if !degrees_of_freedom.is_finite() || *scale <= 0.0 {
                    return normal_cdf(x, *location, *scale);
                }
                StudentsT::new(*location, *scale, *degrees_of_freedom)
                    .map(|d| d.cdf(x))
                    .unwrap_or_else(|_| step(x, *location))
            }
            ScalarModel::Empirical {
                lower,
                upper,
                cumulative,
            } => histogram_cdf(x, *lower, *upper, cumulative),
        }
    }
}

impl fmt::Display for ScalarModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarModel::Normal {
                mean,
                std_dev,
                bounds: None,
            } => write!(f, "normal(mean={mean:.4}, std={std_dev:.4})"),
            ScalarModel::Normal {
                mean,
                std_dev,
                bounds: Some(b),
            } => write!(
                f,
                "normal(mean={mean:.4}, std={std_dev:.4}, [{:.4}, {:.4}])",
                b.lower, b.upper
            ),
            ScalarModel::Uniform { lower, upper } => {
                write!(f, "uniform([{lower:.4}, {upper:.4}])")
            }
            ScalarModel::Beta {
                alpha,
                beta,
                lower,
                upper,
            } => write!(
                f,
                "beta(alpha={alpha:.4}, beta={beta:.4}, [{lower:.4}, {upper:.4}])"
            ),
            ScalarModel::Gamma { shape, scale } => {
                write!(f, "gamma(shape={shape:.4}, scale={scale:.4})")
            }
            ScalarModel::StudentT {
                degrees_of_freedom,
                location,
                scale,
            } => write!(
                f,
                "student_t(df={degrees_of_freedom:.4}, loc={location:.4}, scale={scale:.4})"
            ),
            ScalarModel::Empirical {
                lower,
                upper,
                cumulative,
            } => write!(
                f,
                "empirical(bins={}, [{lower:.4}, {upper:.4}])",
                cumulative.len().saturating_sub(1)
            ),
        }
    }
}

fn check_location(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ExtractError::invalid(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}

fn check_scale(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ExtractError::invalid(format!("{name} must be finite and >= 0, got {value}")));
    }
    Ok(())
}

fn check_shape(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ExtractError::invalid(format!("{name} must be finite and > 0, got {value}")));
    }
    Ok(())
}

fn step(x: f64, at: f64) -> f64 {
    if x < at { 0.0 } else { 1.0 }
}

fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return step(x, mean);
    }
    Normal::new(mean, std_dev)
        .map(|d| d.cdf(x))
        .unwrap_or_else(|_| step(x, mean))
}

fn truncated_normal_cdf(x: f64, mean: f64, std_dev: f64, bounds: Support) -> f64 {
    if x < bounds.lower {
        return 0.0;
    }
    if x >= bounds.upper {
        return 1.0;
    }
    let lo = normal_cdf(bounds.lower, mean, std_dev);
    let hi = normal_cdf(bounds.upper, mean, std_dev);
    let mass = hi - lo;
    // Window far out in a tail: no usable mass, spread it evenly.
    if mass <= f64::EPSILON {
        return ((x - bounds.lower) / bounds.width()).clamp(0.0, 1.0);
    }
    ((normal_cdf(x, mean, std_dev) - lo) / mass).clamp(0.0, 1.0)
}

fn histogram_cdf(x: f64, lower: f64, upper: f64, cumulative: &[f64]) -> f64 {
    let bins = cumulative.len().saturating_sub(1);
    if bins == 0 || upper <= lower {
        return step(x, lower);
    }
    if x <= lower {
        return 0.0;
    }
    if x >= upper {
        return 1.0;
    }
    let pos = (x - lower) / (upper - lower) * bins as f64;
    let idx = (pos.floor() as usize).min(bins - 1);
    let frac = pos - idx as f64;
    cumulative[idx] + frac * (cumulative[idx + 1] - cumulative[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_cdf_is_half_at_mean() {
        let m = ScalarModel::normal(2.0, 3.0).unwrap();
        assert!((m.cdf(2.0) - 0.5).abs() < 1e-9);
        assert!(m.cdf(-100.0) < 1e-9);
        assert!(m.cdf(100.0) > 1.0 - 1e-9);
    }

    #[test]
    fn zero_scale_models_are_point_masses() {
        let m = ScalarModel::normal(1.0, 0.0).unwrap();
        assert_eq!(m.cdf(0.999), 0.0);
        assert_eq!(m.cdf(1.0), 1.0);

        let u = ScalarModel::uniform(5.0, 5.0).unwrap();
        assert_eq!(u.cdf(4.0), 0.0);
        assert_eq!(u.cdf(5.0), 1.0);
    }

    #[test]
    fn truncated_normal_is_confined_to_bounds() {
        let m = ScalarModel::truncated_normal(0.0, 1.0, -1.0, 1.0).unwrap();
        assert_eq!(m.cdf(-1.5), 0.0);
        assert_eq!(m.cdf(1.0), 1.0);
        assert!((m.cdf(0.0) - 0.5).abs() < 1e-9);
        assert!(m.is_bounded());
        assert!(!ScalarModel::normal(0.0, 1.0).unwrap().is_bounded());
    }

    #[test]
    fn beta_one_one_is_uniform_on_its_support() {
        let b = ScalarModel::bounded_beta(1.0, 1.0, -1.0, 1.0).unwrap();
        let u = ScalarModel::uniform(-1.0, 1.0).unwrap();
        for i in 0..=20 {
            let x = -1.0 + i as f64 * 0.1;
            assert!((b.cdf(x) - u.cdf(x)).abs() < 1e-9, "x={x}");
        }
    }

    #[test]
    fn gamma_cdf_zero_below_origin() {
        let g = ScalarModel::gamma(2.0, 1.5).unwrap();
        assert_eq!(g.cdf(-1.0), 0.0);
        assert!(g.cdf(3.0) > 0.0 && g.cdf(3.0) < 1.0);
    }

    #[test]
    fn infinite_df_student_t_matches_normal() {
        let t = ScalarModel::student_t(f64::INFINITY, 0.5, 2.0).unwrap();
        let n = ScalarModel::normal(0.5, 2.0).unwrap();
        for &x in &[-3.0, -0.5, 0.5, 2.0, 6.0] {
            assert!((t.cdf(x) - n.cdf(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn histogram_cdf_interpolates_within_bins() {
        let e = ScalarModel::empirical(0.0, 2.0, vec![0.0, 0.25, 1.0]).unwrap();
        assert_eq!(e.cdf(0.0), 0.0);
        assert!((e.cdf(0.5) - 0.125).abs() < 1e-12);
        assert!((e.cdf(1.5) - 0.625).abs() < 1e-12);
        assert_eq!(e.cdf(2.0), 1.0);
    }

    #[test]
    fn constructors_reject_bad_parameters() {
        assert!(ScalarModel::normal(f64::NAN, 1.0).is_err());
        assert!(ScalarModel::normal(0.0, -1.0).is_err());
        assert!(ScalarModel::uniform(1.0, 0.0).is_err());
        assert!(ScalarModel::beta(0.0, 1.0).is_err());
        assert!(ScalarModel::gamma(1.0, 0.0).is_err());
        assert!(ScalarModel::student_t(0.0, 0.0, 1.0).is_err());
        assert!(ScalarModel::empirical(0.0, 1.0, vec![0.0, 0.7, 0.5, 1.0]).is_err());
    }

    #[test]
    fn serde_tag_is_model_type() {
        let m = ScalarModel::gamma(2.0, 0.5).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "gamma");
        let back: ScalarModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}
