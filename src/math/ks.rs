//! Kolmogorov–Smirnov distance between a sample and a model CDF.
//!
//! `D = sup |F_n(x) - F(x)|`, evaluated on both sides of every step of the
//! empirical CDF:
//!
//! ```text
//! D = max_i max( (i+1)/n - F(x_i), F(x_i) - i/n )
//! ```
//!
//! Requires the sample sorted ascending.

/// Sorted copy of `values` (total order, NaN last).
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// KS statistic of `sorted` against `cdf`.
///
/// Returns `0.0` for an empty sample. CDF values are clamped into `[0, 1]`
/// and a non-finite CDF value counts as the worst possible distance.
pub fn ks_statistic(sorted: &[f64], cdf: impl Fn(f64) -> f64) -> f64 {
    let n = sorted.len() as f64;
    let mut d: f64 = 0.0;
    for (i, &x) in sorted.iter().enumerate() {
        let f = cdf(x);
        if !f.is_finite() {
            return 1.0;
        }
        let f = f.clamp(0.0, 1.0);
        let above = (i as f64 + 1.0) / n - f;
        let below = f - i as f64 / n;
        d = d.max(above).max(below);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_grid_distance_is_half_step() {
        // Midpoints (i + 0.5)/n against U(0,1) give D = 1/(2n).
        let n = 100;
        let sorted: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();
        let d = ks_statistic(&sorted, |x| x.clamp(0.0, 1.0));
        assert!((d - 0.5 / n as f64).abs() < 1e-12, "d={d}");
    }

    #[test]
    fn disjoint_support_is_maximal() {
        let sorted = vec![10.0, 11.0, 12.0];
        let d = ks_statistic(&sorted, |x| if x < 0.0 { 0.0 } else { 1.0 });
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sorted_copy_orders_ascending() {
        let s = sorted_copy(&[3.0, -1.0, 2.0]);
        assert_eq!(s, vec![-1.0, 2.0, 3.0]);
    }
}
