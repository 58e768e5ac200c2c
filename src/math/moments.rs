//! Per-dimension moment statistics.
//!
//! Two passes over the data:
//!
//! 1. min, max and the running sum (→ mean)
//! 2. central moments `m2`, `m3`, `m4` around that mean
//!
//! giving population variance `m2/n`, skewness `(m3/n)/σ³` and raw kurtosis
//! `(m4/n)/σ⁴`. Two passes avoid the cancellation of the one-pass
//! `E[x²] - E[x]²` form on data with a large offset.
//!
//! Computing one dimension at a time is memory bound. `compute_all` instead
//! sweeps `LANE_WIDTH` adjacent dimensions together: the group is interleaved
//! into `[f64; LANE_WIDTH]` rows once and both passes run over those rows with
//! one accumulator per lane, which the compiler turns into vector adds/mins.
//! Per-lane summation order is the same as the scalar path, so batched and
//! scalar results agree bit for bit.

use std::ops::Range;

use crate::domain::{Dataset, DimensionStatistics};
use crate::error::{ExtractError, Result};

/// Dimensions per batched sweep (eight f64 lanes = one 512-bit register).
pub const LANE_WIDTH: usize = 8;

/// Statistics for one dimension.
pub fn compute(dimension: usize, values: &[f64]) -> Result<DimensionStatistics> {
    if values.is_empty() {
        return Err(ExtractError::invalid(format!(
            "dimension {dimension}: values cannot be empty"
        )));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / values.len() as f64;

    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for &v in values {
        let diff = v - mean;
        let diff2 = diff * diff;
        m2 += diff2;
        m3 += diff2 * diff;
        m4 += diff2 * diff2;
    }

    Ok(finish(dimension, values.len(), min, max, mean, m2, m3, m4))
}

/// `f32` entry point; values are widened to `f64` before accumulation.
pub fn compute_f32(dimension: usize, values: &[f32]) -> Result<DimensionStatistics> {
    let widened: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    compute(dimension, &widened)
}

/// Statistics for every dimension of `dataset`, batched by `LANE_WIDTH`.
pub fn compute_all(dataset: &Dataset) -> Result<Vec<DimensionStatistics>> {
    compute_range(dataset, 0..dataset.num_dimensions())
}

/// Statistics for a contiguous range of dimensions.
///
/// Full groups of `LANE_WIDTH` go through the batched sweep; the trailing
/// `len % LANE_WIDTH` dimensions use [`compute`].
pub fn compute_range(dataset: &Dataset, dims: Range<usize>) -> Result<Vec<DimensionStatistics>> {
    if dims.start > dims.end || dims.end > dataset.num_dimensions() {
        return Err(ExtractError::invalid(format!(
            "dimension range {}..{} out of bounds for {} dimensions",
            dims.start,
            dims.end,
            dataset.num_dimensions()
        )));
    }

    let mut out = Vec::with_capacity(dims.len());
    let full_groups = dims.len() / LANE_WIDTH;

    // One interleave buffer reused across groups.
    let mut lanes = vec![[0.0; LANE_WIDTH]; dataset.num_samples()];
    for group in 0..full_groups {
        let start = dims.start + group * LANE_WIDTH;
        out.extend(compute_lanes(dataset, start, &mut lanes));
    }

    for dim in (dims.start + full_groups * LANE_WIDTH)..dims.end {
        out.push(compute(dim, dataset.dimension(dim))?);
    }

    Ok(out)
}

fn compute_lanes(
    dataset: &Dataset,
    start: usize,
    lanes: &mut [[f64; LANE_WIDTH]],
) -> [DimensionStatistics; LANE_WIDTH] {
    let columns: [&[f64]; LANE_WIDTH] = std::array::from_fn(|l| dataset.dimension(start + l));
    for (i, row) in lanes.iter_mut().enumerate() {
        for (l, slot) in row.iter_mut().enumerate() {
            *slot = columns[l][i];
        }
    }

    let mut min = [f64::INFINITY; LANE_WIDTH];
    let mut max = [f64::NEG_INFINITY; LANE_WIDTH];
    let mut sum = [0.0; LANE_WIDTH];
    for row in lanes.iter() {
        for l in 0..LANE_WIDTH {
            min[l] = min[l].min(row[l]);
            max[l] = max[l].max(row[l]);
            sum[l] += row[l];
        }
    }

    let n = lanes.len();
    let mean: [f64; LANE_WIDTH] = std::array::from_fn(|l| sum[l] / n as f64);

    let mut m2 = [0.0; LANE_WIDTH];
    let mut m3 = [0.0; LANE_WIDTH];
    let mut m4 = [0.0; LANE_WIDTH];
    for row in lanes.iter() {
        for l in 0..LANE_WIDTH {
            let diff = row[l] - mean[l];
            let diff2 = diff * diff;
            m2[l] += diff2;
            m3[l] += diff2 * diff;
            m4[l] += diff2 * diff2;
        }
    }

    std::array::from_fn(|l| finish(start + l, n, min[l], max[l], mean[l], m2[l], m3[l], m4[l]))
}

#[allow(clippy::too_many_arguments)]
fn finish(
    dimension: usize,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
) -> DimensionStatistics {
    let n = count as f64;

    // `sum / n` can round just outside the observed range (e.g. ten copies of
    // 0.3). NaN means pass through untouched.
    let mean = if mean < min {
        min
    } else if mean > max {
        max
    } else {
        mean
    };

    // Constant data has exactly zero spread; the rounding residue left in
    // `m2` must not leak into the shape moments. Define it as normal-like.
    let variance = if min == max { 0.0 } else { m2 / n };
    let std_dev = variance.sqrt();
    let (skewness, kurtosis) = if std_dev > 0.0 {
        ((m3 / n) / (std_dev * std_dev * std_dev), (m4 / n) / (variance * variance))
    } else {
        (0.0, 3.0)
    };

    DimensionStatistics::new(dimension, count, min, max, mean, variance, skewness, kurtosis)
}
