//! Fixed-width histogram sparklines.
//!
//! One character per equal-width bin over the finite `[min, max]` of the data,
//! drawn with the eighth-block glyphs (`' '`, `▁` … `█`) scaled to the fullest
//! bin. Output is always exactly `width` characters, which keeps columns
//! aligned in terminal tables.

/// Width used when the caller has no preference.
pub const DEFAULT_SPARKLINE_WIDTH: usize = 12;

const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `values` as a `width`-character histogram.
///
/// Non-finite values are ignored. No finite values gives blanks; a single
/// distinct value gives a flat half-height line.
pub fn render(values: &[f64], width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return BLOCKS[0].to_string().repeat(width);
    }
    if min == max {
        return BLOCKS[4].to_string().repeat(width);
    }

    let mut bins = vec![0usize; width];
    let bin_width = (max - min) / width as f64;
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - min) / bin_width) as usize).min(width - 1);
        bins[idx] += 1;
    }

    let peak = bins.iter().copied().max().unwrap_or(0);
    bins.iter()
        .map(|&count| {
            let level = if peak > 0 { count * 8 / peak } else { 0 };
            BLOCKS[level]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_has_exact_width() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin()).collect();
        for width in [1, 5, DEFAULT_SPARKLINE_WIDTH, 40] {
            assert_eq!(render(&values, width).chars().count(), width);
        }
        assert_eq!(render(&values, 0), "");
    }

    #[test]
    fn flat_and_empty_inputs() {
        assert_eq!(render(&[2.5; 10], 4), "▄▄▄▄");
        assert_eq!(render(&[], 3), "   ");
        assert_eq!(render(&[f64::NAN, f64::INFINITY], 3), "   ");
    }

    #[test]
    fn tallest_bin_is_full_block() {
        // Bins: [0, 1) gets 3 values, [1, 2] gets 1.
        let line = render(&[0.0, 0.2, 0.4, 2.0], 2);
        assert_eq!(line, "█▂");
    }

    #[test]
    fn evenly_spread_values_are_level() {
        let values: Vec<f64> = (0..1200).map(|i| i as f64).collect();
        let line = render(&values, DEFAULT_SPARKLINE_WIDTH);
        assert!(line.chars().all(|c| c == '█'), "{line}");
    }
}
