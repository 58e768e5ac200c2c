//! Formatted terminal output.
//!
//! Formatting lives here so the fitting code stays free of presentation and
//! output changes stay localized. All output is deterministic for a given
//! input (useful for golden tests).

use crate::domain::{DimensionStatistics, ExtractionResult};
use crate::report::RankedFit;

/// Ranked candidate table for one dimension; the selected row starts with `*`.
pub fn format_fit_summary(stats: &DimensionStatistics, ranked: &[RankedFit]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{stats}\n"));
    out.push_str(
        format!(
            "  {:>4} {:<10} {:>12} {:>12}  {}\n",
            "rank", "model", "gof", "penalized", "params"
        )
        .trim_end(),
    );
    out.push('\n');

    for r in ranked {
        let marker = if r.selected { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:>4} {:<10} {:>12.6} {:>12.6}  {}\n",
            r.rank,
            r.model_type.as_str(),
            r.goodness_of_fit,
            r.penalized_score,
            r.model
        ));
    }

    out
}

/// One line per dimension: selected model, score, and sparkline when collected.
pub fn format_extraction_summary(result: &ExtractionResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Extracted {} dimensions in {:.1} ms\n",
        result.num_dimensions(),
        result.elapsed().as_secs_f64() * 1000.0
    ));

    let all = result.all_fits();
    for (stats, best) in result.statistics().iter().zip(result.best_fits()) {
        let d = stats.dimension();
        let spark = all.and_then(|a| a.sparkline(d)).unwrap_or("");
        out.push_str(
            format!(
                "{:>6} {:<10} {:>10.6} {spark} {}\n",
                d,
                best.model_type.as_str(),
                best.goodness_of_fit,
                best.model
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitResult;
    use crate::models::ScalarModel;
    use crate::report::rank_fits;
    use std::time::Duration;

    fn stats() -> DimensionStatistics {
        DimensionStatistics::new(0, 10, 0.0, 1.0, 0.5, 1.0 / 12.0, 0.0, 1.8)
    }

    #[test]
    fn summary_lists_every_candidate_once() {
        let results = vec![
            FitResult::new(ScalarModel::normal(0.5, 0.29).unwrap(), 0.08),
            FitResult::new(ScalarModel::uniform(0.0, 1.0).unwrap(), 0.01),
        ];
        let ranked = rank_fits(&results, |r| r.goodness_of_fit, Some(1));
        let text = format_fit_summary(&stats(), &ranked);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("dim=0"));
        assert!(lines[2].starts_with("*    1 uniform"), "{text}");
        assert!(lines[3].starts_with("     2 normal"), "{text}");
    }

    #[test]
    fn summary_is_deterministic() {
        let results = vec![FitResult::new(ScalarModel::uniform(0.0, 1.0).unwrap(), 0.01)];
        let ranked = rank_fits(&results, |r| r.goodness_of_fit, Some(0));
        assert_eq!(
            format_fit_summary(&stats(), &ranked),
            format_fit_summary(&stats(), &ranked)
        );
    }

    #[test]
    fn extraction_summary_has_a_line_per_dimension() {
        let result = ExtractionResult::new(
            vec![stats()],
            vec![FitResult::new(ScalarModel::uniform(0.0, 1.0).unwrap(), 0.01)],
            None,
            Duration::from_millis(3),
        )
        .unwrap();
        let text = format_extraction_summary(&result);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("uniform"));
    }
}
