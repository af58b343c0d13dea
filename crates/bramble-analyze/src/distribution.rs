use bramble_core::DistributionSummary;

/// Minimum sample size for the higher moments to mean anything.
const MIN_SAMPLES: usize = 4;

/// Adjacent values closer than this belong to the same "similar" run.
const SIMILAR_EPSILON: f64 = 10.0;

/// Computes first- and higher-order descriptors of a numeric sample:
/// population mean/std, skewness, excess kurtosis, round-number ratio,
/// longest near-equal run, range, and coefficient of variation.
/// Rounding happens only at the output step.
pub fn analyze(values: &[f64]) -> DistributionSummary {
    if values.len() < MIN_SAMPLES {
        return DistributionSummary::invalid();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let round_number_ratio =
        values.iter().filter(|&&v| v % 10.0 == 0.0).count() as f64 / n;
    let longest_similar_run = longest_similar_run(values);

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    // A perfectly flat sample has no defined higher moments; report it
    // as uniform rather than dividing by zero.
    if std_dev == 0.0 {
        return DistributionSummary {
            valid: true,
            is_uniform: true,
            mean: round2(mean),
            std_dev: 0.0,
            skewness: None,
            kurtosis: None,
            round_number_ratio: round2(round_number_ratio),
            longest_similar_run,
            range: 0.0,
            cv: 0.0,
        };
    }

    let skewness = values
        .iter()
        .map(|&v| ((v - mean) / std_dev).powi(3))
        .sum::<f64>()
        / n;
    let kurtosis = values
        .iter()
        .map(|&v| ((v - mean) / std_dev).powi(4))
        .sum::<f64>()
        / n
        - 3.0;

    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

    DistributionSummary {
        valid: true,
        is_uniform: false,
        mean: round2(mean),
        std_dev: round2(std_dev),
        skewness: Some(round2(skewness)),
        kurtosis: Some(round2(kurtosis)),
        round_number_ratio: round2(round_number_ratio),
        longest_similar_run,
        range: round2(range),
        cv: round2(cv),
    }
}

fn longest_similar_run(values: &[f64]) -> usize {
    let mut longest = 1usize;
    let mut current = 1usize;
    for pair in values.windows(2) {
        if (pair[1] - pair[0]).abs() < SIMILAR_EPSILON {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_samples_are_invalid() {
        assert!(!analyze(&[]).valid);
        assert!(!analyze(&[100.0, 110.0, 120.0]).valid);
    }

    #[test]
    fn identical_values_report_uniform_without_moments() {
        let summary = analyze(&[50.0, 50.0, 50.0, 50.0, 50.0]);
        assert!(summary.valid);
        assert!(summary.is_uniform);
        assert_eq!(summary.mean, 50.0);
        assert_eq!(summary.std_dev, 0.0);
        assert!(summary.skewness.is_none());
        assert!(summary.kurtosis.is_none());
        assert_eq!(summary.cv, 0.0);
        assert_eq!(summary.longest_similar_run, 5);
        assert_eq!(summary.round_number_ratio, 1.0);
    }

    #[test]
    fn symmetric_sample_has_near_zero_skew() {
        let summary = analyze(&[100.0, 120.0, 140.0, 160.0, 180.0]);
        assert!(summary.valid);
        assert!(!summary.is_uniform);
        assert_eq!(summary.mean, 140.0);
        assert_eq!(summary.skewness, Some(0.0));
        assert_eq!(summary.round_number_ratio, 1.0);
        assert_eq!(summary.range, 80.0);
        // std = sqrt(800) ~ 28.28, cv ~ 0.2
        assert_eq!(summary.std_dev, 28.28);
        assert_eq!(summary.cv, 0.2);
    }

    #[test]
    fn round_number_ratio_counts_exact_multiples_of_ten() {
        let summary = analyze(&[100.0, 101.0, 137.0, 210.0]);
        assert_eq!(summary.round_number_ratio, 0.5);
    }

    #[test]
    fn similar_run_resets_on_a_jump() {
        // 100,105,108 run of 3, then a jump, then 300,305 run of 2
        let summary = analyze(&[100.0, 105.0, 108.0, 300.0, 305.0]);
        assert_eq!(summary.longest_similar_run, 3);
    }

    #[test]
    fn analyzer_is_idempotent() {
        let values = [80.0, 95.0, 130.0, 102.0, 88.0, 143.0];
        let a = analyze(&values);
        let b = analyze(&values);
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.skewness, b.skewness);
        assert_eq!(a.kurtosis, b.kurtosis);
        assert_eq!(a.cv, b.cv);
        assert_eq!(a.longest_similar_run, b.longest_similar_run);
    }
}
