// Simulation results: the sorted per-trial distribution plus summary
// statistics derived from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SimError;

/// Outcome of one simulation run.
///
/// Fields are private and only populated by [`SimulationResult::from_totals`],
/// so every summary value is computed from the stored distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    distribution: Vec<u32>,
    mean: f64,
    median: f64,
    std_dev: f64,
    percentile_5: f64,
    percentile_95: f64,
    thresholds: Vec<(u32, f64)>,
}

impl SimulationResult {
    /// Sort the per-trial totals and compute the summary.
    pub fn from_totals(mut totals: Vec<u32>, thresholds: &[u32]) -> Self {
        totals.sort_unstable();

        let mean = mean(&totals);
        let std_dev = population_std_dev(&totals, mean);
        let median = interpolated_percentile(&totals, 50.0);
        let percentile_5 = interpolated_percentile(&totals, 5.0);
        let percentile_95 = interpolated_percentile(&totals, 95.0);
        let thresholds = thresholds
            .iter()
            .map(|&t| (t, fraction_over(&totals, t)))
            .collect();

        SimulationResult {
            distribution: totals,
            mean,
            median,
            std_dev,
            percentile_5,
            percentile_95,
            thresholds,
        }
    }

    pub fn num_trials(&self) -> usize {
        self.distribution.len()
    }

    /// Per-trial home-run totals in ascending order.
    pub fn distribution(&self) -> &[u32] {
        &self.distribution
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn percentile_5(&self) -> f64 {
        self.percentile_5
    }

    pub fn percentile_95(&self) -> f64 {
        self.percentile_95
    }

    /// `(threshold, P(total > threshold))` for each configured threshold.
    pub fn threshold_probabilities(&self) -> &[(u32, f64)] {
        &self.thresholds
    }

    /// Value at percentile `p` (0..=100), linearly interpolated between the
    /// two closest ranks.
    pub fn percentile(&self, p: f64) -> Result<f64, SimError> {
        if !(0.0..=100.0).contains(&p) {
            return Err(SimError::argument(
                "percentile",
                format!("must be between 0 and 100 inclusive, got {p}"),
            ));
        }
        Ok(interpolated_percentile(&self.distribution, p))
    }

    /// Fraction of trials whose total is strictly greater than `threshold`.
    /// Returns 0.0 for an empty distribution.
    pub fn probability_over(&self, threshold: u32) -> f64 {
        fraction_over(&self.distribution, threshold)
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            mean_hrs: self.mean,
            median_hrs: self.median,
            std_hrs: self.std_dev,
            percentile_5: self.percentile_5,
            percentile_95: self.percentile_95,
            prob_over: self
                .thresholds
                .iter()
                .map(|(t, p)| (format!("prob_over_{t}"), *p))
                .collect(),
        }
    }
}

/// Wire-facing projection of a [`SimulationResult`].
///
/// Threshold probabilities are flattened into `prob_over_<t>` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub mean_hrs: f64,
    pub median_hrs: f64,
    pub std_hrs: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    #[serde(flatten)]
    pub prob_over: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Statistics over a sorted slice
// ---------------------------------------------------------------------------

fn mean(sorted: &[u32]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.iter().map(|&v| v as f64).sum::<f64>() / sorted.len() as f64
}

/// Population standard deviation (N denominator).
fn population_std_dev(sorted: &[u32], mean: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let variance = sorted
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / sorted.len() as f64;
    variance.sqrt()
}

/// Linear interpolation at rank `p/100 * (n - 1)`.
fn interpolated_percentile(sorted: &[u32], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0] as f64,
        n => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let lo_val = sorted[lo] as f64;
            let hi_val = sorted[hi] as f64;
            lo_val + (hi_val - lo_val) * (rank - lo as f64)
        }
    }
}

fn fraction_over(sorted: &[u32], threshold: u32) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    // First index holding a value > threshold.
    let idx = sorted.partition_point(|&v| v <= threshold);
    (sorted.len() - idx) as f64 / sorted.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn distribution_is_sorted() {
        let result = SimulationResult::from_totals(vec![5, 1, 4, 2, 3], &[]);
        assert_eq!(result.distribution(), &[1, 2, 3, 4, 5]);
        assert_eq!(result.num_trials(), 5);
    }

    #[test]
    fn mean_and_population_std_dev() {
        // Mean 5, population variance 4 -> stdev 2
        let result = SimulationResult::from_totals(vec![2, 4, 4, 4, 5, 5, 7, 9], &[]);
        assert!(approx_eq(result.mean(), 5.0, 1e-12));
        assert!(approx_eq(result.std_dev(), 2.0, 1e-12));
    }

    #[test]
    fn median_odd_count_is_middle_value() {
        let result = SimulationResult::from_totals(vec![30, 10, 20], &[]);
        assert!(approx_eq(result.median(), 20.0, 1e-12));
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        let result = SimulationResult::from_totals(vec![10, 20, 30, 41], &[]);
        assert!(approx_eq(result.median(), 25.0, 1e-12));
    }

    #[test]
    fn percentile_interpolates_linearly() {
        // n = 11 values 0..=100 step 10 -> rank p/10, exact hits
        let totals: Vec<u32> = (0..=10).map(|i| i * 10).collect();
        let result = SimulationResult::from_totals(totals, &[]);
        assert!(approx_eq(result.percentile(5.0).unwrap(), 5.0, 1e-9));
        assert!(approx_eq(result.percentile(95.0).unwrap(), 95.0, 1e-9));
        assert!(approx_eq(result.percentile(0.0).unwrap(), 0.0, 1e-12));
        assert!(approx_eq(result.percentile(100.0).unwrap(), 100.0, 1e-12));
    }

    #[test]
    fn stored_percentiles_match_query() {
        let result = SimulationResult::from_totals(vec![31, 44, 28, 52, 39, 47, 35, 40], &[]);
        assert_eq!(result.percentile(5.0).unwrap(), result.percentile_5());
        assert_eq!(result.percentile(95.0).unwrap(), result.percentile_95());
        assert_eq!(result.percentile(50.0).unwrap(), result.median());
    }

    #[test]
    fn percentile_out_of_range_is_invalid_argument() {
        let result = SimulationResult::from_totals(vec![1, 2, 3], &[]);
        for p in [150.0, -1.0, f64::NAN] {
            match result.percentile(p) {
                Err(SimError::InvalidArgument { field, .. }) => assert_eq!(field, "percentile"),
                other => panic!("expected InvalidArgument for {p}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn probability_over_is_strictly_greater() {
        let result = SimulationResult::from_totals(vec![38, 40, 40, 41, 55, 61], &[40, 50, 60]);
        // > 40: 41, 55, 61
        assert!(approx_eq(result.probability_over(40), 0.5, 1e-12));
        assert!(approx_eq(result.probability_over(60), 1.0 / 6.0, 1e-12));
        assert!(approx_eq(result.probability_over(61), 0.0, 1e-12));
        assert_eq!(
            result.threshold_probabilities(),
            &[(40, 0.5), (50, 2.0 / 6.0), (60, 1.0 / 6.0)]
        );
    }

    #[test]
    fn empty_distribution_queries_are_zero() {
        let result = SimulationResult::from_totals(vec![], &[40]);
        assert_eq!(result.probability_over(0), 0.0);
        assert_eq!(result.mean(), 0.0);
        assert_eq!(result.percentile(50.0).unwrap(), 0.0);
    }

    #[test]
    fn single_trial_percentiles_collapse() {
        let result = SimulationResult::from_totals(vec![47], &[]);
        assert_eq!(result.percentile_5(), 47.0);
        assert_eq!(result.percentile_95(), 47.0);
    }

    #[test]
    fn summary_serializes_with_api_field_names() {
        let result = SimulationResult::from_totals(vec![35, 42, 51, 62], &[40, 50, 60]);
        let json = serde_json::to_value(result.summary()).unwrap();
        for key in [
            "mean_hrs",
            "median_hrs",
            "std_hrs",
            "percentile_5",
            "percentile_95",
            "prob_over_40",
            "prob_over_50",
            "prob_over_60",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["prob_over_40"], 0.75);
        assert_eq!(json["prob_over_60"], 0.25);
    }
}
