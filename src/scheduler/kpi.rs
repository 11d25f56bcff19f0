//! Projection load metrics.
//!
//! Summarizes how evenly a generated projection spreads work across the
//! calendar.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Quarter totals | Paces per quarter |
//! | Max/Min weekly load | Most/fewest paces in any week |
//! | Empty weeks | Weeks with no pace |
//! | Sparse / dense weeks | Weeks with ≤1 / ≥3 paces |
//! | Load std. dev. | Spread of weekly loads around the mean |

use crate::models::{GenerationOutcome, QUARTERS, TOTAL_WEEKS, WEEKS_PER_QUARTER};

/// Weekly load indicators for a generated projection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Paces per quarter (index 0 = Q1).
    pub quarter_totals: [usize; QUARTERS],
    /// Largest weekly load.
    pub max_week_load: usize,
    /// Smallest weekly load.
    pub min_week_load: usize,
    /// Weeks with no paces.
    pub empty_weeks: usize,
    /// Weeks with at most one pace.
    pub sparse_weeks: usize,
    /// Weeks with three paces.
    pub dense_weeks: usize,
    /// Mean paces per week.
    pub mean_week_load: f64,
    /// Population standard deviation of weekly loads.
    pub load_std_dev: f64,
    /// Paces the generator could not place.
    pub unplaced: usize,
}

impl LoadReport {
    /// Computes load indicators from a generation outcome.
    pub fn calculate(outcome: &GenerationOutcome) -> Self {
        let loads = outcome.week_loads();

        let mut quarter_totals = [0; QUARTERS];
        for (week, load) in loads.iter().enumerate() {
            quarter_totals[week / WEEKS_PER_QUARTER] += load;
        }

        let total: usize = loads.iter().sum();
        let mean = total as f64 / TOTAL_WEEKS as f64;
        let variance = loads
            .iter()
            .map(|&l| {
                let d = l as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / TOTAL_WEEKS as f64;

        Self {
            quarter_totals,
            max_week_load: loads.iter().copied().max().unwrap_or(0),
            min_week_load: loads.iter().copied().min().unwrap_or(0),
            empty_weeks: loads.iter().filter(|&&l| l == 0).count(),
            sparse_weeks: loads.iter().filter(|&&l| l <= 1).count(),
            dense_weeks: loads.iter().filter(|&&l| l >= 3).count(),
            mean_week_load: mean,
            load_std_dev: variance.sqrt(),
            unplaced: outcome.unplaced.len(),
        }
    }

    /// Whether every quarter carries the same number of paces.
    pub fn is_quarter_balanced(&self) -> bool {
        self.quarter_totals.windows(2).all(|w| w[0] == w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedPace, PlacementMode, WeekPosition};

    fn outcome_with(positions: &[usize]) -> GenerationOutcome {
        GenerationOutcome {
            paces: positions
                .iter()
                .enumerate()
                .map(|(i, &idx)| {
                    GeneratedPace::new(
                        format!("c{i}"),
                        "s",
                        "1",
                        WeekPosition::from_index(idx).unwrap(),
                    )
                })
                .collect(),
            unplaced: Vec::new(),
            mode: PlacementMode::FrequencyBalanced,
            relaxed_placements: 0,
        }
    }

    #[test]
    fn test_uniform_load() {
        let positions: Vec<usize> = (0..TOTAL_WEEKS).flat_map(|w| [w, w]).collect();
        let report = LoadReport::calculate(&outcome_with(&positions));
        assert_eq!(report.quarter_totals, [18, 18, 18, 18]);
        assert_eq!(report.max_week_load, 2);
        assert_eq!(report.min_week_load, 2);
        assert_eq!(report.empty_weeks, 0);
        assert!((report.mean_week_load - 2.0).abs() < 1e-10);
        assert!(report.load_std_dev.abs() < 1e-10);
        assert!(report.is_quarter_balanced());
    }

    #[test]
    fn test_skewed_load() {
        let report = LoadReport::calculate(&outcome_with(&[0, 0, 0, 1, 27]));
        assert_eq!(report.quarter_totals, [4, 0, 0, 1]);
        assert_eq!(report.max_week_load, 3);
        assert_eq!(report.dense_weeks, 1);
        assert_eq!(report.empty_weeks, 33);
        assert_eq!(report.sparse_weeks, 35);
        assert!(!report.is_quarter_balanced());
    }

    #[test]
    fn test_empty_outcome() {
        let report = LoadReport::calculate(&outcome_with(&[]));
        assert_eq!(report.max_week_load, 0);
        assert_eq!(report.empty_weeks, TOTAL_WEEKS);
        assert_eq!(report.mean_week_load, 0.0);
    }
}
