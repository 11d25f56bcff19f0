//! Projection generator.
//!
//! # Algorithm
//!
//! 1. Validate the requests (ranges, difficulty, duplicates, totals).
//! 2. Normalize each request into its ordered pace codes.
//! 3. Select a strategy by input shape:
//!    uniform pairing when the total equals the minimum and every subject
//!    has the same count; frequency-balanced round-robin otherwise.
//! 4. Frequency-balanced only: smooth weekly loads within each quarter.
//! 5. Flatten the lattice into generated paces.
//!
//! Generation is pure and deterministic: the same requests always give the
//! same projection.

use log::{debug, info, warn};

use super::lattice::{Exclusions, WeekLattice};
use super::{balanced, pairing, smoothing};
use crate::config::{GeneratorConfig, UnplacedPolicy};
use crate::error::GenerationError;
use crate::models::{
    GeneratedPace, GenerationOutcome, NormalizedSubject, PaceSetRequest, PairingRules,
    PlacementMode,
};
use crate::validation::validate_requests;

/// Places requested paces into the school-year calendar.
///
/// # Example
///
/// ```
/// use pace_schedule::models::PaceSetRequest;
/// use pace_schedule::scheduler::ProjectionGenerator;
///
/// let requests = vec![
///     PaceSetRequest::new("math", "Math 7", 1, 36).with_difficulty(5),
///     PaceSetRequest::new("english", "English 7", 1, 36).with_difficulty(1),
/// ];
/// let outcome = ProjectionGenerator::new().generate(&requests).unwrap();
/// assert_eq!(outcome.pace_count(), 72);
/// assert!(outcome.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectionGenerator {
    config: GeneratorConfig,
}

impl ProjectionGenerator {
    /// Creates a generator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with an explicit configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a projection.
    ///
    /// Fails without a partial result on invalid input, on a fatal pairing
    /// conflict, or on unplaced paces under [`UnplacedPolicy::Fail`].
    pub fn generate(
        &self,
        requests: &[PaceSetRequest],
    ) -> Result<GenerationOutcome, GenerationError> {
        validate_requests(requests, &self.config).map_err(GenerationError::Validation)?;

        let subjects: Vec<NormalizedSubject> = requests
            .iter()
            .map(|r| NormalizedSubject::from_request(r, self.config.default_difficulty))
            .collect();
        let rules = PairingRules::from_requests(requests);
        let exclusions = Exclusions::build(&subjects, &rules);
        let mut lattice = WeekLattice::new();

        let mut unplaced = Vec::new();
        let mut relaxed_placements = 0;
        let mode = if pairing::qualifies(&subjects, self.config.min_total_paces) {
            debug!("uniform pairing for {} subjects", subjects.len());
            pairing::place(&mut lattice, &subjects, &exclusions)?;
            PlacementMode::UniformPairing
        } else {
            debug!("frequency-balanced placement for {} subjects", subjects.len());
            let placement = balanced::place(&mut lattice, &subjects, &exclusions);
            unplaced = placement.unplaced;
            relaxed_placements = placement.relaxed;
            if self.config.smoothing {
                let moves = smoothing::smooth(&mut lattice, &subjects, &exclusions);
                debug!("smoothing made {moves} move(s)");
            }
            PlacementMode::FrequencyBalanced
        };

        if !unplaced.is_empty() {
            warn!("{} pace(s) left unplaced", unplaced.len());
            if self.config.unplaced_policy == UnplacedPolicy::Fail {
                return Err(GenerationError::Unplaced(unplaced));
            }
        }

        let paces = lattice.to_generated(&subjects);
        info!(
            "generated {} pace(s) across {} subject(s) ({:?}, {} relaxed)",
            paces.len(),
            subjects.len(),
            mode,
            relaxed_placements
        );

        Ok(GenerationOutcome {
            paces,
            unplaced,
            mode,
            relaxed_placements,
        })
    }
}

/// Generates a projection, treating any unplaced pace as fatal.
///
/// The returned list always holds every normalized pace of every request.
pub fn generate(requests: &[PaceSetRequest]) -> Result<Vec<GeneratedPace>, GenerationError> {
    ProjectionGenerator::with_config(GeneratorConfig::strict())
        .generate(requests)
        .map(|outcome| outcome.paces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PairingRules, WeekPosition, QUARTERS, TOTAL_WEEKS, WEEKS_PER_QUARTER};
    use crate::scheduler::MAX_SUBJECTS_PER_WEEK;
    use crate::validation::{audit_projection, ValidationErrorKind};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    fn two_subjects() -> Vec<PaceSetRequest> {
        vec![
            PaceSetRequest::new("A", "subject-a", 1, 36).with_difficulty(5),
            PaceSetRequest::new("B", "subject-b", 1, 36).with_difficulty(1),
        ]
    }

    fn assert_sequential(paces: &[GeneratedPace]) {
        let mut by_category: BTreeMap<&str, Vec<(u32, WeekPosition)>> = BTreeMap::new();
        for p in paces {
            by_category
                .entry(p.category_id.as_str())
                .or_default()
                .push((p.pace_code.parse().unwrap(), p.position().unwrap()));
        }
        for (category, mut seq) in by_category {
            seq.sort();
            for w in seq.windows(2) {
                assert!(w[0].1 < w[1].1, "{category} out of order: {w:?}");
            }
        }
    }

    /// Audit must pass, except for pairing conflicts the outcome admits to.
    fn assert_audit(outcome: &GenerationOutcome, requests: &[PaceSetRequest]) {
        let rules = PairingRules::from_requests(requests);
        if let Err(errors) = audit_projection(&outcome.paces, &rules) {
            assert!(
                errors
                    .iter()
                    .all(|e| e.kind == ValidationErrorKind::PairingConflict),
                "{errors:?}"
            );
            assert!(outcome.relaxed_placements > 0, "{errors:?}");
        }
    }

    /// True when every quarter's allotted paces fit in 9 weeks × 3 subjects.
    fn quarters_fit(requests: &[PaceSetRequest]) -> bool {
        let allotments: Vec<_> = requests
            .iter()
            .map(|r| balanced::quarter_allotment(r.pace_count()))
            .collect();
        (0..QUARTERS).all(|q| {
            allotments.iter().map(|a| a[q]).sum::<usize>()
                <= WEEKS_PER_QUARTER * MAX_SUBJECTS_PER_WEEK
        })
    }

    #[test]
    fn test_two_subject_uniform_pairing() {
        let outcome = ProjectionGenerator::new().generate(&two_subjects()).unwrap();
        assert_eq!(outcome.mode, PlacementMode::UniformPairing);
        assert_eq!(outcome.pace_count(), 72);
        for idx in 0..TOTAL_WEEKS {
            let week = outcome.paces_in_week(WeekPosition::from_index(idx).unwrap());
            let mut cats: Vec<&str> = week.iter().map(|p| p.category_id.as_str()).collect();
            cats.sort();
            assert_eq!(cats, vec!["A", "B"]);
        }
        assert_sequential(&outcome.paces);
    }

    #[test]
    fn test_uniform_pairing_conflict_is_fatal() {
        let requests = vec![
            PaceSetRequest::new("A", "a", 1, 36).with_not_pair_with(["B"]),
            PaceSetRequest::new("B", "b", 1, 36),
        ];
        let err = ProjectionGenerator::new().generate(&requests).unwrap_err();
        assert!(matches!(err, GenerationError::ConstraintViolation { .. }));
    }

    #[test]
    fn test_underflow_is_fatal() {
        let requests = vec![
            PaceSetRequest::new("A", "a", 1, 36),
            PaceSetRequest::new("B", "b", 1, 35),
        ];
        match generate(&requests) {
            Err(GenerationError::Validation(errors)) => {
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::InsufficientPaces));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert_eq!(generate(&two_subjects()).unwrap().len(), 72);
    }

    #[test]
    fn test_frequency_balanced_mixed_counts() {
        let requests = vec![
            PaceSetRequest::new("math", "m", 1001, 1030).with_difficulty(5),
            PaceSetRequest::new("english", "e", 1, 20).with_skipped([3, 4]),
            PaceSetRequest::new("science", "s", 1, 14).with_not_pair_with(["math"]),
            PaceSetRequest::new("history", "h", 1, 10),
            PaceSetRequest::new("art", "a", 1, 4),
        ];
        let outcome = ProjectionGenerator::new().generate(&requests).unwrap();
        assert_eq!(outcome.mode, PlacementMode::FrequencyBalanced);
        assert!(outcome.is_complete());
        assert_eq!(outcome.pace_count(), 30 + 18 + 14 + 10 + 4);
        assert_sequential(&outcome.paces);

        assert_audit(&outcome, &requests);
    }

    #[test]
    fn test_uneven_counts_place_every_pace() {
        // Q1 shares 6, 8, 1, 1, 2, 4, 4 fit, though not in frequency order.
        let requests: Vec<PaceSetRequest> = [21, 31, 4, 4, 7, 16, 13]
            .iter()
            .enumerate()
            .map(|(i, &n)| PaceSetRequest::new(format!("c{i}"), format!("s{i}"), 1, n))
            .collect();
        let outcome = ProjectionGenerator::new().generate(&requests).unwrap();
        assert!(outcome.is_complete(), "unplaced: {:?}", outcome.unplaced);
        assert_eq!(outcome.pace_count(), 96);
        assert_sequential(&outcome.paces);
        assert_audit(&outcome, &requests);

        assert_eq!(generate(&requests).unwrap().len(), 96);
    }

    #[test]
    fn test_quarter_split_follows_allotment() {
        let requests = vec![
            PaceSetRequest::new("A", "a", 1, 30),
            PaceSetRequest::new("B", "b", 1, 30),
            PaceSetRequest::new("C", "c", 1, 14),
        ];
        let outcome = ProjectionGenerator::new().generate(&requests).unwrap();
        let counts = outcome.quarter_counts();
        // 30 -> 8,8,7,7 ; 14 -> 4,4,3,3
        assert_eq!(counts[&1], 20);
        assert_eq!(counts[&2], 20);
        assert_eq!(counts[&3], 17);
        assert_eq!(counts[&4], 17);

        let a_q1: Vec<&GeneratedPace> = outcome
            .paces_for_category("A")
            .into_iter()
            .filter(|p| p.quarter == 1)
            .collect();
        let codes: Vec<&str> = a_q1.iter().map(|p| p.pace_code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn test_unplaced_policy() {
        let requests = vec![
            PaceSetRequest::new("a", "a", 1, 36),
            PaceSetRequest::new("b", "b", 1, 36),
            PaceSetRequest::new("c", "c", 1, 30),
            PaceSetRequest::new("d", "d", 1, 6),
        ];
        let total = 36 + 36 + 30 + 6;

        // Q1 and Q2 each hold 9 + 9 + 8 + 2 = 28 paces for 27 places.
        assert!(!quarters_fit(&requests));

        let reported = ProjectionGenerator::new().generate(&requests).unwrap();
        assert!(!reported.is_complete());
        assert_eq!(reported.pace_count() + reported.unplaced.len(), total);
        let quarters: Vec<u8> = reported.unplaced.iter().map(|u| u.quarter).collect();
        assert_eq!(quarters, vec![1, 2]);
        assert_sequential(&reported.paces);

        let err = ProjectionGenerator::with_config(GeneratorConfig::strict())
            .generate(&requests)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unplaced(ref u) if u == &reported.unplaced));
        assert!(matches!(generate(&requests), Err(GenerationError::Unplaced(_))));
    }

    #[test]
    fn test_smoothing_toggle_keeps_totals() {
        let requests = vec![
            PaceSetRequest::new("a", "a", 1, 30),
            PaceSetRequest::new("b", "b", 1, 22),
            PaceSetRequest::new("c", "c", 1, 12),
            PaceSetRequest::new("d", "d", 1, 9),
        ];
        let smoothed = ProjectionGenerator::new().generate(&requests).unwrap();
        let raw = ProjectionGenerator::with_config(GeneratorConfig::new().with_smoothing(false))
            .generate(&requests)
            .unwrap();
        assert_eq!(smoothed.pace_count(), raw.pace_count());
        assert_sequential(&smoothed.paces);
        assert_sequential(&raw.paces);
    }

    #[test]
    fn test_deterministic() {
        let requests = vec![
            PaceSetRequest::new("a", "a", 1, 25).with_not_pair_with(["b"]),
            PaceSetRequest::new("b", "b", 1, 21),
            PaceSetRequest::new("c", "c", 1, 17),
            PaceSetRequest::new("d", "d", 1, 13).with_difficulty(2),
        ];
        let first = ProjectionGenerator::new().generate(&requests).unwrap();
        let second = ProjectionGenerator::new().generate(&requests).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_randomized_invariants() {
        let mut rng = SmallRng::seed_from_u64(42);
        let categories = ["math", "english", "science", "history", "spanish", "art"];

        for _ in 0..200 {
            let subject_count = rng.random_range(2..=categories.len());
            let mut requests = Vec::new();
            for cat in &categories[..subject_count] {
                let start = rng.random_range(1..=20);
                let len = rng.random_range(8..=32);
                let mut req = PaceSetRequest::new(*cat, format!("{cat}-subject"), start, start + len)
                    .with_difficulty(rng.random_range(1..=5));
                if rng.random_bool(0.3) {
                    req = req.with_skipped([start + 1]);
                }
                if rng.random_bool(0.2) {
                    let other = categories[rng.random_range(0..subject_count)];
                    if other != *cat {
                        req = req.with_not_pair_with([other]);
                    }
                }
                requests.push(req);
            }
            let total: usize = requests.iter().map(PaceSetRequest::pace_count).sum();

            match ProjectionGenerator::new().generate(&requests) {
                Ok(outcome) => {
                    assert_eq!(outcome.pace_count() + outcome.unplaced.len(), total);
                    assert_sequential(&outcome.paces);
                    assert_audit(&outcome, &requests);
                    if quarters_fit(&requests) {
                        assert!(outcome.is_complete(), "{requests:?}");
                    }
                }
                Err(GenerationError::Validation(_)) => {
                    assert!(!(72..=108).contains(&total));
                }
                Err(GenerationError::ConstraintViolation { .. }) => {
                    assert_eq!(total, 72);
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
