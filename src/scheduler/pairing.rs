//! Uniform difficulty pairing.
//!
//! # Algorithm
//!
//! Used when the total equals the minimum and every subject has the same
//! number of paces `P`.
//!
//! 1. Sort subjects by difficulty, hardest first.
//! 2. Pair the hardest remaining subject with the easiest remaining one.
//! 3. For pace index `i` in `0..P`, give each pair the next week of a
//!    cursor rotating over all 36 weeks; both subjects of the pair share it.
//!
//! With an even subject count the pairs use exactly `total / 2` weeks, so
//! the cursor never wraps and every pair advances strictly week by week.
//! Pairing conflicts are fatal here; this mode has no backoff.

use log::debug;

use super::lattice::{Exclusions, PlacedPace, WeekLattice};
use crate::error::GenerationError;
use crate::models::{NormalizedSubject, TOTAL_WEEKS};

/// Message carried by a pairing that joins excluded categories.
pub const PAIRING_CONFLICT_MESSAGE: &str =
    "Invalid difficulty pairing due to notPairWith constraint";

/// Whether the input shape selects uniform pairing.
pub(crate) fn qualifies(subjects: &[NormalizedSubject], min_total_paces: usize) -> bool {
    let Some(first) = subjects.first() else {
        return false;
    };
    let per_subject = first.pace_count();
    let total: usize = subjects.iter().map(NormalizedSubject::pace_count).sum();

    per_subject > 0
        && total == min_total_paces
        && subjects.len() % 2 == 0
        && total / 2 <= TOTAL_WEEKS
        && subjects.iter().all(|s| s.pace_count() == per_subject)
}

/// Hard/easy pairs as subject indices, hardest pair first.
pub(crate) fn difficulty_pairs(
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
) -> Result<Vec<(usize, usize)>, GenerationError> {
    let mut order: Vec<usize> = (0..subjects.len()).collect();
    order.sort_by(|&a, &b| subjects[b].difficulty.cmp(&subjects[a].difficulty));

    let mut pairs = Vec::with_capacity(order.len() / 2);
    let (mut lo, mut hi) = (0, order.len());
    while lo + 1 < hi {
        let (hard, easy) = (order[lo], order[hi - 1]);
        if exclusions.conflicts(hard, easy) {
            return Err(GenerationError::ConstraintViolation {
                message: PAIRING_CONFLICT_MESSAGE.to_string(),
                first: subjects[hard].category_id.clone(),
                second: subjects[easy].category_id.clone(),
            });
        }
        debug!(
            "paired '{}' (difficulty {}) with '{}' (difficulty {})",
            subjects[hard].category_id,
            subjects[hard].difficulty,
            subjects[easy].category_id,
            subjects[easy].difficulty
        );
        pairs.push((hard, easy));
        lo += 1;
        hi -= 1;
    }
    Ok(pairs)
}

/// Places every pace by difficulty pairs.
pub(crate) fn place(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
) -> Result<(), GenerationError> {
    let pairs = difficulty_pairs(subjects, exclusions)?;
    let per_subject = subjects.first().map_or(0, NormalizedSubject::pace_count);

    let mut cursor = 0usize;
    for pace in 0..per_subject {
        for &(hard, easy) in &pairs {
            let week = cursor % TOTAL_WEEKS;
            lattice.place(week, PlacedPace { subject: hard, pace });
            lattice.place(week, PlacedPace { subject: easy, pace });
            cursor += 1;
        }
    }
    Ok(())
}
