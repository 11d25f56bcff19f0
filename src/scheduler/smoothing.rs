//! Post-placement load smoothing.
//!
//! Within each quarter, weeks holding at most one pace are sparse and weeks
//! holding three are dense. Paces move one at a time from the latest dense
//! week to the earliest sparse week that accepts them, until no move is
//! possible. A move must keep its category in sequential order and respect
//! capacity, category exclusivity and pairing exclusions.
//!
//! Every move lowers the quarter's sum of squared week loads, so the loop
//! reaches a fixed point.

use log::debug;

use super::lattice::{Exclusions, PlacedPace, WeekLattice};
use crate::models::{quarter_weeks, NormalizedSubject, Quarter, WeekPosition, WEEKS_PER_QUARTER};
use crate::ordering::{check_placement, OrderedPlacement};

const SPARSE_MAX: usize = 1;
const DENSE_MIN: usize = 3;

/// Smooths every quarter; returns the number of moves made.
pub(crate) fn smooth(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
) -> usize {
    Quarter::ALL
        .into_iter()
        .map(|q| smooth_quarter(lattice, subjects, exclusions, q))
        .sum()
}

fn smooth_quarter(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
    quarter: Quarter,
) -> usize {
    let mut moves = 0;
    while let Some((from, to, placed)) = find_move(lattice, subjects, exclusions, quarter) {
        lattice.remove(from, placed.subject);
        lattice.place(to, placed);
        debug!(
            "{quarter}: moved '{}' pace {} from week {} to week {}",
            subjects[placed.subject].category_id,
            subjects[placed.subject].paces[placed.pace].code,
            from % WEEKS_PER_QUARTER + 1,
            to % WEEKS_PER_QUARTER + 1
        );
        moves += 1;
    }
    moves
}

fn find_move(
    lattice: &WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
    quarter: Quarter,
) -> Option<(usize, usize, PlacedPace)> {
    let weeks = quarter_weeks(quarter);
    let dense: Vec<usize> = weeks
        .clone()
        .rev()
        .filter(|&w| lattice.slot(w).load() >= DENSE_MIN)
        .collect();
    let sparse: Vec<usize> = weeks
        .filter(|&w| lattice.slot(w).load() <= SPARSE_MAX)
        .collect();

    for &from in &dense {
        for &to in &sparse {
            for &placed in lattice.slot(from).paces() {
                if lattice.can_place(to, placed.subject, exclusions)
                    && keeps_order(lattice, subjects, placed, to)
                {
                    return Some((from, to, placed));
                }
            }
        }
    }
    None
}

/// Simulates `placed` at week `to` against the rest of its category.
fn keeps_order(
    lattice: &WeekLattice,
    subjects: &[NormalizedSubject],
    placed: PlacedPace,
    to: usize,
) -> bool {
    let paces = &subjects[placed.subject].paces;
    let others: Vec<OrderedPlacement> = lattice
        .placements_of(placed.subject)
        .into_iter()
        .filter(|&(_, pace)| pace != placed.pace)
        .filter_map(|(week, pace)| {
            Some(OrderedPlacement::new(
                paces[pace].order_index,
                WeekPosition::from_index(week)?,
            ))
        })
        .collect();
    let Some(target) = WeekPosition::from_index(to) else {
        return false;
    };
    check_placement(
        &others,
        &OrderedPlacement::new(paces[placed.pace].order_index, target),
    )
    .is_ok()
}
