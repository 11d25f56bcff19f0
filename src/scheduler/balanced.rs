//! Frequency-balanced round-robin placement.
//!
//! # Algorithm
//!
//! Each quarter is an independent pass over its 9 weeks.
//!
//! 1. A subject with `T` paces gets `T / 4` paces per quarter, plus one in
//!    each of the first `T % 4` quarters, consumed in catalog order.
//! 2. Its weekly frequency in a quarter with `n` paces is `round(9 / n)`.
//! 3. Subjects with more than 3 paces in the quarter rank first (count
//!    desc, then yearly total desc); the rest continue the ranking. A
//!    subject's rank is its week offset (mod 9).
//! 4. Subjects are placed one after another in rank order. The k-th pace
//!    of a subject targets week `offset + k * frequency`, clamped to the
//!    window that keeps it after the subject's previous pace and leaves
//!    room for the ones after it.
//!
//! # Backoff ladder
//! 1. Nearest free week in the window, forward from the target, then back.
//! 2. Same scan ignoring pairing exclusions.
//! 3. Give up: the pace is reported unplaced and the cursor moves on.
//!
//! # Capacity packing
//!
//! When the ladder leaves a quarter incomplete, the quarter is redone by
//! packing: each subject in turn takes the weeks with the most room left,
//! preferring weeks without pairing conflicts and close to its frequency
//! targets, and its paces fill them in order. Taking the roomiest weeks
//! keeps room across weeks within one of each other, so a quarter with at
//! most 27 paces always fills. The result with fewer unplaced paces wins.

use std::cmp::Reverse;

use log::{debug, warn};

use super::lattice::{Exclusions, PlacedPace, WeekLattice, MAX_SUBJECTS_PER_WEEK};
use crate::models::{
    quarter_weeks, NormalizedSubject, Quarter, UnplacedPace, QUARTERS, WEEKS_PER_QUARTER,
};

/// Subjects with more in-quarter paces than this are ranked first.
const FREQUENT_THRESHOLD: usize = 3;

/// Result of a frequency-balanced pass over the whole year.
#[derive(Debug, Default)]
pub(crate) struct BalancedPlacement {
    pub unplaced: Vec<UnplacedPace>,
    pub relaxed: usize,
}

/// Paces of a `total`-pace subject allotted to each quarter.
pub(crate) fn quarter_allotment(total: usize) -> [usize; QUARTERS] {
    let base = total / QUARTERS;
    let extra = total % QUARTERS;
    std::array::from_fn(|q| base + usize::from(q < extra))
}

/// Target weekly spacing for `n` paces in a quarter (0 when `n == 0`).
pub(crate) fn frequency(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (WEEKS_PER_QUARTER as f64 / n as f64).round() as usize
}

/// One subject's work inside a quarter.
#[derive(Debug, Clone)]
struct QuarterEntry {
    subject: usize,
    /// First pace index of this quarter's share.
    first_pace: usize,
    count: usize,
    frequency: usize,
    offset: usize,
    /// Local week (0..9) of the last placed pace.
    last_week: Option<usize>,
}

/// Places every subject's paces, quarter by quarter.
pub(crate) fn place(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
) -> BalancedPlacement {
    let allotments: Vec<[usize; QUARTERS]> = subjects
        .iter()
        .map(|s| quarter_allotment(s.pace_count()))
        .collect();

    let mut result = BalancedPlacement::default();
    for quarter in Quarter::ALL {
        let entries = quarter_entries(subjects, &allotments, quarter);

        let mut laddered = lattice.clone();
        let mut ladder = BalancedPlacement::default();
        place_quarter(
            &mut laddered,
            subjects,
            exclusions,
            quarter,
            &mut entries.clone(),
            &mut ladder,
        );

        let (chosen, placement) = if ladder.unplaced.is_empty() {
            (laddered, ladder)
        } else {
            let mut packed = lattice.clone();
            let mut packing = BalancedPlacement::default();
            pack_quarter(&mut packed, subjects, exclusions, quarter, &entries, &mut packing);
            debug!(
                "{quarter}: ladder left {} pace(s), packing left {}",
                ladder.unplaced.len(),
                packing.unplaced.len()
            );
            if packing.unplaced.len() < ladder.unplaced.len() {
                (packed, packing)
            } else {
                (laddered, ladder)
            }
        };

        for u in &placement.unplaced {
            warn!("{quarter}: no week left for '{}' pace {}", u.category_id, u.pace_code);
        }
        *lattice = chosen;
        result.relaxed += placement.relaxed;
        result.unplaced.extend(placement.unplaced);
    }
    result
}

fn quarter_entries(
    subjects: &[NormalizedSubject],
    allotments: &[[usize; QUARTERS]],
    quarter: Quarter,
) -> Vec<QuarterEntry> {
    let q = quarter.index();
    let mut entries: Vec<QuarterEntry> = allotments
        .iter()
        .enumerate()
        .filter(|(_, a)| a[q] > 0)
        .map(|(subject, a)| QuarterEntry {
            subject,
            first_pace: a[..q].iter().sum(),
            count: a[q],
            frequency: frequency(a[q]),
            offset: 0,
            last_week: None,
        })
        .collect();

    // Frequent subjects first; stable sort keeps input order on full ties.
    entries.sort_by(|a, b| {
        let a_frequent = a.count > FREQUENT_THRESHOLD;
        let b_frequent = b.count > FREQUENT_THRESHOLD;
        b_frequent
            .cmp(&a_frequent)
            .then(b.count.cmp(&a.count))
            .then(subjects[b.subject].pace_count().cmp(&subjects[a.subject].pace_count()))
    });
    for (rank, entry) in entries.iter_mut().enumerate() {
        entry.offset = rank % WEEKS_PER_QUARTER;
    }
    entries
}

fn place_quarter(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
    quarter: Quarter,
    entries: &mut [QuarterEntry],
    result: &mut BalancedPlacement,
) {
    let base = quarter_weeks(quarter).start;

    for entry in entries.iter_mut() {
        let subject = &subjects[entry.subject];
        for k in 0..entry.count {
            let remaining_after = entry.count - k - 1;
            let lo = entry.last_week.map_or(0, |w| w + 1);
            let hi = (WEEKS_PER_QUARTER - 1 - remaining_after).max(lo);
            let target = (entry.offset + k * entry.frequency).clamp(lo, hi);
            let pace = entry.first_pace + k;

            let candidates: Vec<usize> = (target..=hi).chain((lo..target).rev()).collect();
            let strict = candidates
                .iter()
                .copied()
                .find(|&w| lattice.can_place(base + w, entry.subject, exclusions));
            let chosen = strict.or_else(|| {
                let relaxed = candidates
                    .iter()
                    .copied()
                    .find(|&w| lattice.can_place_relaxed(base + w, entry.subject));
                if let Some(w) = relaxed {
                    debug!(
                        "{quarter}: relaxed pairing to place '{}' pace {} in week {}",
                        subject.category_id,
                        subject.paces[pace].code,
                        w + 1
                    );
                    result.relaxed += 1;
                }
                relaxed
            });

            match chosen {
                Some(w) => {
                    lattice.place(
                        base + w,
                        PlacedPace {
                            subject: entry.subject,
                            pace,
                        },
                    );
                    entry.last_week = Some(w);
                }
                None => {
                    result.unplaced.push(UnplacedPace {
                        category_id: subject.category_id.clone(),
                        subject_id: subject.subject_id.clone(),
                        pace_code: subject.paces[pace].code.clone(),
                        quarter: quarter.number(),
                    });
                }
            }
        }
    }
}

/// Capacity packing of one quarter; see the module docs.
fn pack_quarter(
    lattice: &mut WeekLattice,
    subjects: &[NormalizedSubject],
    exclusions: &Exclusions,
    quarter: Quarter,
    entries: &[QuarterEntry],
    result: &mut BalancedPlacement,
) {
    let base = quarter_weeks(quarter).start;

    for entry in entries {
        let subject = &subjects[entry.subject];
        let targets: Vec<usize> = (0..entry.count)
            .map(|k| (entry.offset + k * entry.frequency).min(WEEKS_PER_QUARTER - 1))
            .collect();

        let mut weeks: Vec<usize> = (0..WEEKS_PER_QUARTER)
            .filter(|&w| lattice.can_place_relaxed(base + w, entry.subject))
            .collect();
        weeks.sort_by_key(|&w| {
            let room = MAX_SUBJECTS_PER_WEEK - lattice.slot(base + w).occupant_count();
            let conflict = !lattice.can_place(base + w, entry.subject, exclusions);
            let distance = targets.iter().map(|&t| t.abs_diff(w)).min().unwrap_or(0);
            (Reverse(room), conflict, distance, w)
        });
        weeks.truncate(entry.count);
        weeks.sort_unstable();

        for (k, &w) in weeks.iter().enumerate() {
            let pace = entry.first_pace + k;
            if !lattice.can_place(base + w, entry.subject, exclusions) {
                debug!(
                    "{quarter}: relaxed pairing to pack '{}' pace {} in week {}",
                    subject.category_id,
                    subject.paces[pace].code,
                    w + 1
                );
                result.relaxed += 1;
            }
            lattice.place(
                base + w,
                PlacedPace {
                    subject: entry.subject,
                    pace,
                },
            );
        }
        for pace in entry.first_pace + weeks.len()..entry.first_pace + entry.count {
            result.unplaced.push(UnplacedPace {
                category_id: subject.category_id.clone(),
                subject_id: subject.subject_id.clone(),
                pace_code: subject.paces[pace].code.clone(),
                quarter: quarter.number(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaceSetRequest, PairingRules, DEFAULT_DIFFICULTY};

    fn normalize(requests: &[PaceSetRequest]) -> Vec<NormalizedSubject> {
        requests
            .iter()
            .map(|r| NormalizedSubject::from_request(r, DEFAULT_DIFFICULTY))
            .collect()
    }

    #[test]
    fn test_quarter_allotment() {
        assert_eq!(quarter_allotment(36), [9, 9, 9, 9]);
        assert_eq!(quarter_allotment(14), [4, 4, 3, 3]);
        assert_eq!(quarter_allotment(3), [1, 1, 1, 0]);
        assert_eq!(quarter_allotment(0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_frequency() {
        assert_eq!(frequency(0), 0);
        assert_eq!(frequency(1), 9);
        assert_eq!(frequency(2), 5); // 4.5 rounds up
        assert_eq!(frequency(3), 3);
        assert_eq!(frequency(4), 2);
        assert_eq!(frequency(9), 1);
    }

    #[test]
    fn test_ranking_puts_frequent_subjects_first() {
        let subjects = normalize(&[
            PaceSetRequest::new("light", "l", 1, 8),
            PaceSetRequest::new("heavy", "h", 1, 36),
            PaceSetRequest::new("medium", "m", 1, 20),
        ]);
        let allotments: Vec<_> = subjects
            .iter()
            .map(|s| quarter_allotment(s.pace_count()))
            .collect();
        let entries = quarter_entries(&subjects, &allotments, Quarter::Q1);
        let order: Vec<usize> = entries.iter().map(|e| e.subject).collect();
        assert_eq!(order, vec![1, 2, 0]);
        let offsets: Vec<usize> = entries.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);

        let q3 = quarter_entries(&subjects, &allotments, Quarter::Q3);
        assert_eq!(q3[2].first_pace, 4); // light: 2 + 2 paces before Q3
    }

    #[test]
    fn test_full_subject_takes_every_week() {
        let subjects = normalize(&[
            PaceSetRequest::new("a", "a", 1, 36),
            PaceSetRequest::new("b", "b", 1, 36),
        ]);
        let excl = Exclusions::build(&subjects, &PairingRules::new());
        let mut lattice = WeekLattice::new();
        let result = place(&mut lattice, &subjects, &excl);

        assert!(result.unplaced.is_empty());
        assert_eq!(lattice.pace_count(), 72);
        let weeks: Vec<usize> = lattice.placements_of(1).iter().map(|p| p.0).collect();
        assert_eq!(weeks, (0..36).collect::<Vec<_>>());
    }

    #[test]
    fn test_exclusion_respected_when_room_exists() {
        let subjects = normalize(&[
            PaceSetRequest::new("math", "m", 1, 16),
            PaceSetRequest::new("science", "s", 1, 16),
            PaceSetRequest::new("english", "e", 1, 16),
        ]);
        let rules = PairingRules::new().with_exclusion("math", "science");
        let excl = Exclusions::build(&subjects, &rules);
        let mut lattice = WeekLattice::new();
        let result = place(&mut lattice, &subjects, &excl);

        assert!(result.unplaced.is_empty());
        assert_eq!(result.relaxed, 0);
        for slot in lattice.slots() {
            assert!(!(slot.contains(0) && slot.contains(1)));
        }
    }

    #[test]
    fn test_relaxation_when_exclusion_cannot_hold() {
        // Both need all 9 weeks of every quarter: sharing is unavoidable.
        let subjects = normalize(&[
            PaceSetRequest::new("math", "m", 1, 36),
            PaceSetRequest::new("science", "s", 1, 36),
        ]);
        let rules = PairingRules::new().with_exclusion("math", "science");
        let excl = Exclusions::build(&subjects, &rules);
        let mut lattice = WeekLattice::new();
        let result = place(&mut lattice, &subjects, &excl);

        assert!(result.unplaced.is_empty());
        assert_eq!(result.relaxed, 36);
    }

    #[test]
    fn test_unplaced_when_weeks_are_full() {
        // Three full subjects saturate every week; the fourth has no room.
        let subjects = normalize(&[
            PaceSetRequest::new("a", "a", 1, 36),
            PaceSetRequest::new("b", "b", 1, 36),
            PaceSetRequest::new("c", "c", 1, 36),
            PaceSetRequest::new("d", "d", 1, 4),
        ]);
        let excl = Exclusions::build(&subjects, &PairingRules::new());
        let mut lattice = WeekLattice::new();
        let result = place(&mut lattice, &subjects, &excl);

        assert_eq!(result.unplaced.len(), 4);
        assert!(result.unplaced.iter().all(|u| u.category_id == "d"));
        let quarters: Vec<u8> = result.unplaced.iter().map(|u| u.quarter).collect();
        assert_eq!(quarters, vec![1, 2, 3, 4]);
        assert_eq!(result.unplaced[0].pace_code, "1");
        assert_eq!(lattice.pace_count(), 108);
    }

    /// Checks counts, catalog order and weekly capacity of a finished lattice.
    fn assert_well_formed(lattice: &WeekLattice, subjects: &[NormalizedSubject]) {
        for (s, subject) in subjects.iter().enumerate() {
            let placements = lattice.placements_of(s);
            assert!(placements.len() <= subject.pace_count());
            for pair in placements.windows(2) {
                assert!(pair[0].0 < pair[1].0, "weeks must increase");
                assert!(pair[0].1 < pair[1].1, "paces must stay in order");
            }
        }
        for slot in lattice.slots() {
            assert!(slot.occupant_count() <= MAX_SUBJECTS_PER_WEEK);
        }
    }

    #[test]
    fn test_ladder_shortfall_is_packed() {
        // Q1 shares are 6, 8, 1, 1, 2, 4, 4: the ladder strands one pace.
        let counts = [21, 31, 4, 4, 7, 16, 13];
        let requests: Vec<PaceSetRequest> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| PaceSetRequest::new(format!("c{i}"), "s", 1, n))
            .collect();
        let subjects = normalize(&requests);
        let excl = Exclusions::build(&subjects, &PairingRules::new());
        let mut lattice = WeekLattice::new();
        let result = place(&mut lattice, &subjects, &excl);

        assert!(result.unplaced.is_empty(), "unplaced: {:?}", result.unplaced);
        assert_eq!(lattice.pace_count(), 96);
        assert_well_formed(&lattice, &subjects);
    }

    #[test]
    fn test_every_fitting_quarter_fills() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..300 {
            let subject_count = rng.random_range(2..=9);
            let requests: Vec<PaceSetRequest> = (0..subject_count)
                .map(|i| PaceSetRequest::new(format!("c{i}"), "s", 1, rng.random_range(1..=36)))
                .collect();
            let subjects = normalize(&requests);
            let allotments: Vec<_> = subjects
                .iter()
                .map(|s| quarter_allotment(s.pace_count()))
                .collect();
            let room = WEEKS_PER_QUARTER * MAX_SUBJECTS_PER_WEEK;
            let fits = (0..QUARTERS).all(|q| allotments.iter().map(|a| a[q]).sum::<usize>() <= room);

            let excl = Exclusions::build(&subjects, &PairingRules::new());
            let mut lattice = WeekLattice::new();
            let result = place(&mut lattice, &subjects, &excl);

            let total: usize = subjects.iter().map(|s| s.pace_count()).sum();
            assert_eq!(lattice.pace_count() + result.unplaced.len(), total);
            assert_well_formed(&lattice, &subjects);
            if fits {
                assert!(result.unplaced.is_empty(), "{requests:?} left {:?}", result.unplaced);
            }
        }
    }

    fn entry_for(subject: usize, offset: usize) -> QuarterEntry {
        QuarterEntry {
            subject,
            first_pace: 0,
            count: 1,
            frequency: 9,
            offset,
            last_week: None,
        }
    }

    #[test]
    fn test_backoff_scans_forward_then_backward() {
        let subjects = normalize(&[
            PaceSetRequest::new("a", "a", 1, 36),
            PaceSetRequest::new("b", "b", 1, 36),
            PaceSetRequest::new("c", "c", 1, 36),
            PaceSetRequest::new("d", "d", 1, 4),
        ]);
        let excl = Exclusions::build(&subjects, &PairingRules::new());

        // Weeks 2 and 3 full: the target week 2 backs off forward to week 4.
        let mut lattice = WeekLattice::new();
        for week in [1, 2] {
            for s in 0..3 {
                lattice.place(week, PlacedPace { subject: s, pace: week });
            }
        }
        let mut entries = vec![entry_for(3, 1)];
        let mut result = BalancedPlacement::default();
        place_quarter(&mut lattice, &subjects, &excl, Quarter::Q1, &mut entries, &mut result);
        assert_eq!(entries[0].last_week, Some(3));

        // Weeks 2..=9 full: nothing forward, so it falls back to week 1.
        let mut lattice = WeekLattice::new();
        for week in 1..9 {
            for s in 0..3 {
                lattice.place(week, PlacedPace { subject: s, pace: week });
            }
        }
        let mut entries = vec![entry_for(3, 1)];
        let mut result = BalancedPlacement::default();
        place_quarter(&mut lattice, &subjects, &excl, Quarter::Q1, &mut entries, &mut result);
        assert_eq!(entries[0].last_week, Some(0));
        assert!(result.unplaced.is_empty());
        assert_eq!(result.relaxed, 0);
    }
}
