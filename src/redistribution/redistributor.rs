//! Quarter-close redistribution of unfinished paces.
//!
//! # Algorithm
//!
//! For every open projection of the closed quarter's school year, ungraded
//! paces left in the closed quarter are taken in catalog order. Each one is
//! flagged unfinished (original position captured once) and planned into
//! the next quarter against its own category only:
//!
//! 1. The week of its successor (next higher order index in the quarter),
//!    then earlier weeks down to the last lower-order pace.
//! 2. Shift the chain of paces from the successor's week one week later,
//!    up to the first free week, and take the successor's week.
//! 3. Without a successor, the earliest free week after lower-order paces.
//! 4. Saturated quarter: with a successor, the pace in the last week is
//!    displaced into the following quarter and the chain shifts over it;
//!    without one, the pace itself moves on to the following quarter.
//!
//! Displacement cascades at most once per remaining quarter. The plan is
//! re-checked for sequential order before it is committed as one atomic
//! batch; a plan that cannot be completed leaves the pace flagged in place
//! and reports it as overflow.
//!
//! # Paces in target quarters
//!
//! Paces already in a target quarter are shifted and displaced whatever
//! their status: a graded or completed pace moves like an ungraded one and
//! keeps its grade and status. Only paces of the closed quarter are flagged
//! unfinished. A pace displaced into another quarter has its original
//! position captured the first time it moves.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::store::{PaceStore, QuarterLookup};
use crate::error::{RedistributionError, StoreResult};
use crate::models::{
    PaceStatus, PaceUpdate, ProjectionPace, ProjectionRecord, Quarter, QUARTERS, WEEKS_PER_QUARTER,
};
use crate::ordering::{check_placement, OrderedPlacement};

/// A pace that could not be moved forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowPace {
    pub projection_id: String,
    pub pace_catalog_id: String,
    pub pace_code: String,
    pub subject_name: String,
}

impl OverflowPace {
    fn from_pace(pace: &ProjectionPace) -> Self {
        Self {
            projection_id: pace.projection_id.clone(),
            pace_catalog_id: pace.catalog.catalog_id.clone(),
            pace_code: pace.catalog.pace_code.clone(),
            subject_name: pace.catalog.subject_name.clone(),
        }
    }
}

/// Result of one quarter-close run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionSummary {
    /// Unfinished paces relocated into a later quarter.
    pub redistributed_count: usize,
    /// Unfinished paces left flagged in place.
    pub overflow_paces: Vec<OverflowPace>,
    /// Projections whose processing stopped on a store error.
    pub failed_projections: Vec<String>,
}

impl RedistributionSummary {
    /// Unfinished paces handled, relocated or not.
    pub fn handled(&self) -> usize {
        self.redistributed_count + self.overflow_paces.len()
    }
}

/// Runs quarter-close redistribution against an owned store.
#[derive(Debug)]
pub struct Redistributor<S> {
    store: S,
}

impl<S: QuarterLookup + PaceStore> Redistributor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Redistributes the unfinished paces of a closed quarter.
    pub fn redistribute(
        &mut self,
        closed_quarter_id: &str,
        school_id: &str,
    ) -> Result<RedistributionSummary, RedistributionError> {
        redistribute_unfinished_paces(&mut self.store, closed_quarter_id, school_id)
    }
}

/// Moves ungraded paces of a closed quarter into later quarters.
///
/// Fails only when the closed quarter itself is unknown or the projections
/// cannot be listed. A store error inside one projection is logged, the
/// projection is listed in `failed_projections`, and the run continues.
pub fn redistribute_unfinished_paces<S>(
    store: &mut S,
    closed_quarter_id: &str,
    school_id: &str,
) -> Result<RedistributionSummary, RedistributionError>
where
    S: QuarterLookup + PaceStore + ?Sized,
{
    let closed = store
        .quarter_by_id(closed_quarter_id)?
        .ok_or_else(|| RedistributionError::QuarterNotFound(closed_quarter_id.to_string()))?;
    let calendar = QuarterTable::load(&*store, &closed.school_year_id)?;
    let projections = store.open_projections(school_id, &closed.school_year_id)?;

    let mut summary = RedistributionSummary::default();
    for projection in &projections {
        if let Err(e) =
            redistribute_projection(&mut *store, &calendar, closed.label, projection, &mut summary)
        {
            error!("projection '{}': redistribution stopped: {e}", projection.id);
            summary.failed_projections.push(projection.id.clone());
        }
    }

    info!(
        "{} closed: {} pace(s) redistributed, {} overflow, {} projection(s) failed",
        closed.label,
        summary.redistributed_count,
        summary.overflow_paces.len(),
        summary.failed_projections.len()
    );
    Ok(summary)
}

/// Quarters that exist for the school year.
struct QuarterTable {
    present: [bool; QUARTERS],
}

impl QuarterTable {
    fn load<S: QuarterLookup + ?Sized>(store: &S, school_year_id: &str) -> StoreResult<Self> {
        let mut present = [false; QUARTERS];
        for q in Quarter::ALL {
            present[q.index()] = store.quarter_by_label(school_year_id, q)?.is_some();
        }
        Ok(Self { present })
    }

    /// The following quarter, if the school year has it.
    fn next(&self, quarter: Quarter) -> Option<Quarter> {
        let next = quarter.next()?;
        if self.present[next.index()] {
            Some(next)
        } else {
            debug!("{next} not found for the school year");
            None
        }
    }
}

fn redistribute_projection<S: PaceStore + ?Sized>(
    store: &mut S,
    calendar: &QuarterTable,
    closed: Quarter,
    projection: &ProjectionRecord,
    summary: &mut RedistributionSummary,
) -> StoreResult<()> {
    let mut arena = Arena::new(store.projection_paces(&projection.id)?);
    let unfinished = arena.unfinished_in(closed);
    if unfinished.is_empty() {
        return Ok(());
    }
    debug!(
        "projection '{}': {} unfinished pace(s) in {closed}",
        projection.id,
        unfinished.len()
    );

    for idx in unfinished {
        let mut flagged = arena.clone();
        flagged.mark_unfinished(idx);

        let mut plan = flagged.clone();
        let relocated = calendar
            .next(closed)
            .is_some_and(|target| plan.relocate(idx, target, calendar))
            && plan.order_holds(&flagged, closed);
        let next = if relocated { plan } else { flagged };

        store.apply(&next.changes_since(&arena))?;
        arena = next;

        let pace = &arena.paces[idx];
        if relocated {
            debug!(
                "pace {} ({}) moved to {}W{}",
                pace.catalog.pace_code,
                pace.category_id(),
                pace.quarter,
                pace.week
            );
            summary.redistributed_count += 1;
        } else {
            warn!(
                "pace {} ({}) of projection '{}' could not be redistributed",
                pace.catalog.pace_code,
                pace.category_id(),
                projection.id
            );
            summary.overflow_paces.push(OverflowPace::from_pace(pace));
        }
    }
    Ok(())
}

/// Where a planned pace ended up in one quarter.
enum Landing {
    Placed,
    /// Placed by pushing this pace out of the quarter.
    Displaced(usize),
    /// No room; the pace itself must try the following quarter.
    Full,
}

/// Working copy of a projection's paces, indexed by position in `paces`.
#[derive(Debug, Clone)]
struct Arena {
    paces: Vec<ProjectionPace>,
}

impl Arena {
    fn new(paces: Vec<ProjectionPace>) -> Self {
        Self { paces }
    }

    /// Ungraded paces of `quarter`, by ascending order index.
    fn unfinished_in(&self, quarter: Quarter) -> Vec<usize> {
        let mut found: Vec<usize> = (0..self.paces.len())
            .filter(|&i| {
                let p = &self.paces[i];
                !p.deleted && p.quarter == quarter && p.is_ungraded()
            })
            .collect();
        found.sort_by_key(|&i| self.paces[i].order_index());
        found
    }

    fn capture_original(&mut self, idx: usize) {
        let pace = &mut self.paces[idx];
        if pace.original_quarter.is_none() {
            pace.original_quarter = Some(pace.quarter);
            pace.original_week = Some(pace.week);
        }
    }

    fn mark_unfinished(&mut self, idx: usize) {
        self.capture_original(idx);
        let pace = &mut self.paces[idx];
        pace.is_unfinished = true;
        pace.status = PaceStatus::Unfinished;
    }

    fn set_week(&mut self, idx: usize, quarter: Quarter, slot: usize) {
        let pace = &mut self.paces[idx];
        pace.quarter = quarter;
        pace.week = slot as u8 + 1;
    }

    /// Plans `idx` into `target`, cascading displaced paces forward.
    fn relocate(&mut self, idx: usize, target: Quarter, calendar: &QuarterTable) -> bool {
        let mut item = idx;
        let mut quarter = target;
        for _ in 0..QUARTERS {
            match self.land(item, quarter) {
                Landing::Placed => return true,
                Landing::Displaced(other) => item = other,
                Landing::Full => {}
            }
            match calendar.next(quarter) {
                Some(next) => quarter = next,
                None => return false,
            }
        }
        false
    }

    /// Same-category occupancy of `quarter`, excluding `item`.
    fn occupancy(&self, item: usize, quarter: Quarter) -> [Option<usize>; WEEKS_PER_QUARTER] {
        let category = self.paces[item].category_id();
        let mut weeks = [None; WEEKS_PER_QUARTER];
        for (i, p) in self.paces.iter().enumerate() {
            if i == item || p.deleted || p.quarter != quarter || p.category_id() != category {
                continue;
            }
            if let Some(slot) = (p.week as usize).checked_sub(1).filter(|&s| s < WEEKS_PER_QUARTER)
            {
                weeks[slot] = Some(i);
            }
        }
        weeks
    }

    fn land(&mut self, item: usize, quarter: Quarter) -> Landing {
        let order = self.paces[item].order_index();
        let weeks = self.occupancy(item, quarter);
        let order_at = |slot: usize| weeks[slot].map(|i| self.paces[i].order_index());

        let floor = (0..WEEKS_PER_QUARTER)
            .filter(|&s| order_at(s).is_some_and(|o| o < order))
            .max()
            .map_or(0, |s| s + 1);
        let successor = (0..WEEKS_PER_QUARTER)
            .filter(|&s| order_at(s).is_some_and(|o| o > order))
            .min_by_key(|&s| order_at(s));

        let Some(w) = successor else {
            return match (floor..WEEKS_PER_QUARTER).find(|&s| weeks[s].is_none()) {
                Some(slot) => {
                    self.set_week(item, quarter, slot);
                    Landing::Placed
                }
                None => Landing::Full,
            };
        };

        if let Some(slot) = (floor..=w).rev().find(|&s| weeks[s].is_none()) {
            self.set_week(item, quarter, slot);
            return Landing::Placed;
        }

        if let Some(free) = (w + 1..WEEKS_PER_QUARTER).find(|&s| weeks[s].is_none()) {
            self.shift_chain(&weeks, quarter, w, free);
            self.set_week(item, quarter, w);
            return Landing::Placed;
        }

        let last = WEEKS_PER_QUARTER - 1;
        let Some(displaced) = weeks[last] else {
            return Landing::Full;
        };
        self.capture_original(displaced);
        self.shift_chain(&weeks, quarter, w, last);
        self.set_week(item, quarter, w);
        Landing::Displaced(displaced)
    }

    /// Moves the paces in slots `from..to` one week later.
    fn shift_chain(
        &mut self,
        weeks: &[Option<usize>; WEEKS_PER_QUARTER],
        quarter: Quarter,
        from: usize,
        to: usize,
    ) {
        for slot in (from..to).rev() {
            if let Some(i) = weeks[slot] {
                self.set_week(i, quarter, slot + 1);
            }
        }
    }

    /// Whether every pace moved since `before` keeps its category in order
    /// among the paces after `closed`.
    fn order_holds(&self, before: &Arena, closed: Quarter) -> bool {
        self.paces.iter().enumerate().all(|(i, pace)| {
            let prev = &before.paces[i];
            if (pace.quarter, pace.week) == (prev.quarter, prev.week) {
                return true;
            }
            let Some(position) = pace.position() else {
                return false;
            };
            let others: Vec<OrderedPlacement> = self
                .paces
                .iter()
                .enumerate()
                .filter(|&(j, o)| {
                    j != i && !o.deleted && o.quarter > closed && o.category_id() == pace.category_id()
                })
                .filter_map(|(_, o)| Some(OrderedPlacement::new(o.order_index(), o.position()?)))
                .collect();
            match check_placement(&others, &OrderedPlacement::new(pace.order_index(), position)) {
                Ok(()) => true,
                Err(violation) => {
                    debug!("plan rejected: {violation}");
                    false
                }
            }
        })
    }

    /// Updates for every pace that differs from `before`.
    fn changes_since(&self, before: &Arena) -> Vec<PaceUpdate> {
        self.paces
            .iter()
            .zip(&before.paces)
            .filter(|(now, prev)| now != prev)
            .map(|(now, _)| PaceUpdate::from_pace(now))
            .collect()
    }
}
