//! Generated projection (solution) model.
//!
//! A generated projection is the list of paces the generator placed into
//! the school-year calendar, plus any paces it could not place. It lives
//! only in memory; the caller resolves catalog ids and persists it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Quarter, WeekPosition, TOTAL_WEEKS};

/// A pace placed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedPace {
    pub category_id: String,
    pub subject_id: String,
    pub pace_code: String,
    /// Quarter number (1..=4).
    pub quarter: u8,
    /// Week within the quarter (1..=9).
    pub week: u8,
}

impl GeneratedPace {
    /// Creates a generated pace at `position`.
    pub fn new(
        category_id: impl Into<String>,
        subject_id: impl Into<String>,
        pace_code: impl Into<String>,
        position: WeekPosition,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            subject_id: subject_id.into(),
            pace_code: pace_code.into(),
            quarter: position.quarter.number(),
            week: position.week,
        }
    }

    /// Typed position, `None` if the stored numbers are out of range.
    pub fn position(&self) -> Option<WeekPosition> {
        WeekPosition::new(Quarter::from_number(self.quarter)?, self.week)
    }
}

/// A pace the generator could not place anywhere in its quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedPace {
    pub category_id: String,
    pub subject_id: String,
    pub pace_code: String,
    /// Quarter the pace was allotted to.
    pub quarter: u8,
}

/// Which placement strategy produced a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Hard/easy subject pairs sharing every week.
    UniformPairing,
    /// Per-quarter frequency round-robin with backoff.
    FrequencyBalanced,
}

/// Result of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Placed paces, sorted by position then category.
    pub paces: Vec<GeneratedPace>,
    /// Paces the backoff ladder could not place.
    pub unplaced: Vec<UnplacedPace>,
    /// Strategy used.
    pub mode: PlacementMode,
    /// Number of paces placed under the relaxed pairing rule.
    pub relaxed_placements: usize,
}

impl GenerationOutcome {
    /// Whether every requested pace was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Number of placed paces.
    pub fn pace_count(&self) -> usize {
        self.paces.len()
    }

    /// Placed paces of a category, in position order.
    pub fn paces_for_category(&self, category_id: &str) -> Vec<&GeneratedPace> {
        self.paces
            .iter()
            .filter(|p| p.category_id == category_id)
            .collect()
    }

    /// Placed paces in one week.
    pub fn paces_in_week(&self, position: WeekPosition) -> Vec<&GeneratedPace> {
        self.paces
            .iter()
            .filter(|p| p.position() == Some(position))
            .collect()
    }

    /// Pace count per lattice index (0..36).
    pub fn week_loads(&self) -> [usize; TOTAL_WEEKS] {
        let mut loads = [0; TOTAL_WEEKS];
        for pace in &self.paces {
            if let Some(pos) = pace.position() {
                loads[pos.index()] += 1;
            }
        }
        loads
    }

    /// Pace count per quarter number (1..=4).
    pub fn quarter_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for pace in &self.paces {
            *counts.entry(pace.quarter).or_insert(0) += 1;
        }
        counts
    }
}
