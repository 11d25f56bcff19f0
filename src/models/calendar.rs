//! School-year calendar model.
//!
//! A school year is 4 quarters of 9 weeks each. Weeks are addressed either
//! by a typed [`WeekPosition`] (quarter + 1-based week) or by a flat lattice
//! index in `0..36`.
//!
//! # Ordering
//! Positions order by quarter first, then week. Index order and position
//! order always agree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of quarters in a school year.
pub const QUARTERS: usize = 4;
/// Number of weeks in one quarter.
pub const WEEKS_PER_QUARTER: usize = 9;
/// Number of weeks in a school year.
pub const TOTAL_WEEKS: usize = QUARTERS * WEEKS_PER_QUARTER;

/// A school-year quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// All quarters in calendar order.
    pub const ALL: [Quarter; QUARTERS] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Quarter from a 0-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Quarter from its 1-based number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=4 => Self::from_index(number as usize - 1),
            _ => None,
        }
    }

    /// 0-based index.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based number (1..=4).
    #[inline]
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// The following quarter, or `None` after Q4.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Quarters strictly after this one.
    pub fn remaining(self) -> usize {
        QUARTERS - 1 - self.index()
    }

    /// Label as stored by the surrounding application ("Q1".."Q4").
    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a quarter label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quarter label '{0}'")]
pub struct ParseQuarterError(pub String);

impl FromStr for Quarter {
    type Err = ParseQuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Q1" | "q1" => Ok(Quarter::Q1),
            "Q2" | "q2" => Ok(Quarter::Q2),
            "Q3" | "q3" => Ok(Quarter::Q3),
            "Q4" | "q4" => Ok(Quarter::Q4),
            other => Err(ParseQuarterError(other.to_string())),
        }
    }
}

/// A week within the school year.
///
/// `week` is 1-based within its quarter (1..=9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekPosition {
    pub quarter: Quarter,
    pub week: u8,
}

impl WeekPosition {
    /// Creates a position; returns `None` if `week` is outside 1..=9.
    pub fn new(quarter: Quarter, week: u8) -> Option<Self> {
        if (1..=WEEKS_PER_QUARTER as u8).contains(&week) {
            Some(Self { quarter, week })
        } else {
            None
        }
    }

    /// Position for a flat lattice index (0..36).
    pub fn from_index(index: usize) -> Option<Self> {
        let quarter = Quarter::from_index(index / WEEKS_PER_QUARTER)?;
        Some(Self {
            quarter,
            week: (index % WEEKS_PER_QUARTER) as u8 + 1,
        })
    }

    /// Flat lattice index (0..36).
    #[inline]
    pub fn index(&self) -> usize {
        self.quarter.index() * WEEKS_PER_QUARTER + (self.week as usize - 1)
    }
}

impl fmt::Display for WeekPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}W{}", self.quarter, self.week)
    }
}

/// Lattice indices belonging to a quarter.
pub fn quarter_weeks(quarter: Quarter) -> std::ops::Range<usize> {
    let start = quarter.index() * WEEKS_PER_QUARTER;
    start..start + WEEKS_PER_QUARTER
}
