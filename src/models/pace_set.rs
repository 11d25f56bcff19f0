//! Per-subject pace requests and their normalization.
//!
//! A request declares an inclusive range of pace numbers for one subject,
//! minus skipped numbers. Normalization expands it into the ordered list
//! of pace codes the generator places.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowest accepted difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest accepted difficulty.
pub const MAX_DIFFICULTY: u8 = 5;
/// Difficulty assumed when a request omits it.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// Paces requested for one subject of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaceSetRequest {
    /// Category the subject belongs to.
    pub category_id: String,
    /// Subject identifier.
    pub subject_id: String,
    /// First pace number (inclusive).
    pub start: u32,
    /// Last pace number (inclusive).
    pub end: u32,
    /// Pace numbers inside the range that are not taken.
    #[serde(default)]
    pub skipped: BTreeSet<u32>,
    /// Categories this subject must never share a week with.
    #[serde(default)]
    pub not_pair_with: BTreeSet<String>,
    /// Difficulty 1..=5. `None` = default.
    #[serde(default)]
    pub difficulty: Option<u8>,
}

impl PaceSetRequest {
    /// Creates a request for paces `start..=end`.
    pub fn new(
        category_id: impl Into<String>,
        subject_id: impl Into<String>,
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            subject_id: subject_id.into(),
            start,
            end,
            skipped: BTreeSet::new(),
            not_pair_with: BTreeSet::new(),
            difficulty: None,
        }
    }

    /// Marks pace numbers as skipped.
    pub fn with_skipped(mut self, skipped: impl IntoIterator<Item = u32>) -> Self {
        self.skipped.extend(skipped);
        self
    }

    /// Adds categories this subject may not share a week with.
    pub fn with_not_pair_with<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.not_pair_with
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Sets the difficulty.
    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Difficulty, falling back to `default` when unset.
    pub fn difficulty_or(&self, default: u8) -> u8 {
        self.difficulty.unwrap_or(default)
    }

    /// Pace numbers in order, skips removed. Empty when `start > end`.
    pub fn pace_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        (self.start..=self.end).filter(move |n| !self.skipped.contains(n))
    }

    /// Ordered pace codes. An empty result is valid.
    pub fn normalize(&self) -> Vec<String> {
        self.pace_numbers().map(|n| n.to_string()).collect()
    }

    /// Number of paces after normalization, without walking the range.
    pub fn pace_count(&self) -> usize {
        if self.start > self.end {
            return 0;
        }
        let span = u64::from(self.end - self.start) + 1;
        let skipped = self.skipped.range(self.start..=self.end).count() as u64;
        usize::try_from(span - skipped).unwrap_or(usize::MAX)
    }
}

/// One normalized pace: its code and catalog order index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaceCode {
    pub code: String,
    pub order_index: u32,
}

/// A request after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubject {
    pub category_id: String,
    pub subject_id: String,
    pub paces: Vec<PaceCode>,
    pub not_pair_with: BTreeSet<String>,
    pub difficulty: u8,
}

impl NormalizedSubject {
    /// Normalizes a request, applying `default_difficulty` when absent.
    pub fn from_request(req: &PaceSetRequest, default_difficulty: u8) -> Self {
        Self {
            category_id: req.category_id.clone(),
            subject_id: req.subject_id.clone(),
            paces: req
                .pace_numbers()
                .map(|n| PaceCode {
                    code: n.to_string(),
                    order_index: n,
                })
                .collect(),
            not_pair_with: req.not_pair_with.clone(),
            difficulty: req.difficulty_or(default_difficulty),
        }
    }

    /// Number of paces.
    #[inline]
    pub fn pace_count(&self) -> usize {
        self.paces.len()
    }
}
