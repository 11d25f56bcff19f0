//! Week-sharing exclusion rules.
//!
//! A subject may declare categories it must never share a week with
//! (`not_pair_with`). Exclusions are symmetric: a conflict declared by
//! either side applies to both.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::PaceSetRequest;

/// Symmetric category exclusion table.
///
/// Maps category → categories it may not share a week with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRules {
    exclusions: BTreeMap<String, BTreeSet<String>>,
}

impl PairingRules {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from every request's `not_pair_with` set.
    pub fn from_requests(requests: &[PaceSetRequest]) -> Self {
        let mut rules = Self::new();
        for req in requests {
            for other in &req.not_pair_with {
                rules.exclude(req.category_id.clone(), other.clone());
            }
        }
        rules
    }

    /// Declares that `a` and `b` may not share a week.
    pub fn exclude(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = (a.into(), b.into());
        self.exclusions
            .entry(a.clone())
            .or_default()
            .insert(b.clone());
        self.exclusions.entry(b).or_default().insert(a);
    }

    /// Builder: declares an exclusion and returns self.
    pub fn with_exclusion(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.exclude(a, b);
        self
    }

    /// Whether two categories conflict.
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.exclusions
            .get(a)
            .map(|set| set.contains(b))
            .unwrap_or(false)
    }

    /// Categories excluded alongside `category`.
    pub fn excluded_for(&self, category: &str) -> impl Iterator<Item = &str> {
        self.exclusions
            .get(category)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of categories with at least one exclusion.
    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    /// Whether no exclusions are declared.
    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }
}
