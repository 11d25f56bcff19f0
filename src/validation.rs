//! Input validation and output audit for projection generation.
//!
//! Checks structural integrity of pace requests before scheduling:
//! - Inverted pace ranges
//! - Difficulty outside 1..=5
//! - Duplicate categories
//! - Subjects with more paces than weeks
//! - Total pace count below the minimum or above lattice capacity
//!
//! [`audit_projection`] re-checks a finished projection against the
//! placement invariants (capacity, exclusivity, pairing, ordering).

use std::collections::{BTreeMap, HashSet};

use crate::config::GeneratorConfig;
use crate::models::{
    GeneratedPace, PaceSetRequest, PairingRules, WeekPosition, MAX_DIFFICULTY, MIN_DIFFICULTY,
    TOTAL_WEEKS,
};
use crate::ordering::{check_placement, OrderedPlacement};
use crate::scheduler::MAX_SUBJECTS_PER_WEEK;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// `start` is greater than `end`.
    InvalidRange,
    /// Difficulty outside 1..=5.
    InvalidDifficulty,
    /// Two requests share a category.
    DuplicateCategory,
    /// A subject has more paces than there are weeks.
    TooManyPaces,
    /// Fewer paces than the configured minimum.
    InsufficientPaces,
    /// More paces than the calendar can hold.
    CapacityExceeded,
    /// A week holds the same category twice.
    CategoryCollision,
    /// Two excluded categories share a week.
    PairingConflict,
    /// A category's paces are out of catalog order.
    OrderViolation,
    /// A pace carries a quarter/week outside the calendar.
    InvalidPosition,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a set of pace requests.
///
/// Checks:
/// 1. Every range has `start <= end`
/// 2. Every explicit difficulty is within 1..=5
/// 3. No two requests share a category
/// 4. No subject has more than 36 paces
/// 5. Total paces are at least `config.min_total_paces`
/// 6. Total paces fit the lattice (36 weeks x 3 subjects)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_requests(requests: &[PaceSetRequest], config: &GeneratorConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut categories = HashSet::new();
    let mut total = 0usize;

    for req in requests {
        if req.start > req.end {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRange,
                format!(
                    "Subject '{}' has inverted pace range {}..{}",
                    req.subject_id, req.start, req.end
                ),
            ));
        }

        if let Some(d) = req.difficulty {
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDifficulty,
                    format!("Subject '{}' has difficulty {d}", req.subject_id),
                ));
            }
        }

        if !categories.insert(req.category_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCategory,
                format!("Duplicate category: {}", req.category_id),
            ));
        }

        let count = req.pace_count();
        if count > TOTAL_WEEKS {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManyPaces,
                format!(
                    "Subject '{}' requests {count} paces, at most {TOTAL_WEEKS} fit",
                    req.subject_id
                ),
            ));
        }
        total = total.saturating_add(count);
    }

    if total < config.min_total_paces {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientPaces,
            format!(
                "At least {} paces are required, got {total}",
                config.min_total_paces
            ),
        ));
    }

    let capacity = TOTAL_WEEKS * MAX_SUBJECTS_PER_WEEK;
    if total > capacity {
        errors.push(ValidationError::new(
            ValidationErrorKind::CapacityExceeded,
            format!("{total} paces exceed the calendar capacity of {capacity}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Audits a generated projection against the placement invariants.
///
/// Pace codes are read as catalog order indices. Pairing conflicts are
/// reported with their own kind so callers can tell a last-resort
/// relaxation apart from a hard failure.
pub fn audit_projection(paces: &[GeneratedPace], rules: &PairingRules) -> ValidationResult {
    let mut errors = Vec::new();
    let mut weeks: BTreeMap<WeekPosition, Vec<&GeneratedPace>> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, Vec<OrderedPlacement>> = BTreeMap::new();

    for pace in paces {
        let Some(pos) = pace.position() else {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPosition,
                format!(
                    "Pace {} of '{}' has position Q{}W{}",
                    pace.pace_code, pace.category_id, pace.quarter, pace.week
                ),
            ));
            continue;
        };
        weeks.entry(pos).or_default().push(pace);
        if let Ok(order_index) = pace.pace_code.parse::<u32>() {
            by_category
                .entry(pace.category_id.as_str())
                .or_default()
                .push(OrderedPlacement::new(order_index, pos));
        }
    }

    for (pos, occupants) in &weeks {
        let mut seen = HashSet::new();
        for p in occupants {
            if !seen.insert(p.category_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CategoryCollision,
                    format!("Category '{}' appears twice in {pos}", p.category_id),
                ));
            }
        }
        if seen.len() > MAX_SUBJECTS_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!("{pos} holds {} categories", seen.len()),
            ));
        }
        for (i, a) in occupants.iter().enumerate() {
            for b in &occupants[i + 1..] {
                if rules.conflicts(&a.category_id, &b.category_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::PairingConflict,
                        format!(
                            "'{}' and '{}' share {pos}",
                            a.category_id, b.category_id
                        ),
                    ));
                }
            }
        }
    }

    for (category, placements) in &by_category {
        for (i, candidate) in placements.iter().enumerate() {
            let others: Vec<OrderedPlacement> = placements
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, p)| *p)
                .collect();
            if let Err(violation) = check_placement(&others, candidate) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OrderViolation,
                    format!("Category '{category}': {violation}"),
                ));
                break;
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
