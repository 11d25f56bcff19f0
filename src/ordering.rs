//! Sequential-order invariant for paces of one category.
//!
//! Within a category, a pace with a higher catalog order index must sit
//! strictly later in the calendar than every pace with a lower index.
//! The generator establishes this; every later edit (single-pace add or
//! move, quarter-close relocation) must re-check it with
//! [`check_placement`] so the two never drift apart.

use std::fmt;

use thiserror::Error;

use crate::models::{CatalogRef, ProjectionPace, WeekPosition};

/// A pace reduced to what the order invariant looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedPlacement {
    pub order_index: u32,
    pub position: WeekPosition,
}

impl OrderedPlacement {
    pub fn new(order_index: u32, position: WeekPosition) -> Self {
        Self {
            order_index,
            position,
        }
    }
}

/// Why a placement breaks sequential order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViolation {
    /// A later pace already sits at or before the target.
    LaterPaceNotAfter {
        candidate: OrderedPlacement,
        existing: OrderedPlacement,
    },
    /// An earlier pace sits after the target.
    EarlierPaceAfter {
        candidate: OrderedPlacement,
        existing: OrderedPlacement,
    },
    /// A different pace already occupies the target week.
    SharedWeek {
        candidate: OrderedPlacement,
        existing: OrderedPlacement,
    },
}

impl OrderViolation {
    /// The existing placement the candidate conflicts with.
    pub fn conflicting(&self) -> OrderedPlacement {
        match self {
            Self::LaterPaceNotAfter { existing, .. }
            | Self::EarlierPaceAfter { existing, .. }
            | Self::SharedWeek { existing, .. } => *existing,
        }
    }
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LaterPaceNotAfter {
                candidate,
                existing,
            } => write!(
                f,
                "pace #{} at {} would not precede pace #{} at {}",
                candidate.order_index, candidate.position, existing.order_index, existing.position
            ),
            Self::EarlierPaceAfter {
                candidate,
                existing,
            } => write!(
                f,
                "pace #{} at {} would precede pace #{} at {}",
                candidate.order_index, candidate.position, existing.order_index, existing.position
            ),
            Self::SharedWeek {
                candidate,
                existing,
            } => write!(
                f,
                "pace #{} would share {} with pace #{}",
                candidate.order_index, candidate.position, existing.order_index
            ),
        }
    }
}

impl std::error::Error for OrderViolation {}

/// Checks `candidate` against the other placed paces of its category.
///
/// `existing` must not contain the candidate itself. Any entry in the
/// target week is a [`OrderViolation::SharedWeek`], whatever its order
/// index: a category holds at most one pace per week, so a second copy of
/// the same catalog pace is rejected too. Other same-index entries are
/// ignored.
pub fn check_placement(
    existing: &[OrderedPlacement],
    candidate: &OrderedPlacement,
) -> Result<(), OrderViolation> {
    for other in existing {
        let violation = if other.position == candidate.position {
            Some(OrderViolation::SharedWeek {
                candidate: *candidate,
                existing: *other,
            })
        } else if other.order_index > candidate.order_index
            && other.position <= candidate.position
        {
            Some(OrderViolation::LaterPaceNotAfter {
                candidate: *candidate,
                existing: *other,
            })
        } else if other.order_index < candidate.order_index
            && other.position > candidate.position
        {
            Some(OrderViolation::EarlierPaceAfter {
                candidate: *candidate,
                existing: *other,
            })
        } else {
            None
        };

        if let Some(v) = violation {
            return Err(v);
        }
    }
    Ok(())
}

/// Whether a whole category sequence is in order.
pub fn is_sequential(placements: &[OrderedPlacement]) -> bool {
    let mut sorted = placements.to_vec();
    sorted.sort_by_key(|p| (p.order_index, p.position));
    sorted
        .windows(2)
        .all(|w| w[0].order_index < w[1].order_index && w[0].position < w[1].position)
}

fn category_placements<'a>(
    paces: &'a [ProjectionPace],
    category_id: &'a str,
    skip_id: Option<&'a str>,
) -> impl Iterator<Item = OrderedPlacement> + 'a {
    paces
        .iter()
        .filter(move |p| !p.deleted && p.category_id() == category_id)
        .filter(move |p| skip_id != Some(p.id.as_str()))
        .filter_map(|p| Some(OrderedPlacement::new(p.order_index(), p.position()?)))
}

/// Checks adding a catalog pace at `target` to a persisted projection.
pub fn check_pace_add(
    paces: &[ProjectionPace],
    catalog: &CatalogRef,
    target: WeekPosition,
) -> Result<(), OrderViolation> {
    let existing: Vec<OrderedPlacement> =
        category_placements(paces, &catalog.category_id, None).collect();
    check_placement(&existing, &OrderedPlacement::new(catalog.order_index, target))
}

/// Why a single-pace edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaceEditError {
    #[error("pace '{0}' not found")]
    UnknownPace(String),
    #[error(transparent)]
    Order(#[from] OrderViolation),
}

/// Checks moving the pace `pace_id` of a persisted projection to `target`.
///
/// Soft-deleted paces cannot be moved and count as unknown.
pub fn check_pace_move(
    paces: &[ProjectionPace],
    pace_id: &str,
    target: WeekPosition,
) -> Result<(), PaceEditError> {
    let pace = paces
        .iter()
        .find(|p| p.id == pace_id && !p.deleted)
        .ok_or_else(|| PaceEditError::UnknownPace(pace_id.to_string()))?;
    let existing: Vec<OrderedPlacement> =
        category_placements(paces, pace.category_id(), Some(pace_id)).collect();
    check_placement(&existing, &OrderedPlacement::new(pace.order_index(), target))?;
    Ok(())
}
