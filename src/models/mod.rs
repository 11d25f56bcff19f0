//! Curriculum scheduling domain models.
//!
//! Provides the core data types for requesting, generating and persisting
//! a student's school-year plan.
//!
//! # Domain Mappings
//!
//! | pace-schedule | Meaning |
//! |---------------|---------|
//! | PaceSetRequest | Paces one subject needs this year |
//! | GeneratedPace | A pace placed into a (quarter, week) slot |
//! | ProjectionPace | A persisted pace row of a student's projection |
//! | PairingRules | Categories that may not share a week |

mod calendar;
mod constraint;
mod pace_record;
mod pace_set;
mod projection;

pub use calendar::{
    quarter_weeks, ParseQuarterError, Quarter, WeekPosition, QUARTERS, TOTAL_WEEKS,
    WEEKS_PER_QUARTER,
};
pub use constraint::PairingRules;
pub use pace_record::{
    CatalogRef, PaceStatus, PaceUpdate, ProjectionPace, ProjectionRecord, QuarterRecord,
};
pub use pace_set::{
    NormalizedSubject, PaceCode, PaceSetRequest, DEFAULT_DIFFICULTY, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};
pub use projection::{GeneratedPace, GenerationOutcome, PlacementMode, UnplacedPace};
