//! Projection generation and load metrics.
//!
//! Places a student's requested paces into the 36-week calendar.
//!
//! # Strategies
//!
//! - **Uniform pairing**: equal counts at the minimum total; subjects are
//!   paired hard with easy and each pair shares a week.
//! - **Frequency-balanced**: everything else; each subject's share of a
//!   quarter is spread at a regular frequency, then weekly loads are smoothed.
//!
//! Both strategies keep every week at or under [`MAX_SUBJECTS_PER_WEEK`]
//! distinct subjects and place each subject's paces in strictly increasing
//! weeks.
//!
//! # KPI
//!
//! [`LoadReport`] summarizes weekly loads of a generated projection.

mod balanced;
mod generator;
mod kpi;
mod lattice;
mod pairing;
mod smoothing;

pub use generator::{generate, ProjectionGenerator};
pub use kpi::LoadReport;
pub use lattice::MAX_SUBJECTS_PER_WEEK;
pub use pairing::PAIRING_CONFLICT_MESSAGE;
