//! Curriculum pace scheduling.
//!
//! Places a student's yearly paces into a calendar of 4 quarters × 9 weeks
//! and reflows unfinished paces when a quarter closes.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `PaceSetRequest`, `GeneratedPace`,
//!   `Quarter`, `WeekPosition`, `PairingRules`, persisted `ProjectionPace`
//! - **`scheduler`**: Projection generation (uniform pairing or
//!   frequency-balanced placement with smoothing) and load metrics
//! - **`redistribution`**: Quarter-close relocation over store traits
//! - **`ordering`**: Sequential-order invariant shared by every edit
//! - **`validation`**: Request checks and projection audits
//! - **`config`**: Generator settings
//!
//! # Example
//!
//! ```
//! use pace_schedule::models::PaceSetRequest;
//! use pace_schedule::scheduler::LoadReport;
//! use pace_schedule::ProjectionGenerator;
//!
//! let requests = vec![
//!     PaceSetRequest::new("math", "Math 7", 1, 30),
//!     PaceSetRequest::new("english", "English 7", 1, 24).with_not_pair_with(["math"]),
//!     PaceSetRequest::new("science", "Science 7", 1, 20),
//! ];
//! let outcome = ProjectionGenerator::new().generate(&requests).unwrap();
//! let report = LoadReport::calculate(&outcome);
//! assert!(report.max_week_load <= 3);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod ordering;
pub mod redistribution;
pub mod scheduler;
pub mod validation;

pub use config::{GeneratorConfig, UnplacedPolicy};
pub use error::{GenerationError, RedistributionError, StoreError};
pub use redistribution::{redistribute_unfinished_paces, RedistributionSummary, Redistributor};
pub use scheduler::{generate, ProjectionGenerator};
