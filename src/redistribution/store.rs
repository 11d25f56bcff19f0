//! Store seams used by the redistributor.
//!
//! The surrounding application owns persistence. These traits expose only
//! the lookups and the batched pace mutation the redistributor needs.

use crate::error::StoreResult;
use crate::models::{PaceUpdate, ProjectionPace, ProjectionRecord, Quarter, QuarterRecord};

/// Quarter lookups within a school year.
pub trait QuarterLookup {
    /// Finds a quarter by id.
    fn quarter_by_id(&self, quarter_id: &str) -> StoreResult<Option<QuarterRecord>>;

    /// Finds the quarter labeled `label` in a school year.
    fn quarter_by_label(
        &self,
        school_year_id: &str,
        label: Quarter,
    ) -> StoreResult<Option<QuarterRecord>>;
}

/// Projection and pace access.
pub trait PaceStore {
    /// Open projections of a school for a school year.
    fn open_projections(
        &self,
        school_id: &str,
        school_year_id: &str,
    ) -> StoreResult<Vec<ProjectionRecord>>;

    /// Non-deleted paces of a projection, with catalog metadata.
    fn projection_paces(&self, projection_id: &str) -> StoreResult<Vec<ProjectionPace>>;

    /// Applies a batch of pace updates atomically: either every update is
    /// written or none is.
    fn apply(&mut self, updates: &[PaceUpdate]) -> StoreResult<()>;
}
