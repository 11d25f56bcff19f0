//! In-memory store.
//!
//! Keeps quarters, projections and paces in ordered maps. Suitable for
//! tests and for callers that load a school year up front.

use std::collections::BTreeMap;

use super::store::{PaceStore, QuarterLookup};
use crate::error::{StoreError, StoreResult};
use crate::models::{PaceUpdate, ProjectionPace, ProjectionRecord, Quarter, QuarterRecord};

/// Store backed by ordered maps keyed by id.
///
/// # Example
///
/// ```
/// use pace_schedule::models::{Quarter, QuarterRecord};
/// use pace_schedule::redistribution::{InMemoryStore, QuarterLookup};
///
/// let store = InMemoryStore::new().with_quarter(QuarterRecord::new("q1", "sy", Quarter::Q1));
/// let found = store.quarter_by_label("sy", Quarter::Q1).unwrap();
/// assert_eq!(found.map(|q| q.id), Some("q1".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    quarters: BTreeMap<String, QuarterRecord>,
    projections: BTreeMap<String, ProjectionRecord>,
    paces: BTreeMap<String, ProjectionPace>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one quarter record per label of a school year, ids `"{school_year_id}-Q1"`...
    pub fn with_school_year(mut self, school_year_id: &str) -> Self {
        for label in Quarter::ALL {
            let id = format!("{school_year_id}-{label}");
            self.insert_quarter(QuarterRecord::new(id, school_year_id, label));
        }
        self
    }

    pub fn with_quarter(mut self, quarter: QuarterRecord) -> Self {
        self.insert_quarter(quarter);
        self
    }

    pub fn with_projection(mut self, projection: ProjectionRecord) -> Self {
        self.insert_projection(projection);
        self
    }

    pub fn with_pace(mut self, pace: ProjectionPace) -> Self {
        self.insert_pace(pace);
        self
    }

    pub fn with_paces(mut self, paces: impl IntoIterator<Item = ProjectionPace>) -> Self {
        for pace in paces {
            self.insert_pace(pace);
        }
        self
    }

    pub fn insert_quarter(&mut self, quarter: QuarterRecord) {
        self.quarters.insert(quarter.id.clone(), quarter);
    }

    pub fn insert_projection(&mut self, projection: ProjectionRecord) {
        self.projections.insert(projection.id.clone(), projection);
    }

    pub fn insert_pace(&mut self, pace: ProjectionPace) {
        self.paces.insert(pace.id.clone(), pace);
    }

    /// Looks up a pace by id, including soft-deleted ones.
    pub fn pace(&self, pace_id: &str) -> Option<&ProjectionPace> {
        self.paces.get(pace_id)
    }

    /// Every pace of a projection, including soft-deleted ones.
    pub fn all_paces(&self, projection_id: &str) -> Vec<&ProjectionPace> {
        self.paces
            .values()
            .filter(|p| p.projection_id == projection_id)
            .collect()
    }
}

impl QuarterLookup for InMemoryStore {
    fn quarter_by_id(&self, quarter_id: &str) -> StoreResult<Option<QuarterRecord>> {
        Ok(self.quarters.get(quarter_id).cloned())
    }

    fn quarter_by_label(
        &self,
        school_year_id: &str,
        label: Quarter,
    ) -> StoreResult<Option<QuarterRecord>> {
        Ok(self
            .quarters
            .values()
            .find(|q| q.school_year_id == school_year_id && q.label == label)
            .cloned())
    }
}

impl PaceStore for InMemoryStore {
    fn open_projections(
        &self,
        school_id: &str,
        school_year_id: &str,
    ) -> StoreResult<Vec<ProjectionRecord>> {
        Ok(self
            .projections
            .values()
            .filter(|p| p.is_open && p.school_id == school_id && p.school_year_id == school_year_id)
            .cloned()
            .collect())
    }

    fn projection_paces(&self, projection_id: &str) -> StoreResult<Vec<ProjectionPace>> {
        if !self.projections.contains_key(projection_id) {
            return Err(StoreError::not_found("projection", projection_id));
        }
        Ok(self
            .paces
            .values()
            .filter(|p| p.projection_id == projection_id && !p.deleted)
            .cloned()
            .collect())
    }

    fn apply(&mut self, updates: &[PaceUpdate]) -> StoreResult<()> {
        // Validate the whole batch before writing anything.
        for update in updates {
            match self.paces.get(&update.pace_id) {
                None => return Err(StoreError::not_found("pace", update.pace_id.as_str())),
                Some(p) if p.deleted => {
                    return Err(StoreError::Conflict(format!(
                        "pace '{}' is deleted",
                        update.pace_id
                    )))
                }
                Some(_) => {}
            }
        }
        for update in updates {
            if let Some(pace) = self.paces.get_mut(&update.pace_id) {
                update.apply_to(pace);
            }
        }
        Ok(())
    }
}
