//! Persisted projection records.
//!
//! Minimal views of the entities the surrounding application stores:
//! quarters, projections and their paces. Only the fields the scheduler
//! reads or writes are modeled.

use serde::{Deserialize, Serialize};

use super::{Quarter, WeekPosition};

/// Lifecycle status of a persisted pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaceStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Unfinished,
}

/// Catalog metadata attached to a persisted pace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRef {
    pub catalog_id: String,
    pub pace_code: String,
    /// Intended sequential position within the category.
    pub order_index: u32,
    pub category_id: String,
    pub subject_name: String,
}

impl CatalogRef {
    pub fn new(
        catalog_id: impl Into<String>,
        pace_code: impl Into<String>,
        order_index: u32,
        category_id: impl Into<String>,
        subject_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            pace_code: pace_code.into(),
            order_index,
            category_id: category_id.into(),
            subject_name: subject_name.into(),
        }
    }
}

/// A pace row of a persisted projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPace {
    pub id: String,
    pub projection_id: String,
    pub catalog: CatalogRef,
    pub quarter: Quarter,
    /// Week within the quarter (1..=9).
    pub week: u8,
    pub grade: Option<f32>,
    pub status: PaceStatus,
    pub is_unfinished: bool,
    pub original_quarter: Option<Quarter>,
    pub original_week: Option<u8>,
    pub deleted: bool,
}

impl ProjectionPace {
    /// Creates a pending, ungraded pace at `position`.
    pub fn new(
        id: impl Into<String>,
        projection_id: impl Into<String>,
        catalog: CatalogRef,
        position: WeekPosition,
    ) -> Self {
        Self {
            id: id.into(),
            projection_id: projection_id.into(),
            catalog,
            quarter: position.quarter,
            week: position.week,
            grade: None,
            status: PaceStatus::Pending,
            is_unfinished: false,
            original_quarter: None,
            original_week: None,
            deleted: false,
        }
    }

    /// Sets a grade and marks the pace completed.
    pub fn with_grade(mut self, grade: f32) -> Self {
        self.grade = Some(grade);
        self.status = PaceStatus::Completed;
        self
    }

    /// Marks the pace soft-deleted.
    pub fn soft_deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Current position; `None` if `week` is out of range.
    pub fn position(&self) -> Option<WeekPosition> {
        WeekPosition::new(self.quarter, self.week)
    }

    /// Whether the pace still awaits a grade.
    pub fn is_ungraded(&self) -> bool {
        self.grade.is_none()
    }

    #[inline]
    pub fn category_id(&self) -> &str {
        &self.catalog.category_id
    }

    #[inline]
    pub fn order_index(&self) -> u32 {
        self.catalog.order_index
    }
}

/// A persisted projection (one student's plan for a school year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub id: String,
    pub school_id: String,
    pub school_year_id: String,
    pub is_open: bool,
}

impl ProjectionRecord {
    /// Creates an open projection.
    pub fn new(
        id: impl Into<String>,
        school_id: impl Into<String>,
        school_year_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            school_id: school_id.into(),
            school_year_id: school_year_id.into(),
            is_open: true,
        }
    }

    /// Marks the projection closed.
    pub fn closed(mut self) -> Self {
        self.is_open = false;
        self
    }
}

/// A persisted quarter of a school year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterRecord {
    pub id: String,
    pub school_year_id: String,
    pub label: Quarter,
}

impl QuarterRecord {
    pub fn new(id: impl Into<String>, school_year_id: impl Into<String>, label: Quarter) -> Self {
        Self {
            id: id.into(),
            school_year_id: school_year_id.into(),
            label,
        }
    }
}

/// A single-pace mutation written back to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceUpdate {
    pub pace_id: String,
    pub quarter: Quarter,
    pub week: u8,
    pub is_unfinished: bool,
    pub status: PaceStatus,
    pub original_quarter: Option<Quarter>,
    pub original_week: Option<u8>,
}

impl PaceUpdate {
    /// Update carrying the pace's current state unchanged.
    pub fn from_pace(pace: &ProjectionPace) -> Self {
        Self {
            pace_id: pace.id.clone(),
            quarter: pace.quarter,
            week: pace.week,
            is_unfinished: pace.is_unfinished,
            status: pace.status,
            original_quarter: pace.original_quarter,
            original_week: pace.original_week,
        }
    }

    /// Writes the update onto a pace.
    pub fn apply_to(&self, pace: &mut ProjectionPace) {
        pace.quarter = self.quarter;
        pace.week = self.week;
        pace.is_unfinished = self.is_unfinished;
        pace.status = self.status;
        pace.original_quarter = self.original_quarter;
        pace.original_week = self.original_week;
    }
}
