//! Error types for generation and redistribution.

use crate::models::UnplacedPace;
use crate::validation::ValidationError;

/// Fatal generation failures. No partial projection accompanies them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The request set failed input validation.
    #[error("invalid pace request: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// A forced difficulty pairing joins two excluded categories.
    #[error("{message} ({first} / {second})")]
    ConstraintViolation {
        message: String,
        first: String,
        second: String,
    },

    /// The backoff ladder left paces without a week.
    #[error("{} pace(s) could not be placed", .0.len())]
    Unplaced(Vec<UnplacedPace>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a pace store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("store conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Errors that stop a whole quarter-close run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedistributionError {
    #[error("quarter '{0}' not found")]
    QuarterNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
