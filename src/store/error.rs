use crate::student::ValidationError;
use thiserror::Error;

/// Expected failure outcomes of store operations.
///
/// Absence and validation are the only ways a well-formed call can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Candidate record failed one or more field checks; nothing was written.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<ValidationError>),
    /// No record is stored under the requested identifier.
    #[error("Student {0} not found")]
    NotFound(u64),
}

impl StoreError {
    /// Whether this error signals a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
