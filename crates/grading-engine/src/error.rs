//! Grading error types.

use grading_core::ScaleType;
use grading_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`Grader::get_grades`](crate::Grader::get_grades).
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("fetching grades failed: {0}")]
    FetchGradesFailed(#[source] StoreError),

    /// The requested page held no grades. An empty final page lands here too.
    #[error("no grades available")]
    NoGradesAvailable,

    #[error("fetching scale failed: {0}")]
    FetchScaleFailed(#[source] StoreError),

    #[error("scale not found: {0}")]
    ScaleNotFound(ScaleType),

    /// Reserved: resolution is total, so nothing currently produces this.
    #[error("calculating grades with GPA failed: {0}")]
    ResolutionFailed(String),
}

impl GradingError {
    /// Whether the caller asked for something that does not exist, as
    /// opposed to the service failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GradingError::ScaleNotFound(_))
    }
}

pub type GradingResult<T> = Result<T, GradingError>;
