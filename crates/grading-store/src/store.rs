//! GradeStore — the read interface the grading engine depends on.

use async_trait::async_trait;

use grading_core::{Grade, ScaleTable, ScaleType};

use crate::error::StoreResult;

/// Read access to persisted grades and scales.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait GradeStore: Send + Sync {
    /// Fetch one page of grades in creation order, plus the count of all
    /// grades regardless of the window.
    async fn fetch_grades_page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Grade>, i64)>;

    /// Fetch the named scale sorted by threshold descending.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) when no
    /// entries exist under `name`.
    async fn fetch_scale(&self, name: &ScaleType) -> StoreResult<ScaleTable>;
}
