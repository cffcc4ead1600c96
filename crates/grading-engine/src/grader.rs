//! Grader — joins a page of grades with a grading scale.
//!
//! For each request the `Grader`:
//! - Fetches one page of grades and the total grade count
//! - Rejects an empty page
//! - Fetches the requested scale, falling back to the configured default
//! - Resolves every grade to a GPA label, preserving store order
//!
//! Store calls run one after the other, so a failed grade fetch never
//! touches the scale table. Both calls share a single deadline taken when
//! the request starts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use grading_core::config::GradingConfig;
use grading_core::{Grade, GradePage, GradeWithGpa, Pagination, ScaleTable, ScaleType};
use grading_store::{GradeStore, StoreError, StoreResult};

use crate::error::{GradingError, GradingResult};

/// The operation the HTTP layer needs from the grading engine.
#[async_trait]
pub trait GradeService: Send + Sync {
    /// Grade one page of students against the named scale.
    ///
    /// An unspecified (empty) scale name selects the default scale.
    async fn get_grades(
        &self,
        scale: &ScaleType,
        limit: i64,
        offset: i64,
    ) -> GradingResult<GradePage>;
}

/// Stateless grading orchestrator. Cheap to clone and share across requests.
#[derive(Clone)]
pub struct Grader {
    store: Arc<dyn GradeStore>,
    default_scale: ScaleType,
    request_timeout: Duration,
}

impl Grader {
    pub fn new(store: Arc<dyn GradeStore>, config: &GradingConfig) -> Self {
        Self {
            store,
            default_scale: config.default_scale(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Override the per-request deadline taken from config.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The scale actually looked up for a requested name.
    pub fn effective_scale(&self, requested: &ScaleType) -> ScaleType {
        if requested.is_unspecified() {
            self.default_scale.clone()
        } else {
            requested.clone()
        }
    }

    async fn fetch_grades(
        &self,
        limit: i64,
        offset: i64,
        deadline: Instant,
    ) -> GradingResult<(Vec<Grade>, i64)> {
        self.bounded(deadline, self.store.fetch_grades_page(limit, offset))
            .await
            .map_err(|e| {
                error!(error = %e, limit, offset, "failed to fetch grades");
                GradingError::FetchGradesFailed(e)
            })
    }

    async fn fetch_scale(
        &self,
        requested: &ScaleType,
        deadline: Instant,
    ) -> GradingResult<ScaleTable> {
        let name = self.effective_scale(requested);
        match self.bounded(deadline, self.store.fetch_scale(&name)).await {
            Ok(table) => {
                debug!(scale = %name, entries = table.len(), "fetched scale");
                Ok(table)
            }
            Err(StoreError::NotFound(_)) => {
                warn!(scale = %name, "scale not found");
                Err(GradingError::ScaleNotFound(name))
            }
            Err(e) => {
                error!(scale = %name, error = %e, "failed to fetch scale");
                Err(GradingError::FetchScaleFailed(e))
            }
        }
    }

    /// Run a store call, giving up once the request deadline has passed.
    async fn bounded<T>(
        &self,
        deadline: Instant,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout_at(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.request_timeout)),
        }
    }
}

/// Annotate each grade with its label, in input order.
fn grade_all(grades: Vec<Grade>, table: &ScaleTable) -> Vec<GradeWithGpa> {
    grades
        .into_iter()
        .map(|grade| GradeWithGpa {
            gpa: table.resolve(grade.grade).to_string(),
            grade,
        })
        .collect()
}

#[async_trait]
impl GradeService for Grader {
    async fn get_grades(
        &self,
        scale: &ScaleType,
        limit: i64,
        offset: i64,
    ) -> GradingResult<GradePage> {
        let deadline = Instant::now() + self.request_timeout;
        let (grades, total) = self.fetch_grades(limit, offset, deadline).await?;
        if grades.is_empty() {
            return Err(GradingError::NoGradesAvailable);
        }

        let table = self.fetch_scale(scale, deadline).await?;

        Ok(GradePage {
            grades: grade_all(grades, &table),
            pagination: Pagination {
                total,
                limit,
                offset,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grading_core::ScaleEntry;
    use grading_store::MemoryGradeStore;
    use uuid::Uuid;

    fn grade(score: i32) -> Grade {
        Grade {
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            grade: score,
        }
    }

    fn cdf() -> Vec<ScaleEntry> {
        vec![
            ScaleEntry::new(40, "C"),
            ScaleEntry::new(30, "D"),
            ScaleEntry::new(20, "F"),
        ]
    }

    fn test_store(scores: &[i32]) -> MemoryGradeStore {
        let store = MemoryGradeStore::new();
        for &score in scores {
            store.push_grade(grade(score));
        }
        store.put_scale(ScaleType::DEFAULT, cdf());
        store.put_scale(
            "ects",
            vec![ScaleEntry::new(90, "A"), ScaleEntry::new(50, "E"), ScaleEntry::new(0, "F")],
        );
        store
    }

    fn grader(store: &MemoryGradeStore) -> Grader {
        Grader::new(Arc::new(store.clone()), &GradingConfig::default())
    }

    fn labels(page: &GradePage) -> Vec<&str> {
        page.grades.iter().map(|g| g.gpa.as_str()).collect()
    }

    #[tokio::test]
    async fn unspecified_scale_uses_default() {
        let store = test_store(&[25, 33, 43]);
        let page = grader(&store)
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap();

        assert_eq!(labels(&page), vec!["F", "D", "C"]);
        assert_eq!(
            page.grades.iter().map(|g| g.grade.grade).collect::<Vec<_>>(),
            vec![25, 33, 43]
        );
        assert_eq!(
            page.pagination,
            Pagination {
                total: 3,
                limit: 10,
                offset: 0
            }
        );
    }

    #[tokio::test]
    async fn named_scale_is_used() {
        let store = test_store(&[95, 60, 10]);
        let page = grader(&store)
            .get_grades(&ScaleType::from("ects"), 10, 0)
            .await
            .unwrap();
        assert_eq!(labels(&page), vec!["A", "E", "F"]);
    }

    #[tokio::test]
    async fn configured_default_scale_is_honored() {
        let store = test_store(&[95]);
        let config = GradingConfig {
            default_scale: "ects".to_string(),
            ..GradingConfig::default()
        };
        let grader = Grader::new(Arc::new(store.clone()), &config);

        assert_eq!(grader.effective_scale(&ScaleType::default()), ScaleType::from("ects"));
        let page = grader.get_grades(&ScaleType::default(), 10, 0).await.unwrap();
        assert_eq!(labels(&page), vec!["A"]);
    }

    #[tokio::test]
    async fn grade_below_scale_is_not_available() {
        let store = test_store(&[5]);
        let page = grader(&store)
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap();
        assert_eq!(labels(&page), vec!["N/A"]);
    }

    #[tokio::test]
    async fn total_and_window_are_passed_through() {
        let store = test_store(&[20, 30, 40, 50, 60]);
        let page = grader(&store)
            .get_grades(&ScaleType::default(), 2, 3)
            .await
            .unwrap();

        assert_eq!(page.grades.len(), 2);
        assert_eq!(labels(&page), vec!["C", "C"]);
        assert_eq!(
            page.pagination,
            Pagination {
                total: 5,
                limit: 2,
                offset: 3
            }
        );
    }

    #[tokio::test]
    async fn unknown_scale_is_scale_not_found() {
        let store = test_store(&[25]);
        let err = grader(&store)
            .get_grades(&ScaleType::from("wrong"), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::ScaleNotFound(ref name) if name.as_str() == "wrong"));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn empty_page_is_no_grades_available() {
        let store = test_store(&[]);
        let err = grader(&store)
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::NoGradesAvailable));
        assert!(!err.is_client_error());
        assert_eq!(store.scale_calls(), 0);
    }

    #[tokio::test]
    async fn offset_past_last_page_is_no_grades_available() {
        let store = test_store(&[25, 33]);
        let err = grader(&store)
            .get_grades(&ScaleType::default(), 10, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::NoGradesAvailable));
    }

    #[tokio::test]
    async fn grade_fetch_failure_short_circuits() {
        let store = test_store(&[25]);
        store.fail_grades(Some("connection refused"));

        let err = grader(&store)
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::FetchGradesFailed(StoreError::Query(_))));
        assert_eq!(store.grade_calls(), 1);
        assert_eq!(store.scale_calls(), 0);
    }

    #[tokio::test]
    async fn scale_fetch_failure_is_not_scale_not_found() {
        let store = test_store(&[25]);
        store.fail_scales(Some("connection reset"));

        let err = grader(&store)
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::FetchScaleFailed(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let store = test_store(&[25]);
        store.set_delay(Some(Duration::from_secs(5)));
        let grader = grader(&store).with_request_timeout(Duration::from_millis(20));

        let err = grader
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::FetchGradesFailed(StoreError::Timeout(_))));
        assert_eq!(store.scale_calls(), 0);
    }

    #[tokio::test]
    async fn deadline_covers_both_store_calls() {
        // Each call alone fits the deadline; together they do not.
        let store = test_store(&[25]);
        store.set_delay(Some(Duration::from_millis(300)));
        let grader = grader(&store).with_request_timeout(Duration::from_millis(500));

        let err = grader
            .get_grades(&ScaleType::default(), 10, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::FetchScaleFailed(StoreError::Timeout(_))));
        assert_eq!(store.grade_calls(), 1);
        assert_eq!(store.scale_calls(), 1);
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let store = test_store(&[25, 33, 43, 51]);
        let grader = grader(&store);

        let first = grader.get_grades(&ScaleType::default(), 3, 1).await.unwrap();
        let second = grader.get_grades(&ScaleType::default(), 3, 1).await.unwrap();
        assert_eq!(first, second);
    }
}
