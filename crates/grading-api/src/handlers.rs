//! REST API handlers.
//!
//! `/gpa` delegates to the grading engine and maps its errors onto HTTP
//! statuses: an unknown scale is the caller's mistake (400), anything else
//! is reported as a bare 500 so no internal detail leaks.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use grading_core::{GradePage, ScaleType};
use grading_engine::GradingError;

use crate::ApiState;

/// Error body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

/// Query string accepted by `GET /gpa`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaParams {
    pub scale_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One graded row as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeView {
    pub student_id: String,
    pub course_id: String,
    /// The numeric score, string-encoded.
    pub grade: String,
    pub gpa: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationView {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Body of a successful `GET /gpa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeList {
    pub grades: Vec<GradeView>,
    pub pagination: PaginationView,
}

impl From<GradePage> for GradeList {
    fn from(page: GradePage) -> Self {
        Self {
            grades: page
                .grades
                .into_iter()
                .map(|g| GradeView {
                    student_id: g.grade.student_id.to_string(),
                    course_id: g.grade.course_id.to_string(),
                    grade: g.grade.grade.to_string(),
                    gpa: g.gpa,
                })
                .collect(),
            pagination: PaginationView {
                total: page.pagination.total,
                limit: page.pagination.limit,
                offset: page.pagination.offset,
            },
        }
    }
}

/// Resolved request window: `(scale, limit, offset)`.
fn parse_params(params: GpaParams, default_limit: i64) -> Result<(ScaleType, i64, i64), String> {
    let scale = params.scale_type.map(ScaleType::from).unwrap_or_default();
    let limit = match params.limit.unwrap_or(0) {
        0 => default_limit,
        n if n < 0 => return Err(format!("limit must not be negative, got {n}")),
        n => n,
    };
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(format!("offset must not be negative, got {offset}"));
    }
    Ok((scale, limit, offset))
}

fn grading_error_response(err: &GradingError) -> Response {
    error!(error = %err, "while getting grades");
    if err.is_client_error() {
        error_response(&err.to_string(), StatusCode::BAD_REQUEST)
    } else {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        error_response(status.canonical_reason().unwrap_or("Internal Server Error"), status)
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /liveness
pub async fn liveness() -> impl IntoResponse {
    Json("OK")
}

/// GET /readiness
pub async fn readiness() -> impl IntoResponse {
    Json("OK")
}

// ── GPA ────────────────────────────────────────────────────────

/// GET /gpa
pub async fn get_gpa(
    State(state): State<ApiState>,
    params: Result<Query<GpaParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            error!(error = %rejection, "invalid query parameters");
            return error_response(&rejection.body_text(), StatusCode::BAD_REQUEST);
        }
    };

    let (scale, limit, offset) = match parse_params(params, state.default_limit) {
        Ok(parsed) => parsed,
        Err(msg) => {
            error!(error = %msg, "invalid query parameters");
            return error_response(&msg, StatusCode::BAD_REQUEST);
        }
    };

    debug!(scale = %scale, limit, offset, "grading request");
    match state.grader.get_grades(&scale, limit, offset).await {
        Ok(page) => (StatusCode::OK, Json(GradeList::from(page))).into_response(),
        Err(e) => grading_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use grading_core::{Grade, GradeWithGpa, Pagination};
    use grading_engine::{GradeService, GradingResult};
    use grading_store::StoreError;
    use uuid::Uuid;

    use crate::DEFAULT_LIMIT;

    /// Records the arguments it was called with and replays a canned answer.
    struct StubService {
        answer: Box<dyn Fn() -> GradingResult<GradePage> + Send + Sync>,
        calls: Mutex<Vec<(ScaleType, i64, i64)>>,
    }

    impl StubService {
        fn new(answer: impl Fn() -> GradingResult<GradePage> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                answer: Box::new(answer),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ScaleType, i64, i64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GradeService for StubService {
        async fn get_grades(
            &self,
            scale: &ScaleType,
            limit: i64,
            offset: i64,
        ) -> GradingResult<GradePage> {
            self.calls.lock().unwrap().push((scale.clone(), limit, offset));
            (self.answer)()
        }
    }

    fn graded(score: i32, gpa: &str) -> GradeWithGpa {
        GradeWithGpa {
            grade: Grade {
                student_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
                grade: score,
            },
            gpa: gpa.to_string(),
        }
    }

    fn three_grades() -> GradingResult<GradePage> {
        Ok(GradePage {
            grades: vec![graded(25, "F"), graded(33, "D"), graded(43, "C")],
            pagination: Pagination {
                total: 100,
                limit: 10,
                offset: 0,
            },
        })
    }

    fn test_state(stub: &Arc<StubService>) -> ApiState {
        ApiState::new(stub.clone())
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn params(
        scale: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Query<GpaParams>, QueryRejection> {
        Ok(Query(GpaParams {
            scale_type: scale.map(str::to_string),
            limit,
            offset,
        }))
    }

    #[tokio::test]
    async fn liveness_and_readiness_ok() {
        let resp = liveness().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json::<String>(resp).await, "OK");

        let resp = readiness().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json::<String>(resp).await, "OK");
    }

    #[tokio::test]
    async fn gpa_success() {
        let stub = StubService::new(three_grades);
        let resp = get_gpa(State(test_state(&stub)), params(Some("ects"), Some(10), Some(0))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: GradeList = body_json(resp).await;
        assert_eq!(body.grades.len(), 3);
        assert_eq!(body.grades[0].grade, "25");
        assert_eq!(body.grades[0].gpa, "F");
        assert_eq!(
            body.pagination,
            PaginationView {
                total: 100,
                limit: 10,
                offset: 0
            }
        );
        assert_eq!(stub.calls(), vec![(ScaleType::from("ects"), 10, 0)]);
    }

    #[tokio::test]
    async fn gpa_defaults_missing_params() {
        let stub = StubService::new(three_grades);
        let resp = get_gpa(State(test_state(&stub)), params(None, None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(stub.calls(), vec![(ScaleType::default(), DEFAULT_LIMIT, 0)]);

        let resp = get_gpa(State(test_state(&stub)), params(None, Some(0), Some(20))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(stub.calls()[1], (ScaleType::default(), DEFAULT_LIMIT, 20));
    }

    #[tokio::test]
    async fn gpa_honors_configured_default_limit() {
        let stub = StubService::new(three_grades);
        let state = test_state(&stub).with_default_limit(25);
        let resp = get_gpa(State(state), params(None, None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(stub.calls(), vec![(ScaleType::default(), 25, 0)]);
    }

    #[tokio::test]
    async fn gpa_scale_not_found_is_bad_request() {
        let stub = StubService::new(|| Err(GradingError::ScaleNotFound(ScaleType::from("wrong"))));
        let resp = get_gpa(State(test_state(&stub)), params(Some("wrong"), None, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorBody = body_json(resp).await;
        assert!(body.error.contains("wrong"));
    }

    #[tokio::test]
    async fn gpa_internal_error_hides_detail() {
        let stub = StubService::new(|| {
            Err(GradingError::FetchGradesFailed(StoreError::Query(
                "password authentication failed".to_string(),
            )))
        });
        let resp = get_gpa(State(test_state(&stub)), params(None, None, None)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorBody = body_json(resp).await;
        assert_eq!(body.error, "Internal Server Error");
    }

    #[tokio::test]
    async fn gpa_no_grades_is_internal_error() {
        let stub = StubService::new(|| Err(GradingError::NoGradesAvailable));
        let resp = get_gpa(State(test_state(&stub)), params(None, None, None)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn gpa_negative_window_is_bad_request() {
        let stub = StubService::new(three_grades);
        let resp = get_gpa(State(test_state(&stub)), params(None, Some(-1), None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = get_gpa(State(test_state(&stub)), params(None, None, Some(-5))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn grade_list_wire_format() {
        let page = GradePage {
            grades: vec![graded(43, "C")],
            pagination: Pagination {
                total: 1,
                limit: 10,
                offset: 0,
            },
        };
        let student = page.grades[0].grade.student_id.to_string();
        let value = serde_json::to_value(GradeList::from(page)).unwrap();

        assert_eq!(value["grades"][0]["studentId"], student.as_str());
        assert_eq!(value["grades"][0]["grade"], "43");
        assert_eq!(value["grades"][0]["gpa"], "C");
        assert!(value["grades"][0].get("courseId").is_some());
        assert_eq!(value["pagination"]["total"], 1);
    }
}
