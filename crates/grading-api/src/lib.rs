//! grading-api — REST API for the grading service.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/liveness` | Process is up |
//! | GET | `/readiness` | Process accepts traffic |
//! | GET | `/gpa?scaleType=&limit=&offset=` | One page of grades with GPA labels |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use grading_engine::GradeService;

/// Page size used when `limit` is omitted or zero.
pub const DEFAULT_LIMIT: i64 = 10;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub grader: Arc<dyn GradeService>,
    pub default_limit: i64,
}

impl ApiState {
    pub fn new(grader: Arc<dyn GradeService>) -> Self {
        Self {
            grader,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(self, default_limit: i64) -> Self {
        Self {
            default_limit,
            ..self
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/liveness", get(handlers::liveness))
        .route("/readiness", get(handlers::readiness))
        .route("/gpa", get(handlers::get_gpa))
        .with_state(state)
}
