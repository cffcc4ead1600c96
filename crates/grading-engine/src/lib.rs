//! grading-engine — GPA grading orchestration.
//!
//! The [`Grader`] fetches a page of grades and a named scale from a
//! [`GradeStore`](grading_store::GradeStore), resolves every grade against
//! the scale, and returns the annotated page:
//!
//! ```text
//! Grader::get_grades(scale, limit, offset)
//!   ├── GradeStore::fetch_grades_page(limit, offset)   → grades + total
//!   ├── GradeStore::fetch_scale(scale or default)      → ScaleTable
//!   └── ScaleTable::resolve(grade) for each grade      → GradePage
//! ```
//!
//! The API layer depends on the [`GradeService`] trait rather than on
//! `Grader` directly, so handlers can be exercised against stubs.

pub mod error;
pub mod grader;

pub use error::{GradingError, GradingResult};
pub use grader::{GradeService, Grader};
