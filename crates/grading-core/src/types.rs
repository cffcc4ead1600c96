//! Shared types used across grading crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of a grading scale (e.g. `default`, `ects`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleType(String);

impl ScaleType {
    /// Scale used when the caller does not name one.
    pub const DEFAULT: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no scale name was supplied.
    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ScaleType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScaleType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single student's score in a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub grade: i32,
}

/// One threshold of a scale: scores `>= min` earn `gpa`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleEntry {
    pub min: i32,
    pub gpa: String,
}

impl ScaleEntry {
    pub fn new(min: i32, gpa: impl Into<String>) -> Self {
        Self {
            min,
            gpa: gpa.into(),
        }
    }
}

/// The entries of one named scale, sorted by `min` descending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleTable {
    entries: Vec<ScaleEntry>,
}

impl ScaleTable {
    /// Wrap entries that are already sorted by `min` descending.
    pub fn new(entries: Vec<ScaleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScaleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether thresholds are non-increasing, as the resolver requires.
    pub fn is_sorted_descending(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].min >= w[1].min)
    }
}

impl FromIterator<ScaleEntry> for ScaleTable {
    fn from_iter<I: IntoIterator<Item = ScaleEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A grade annotated with its resolved GPA label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeWithGpa {
    pub grade: Grade,
    pub gpa: String,
}

/// Window metadata returned alongside a page of grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of grades in the whole population, not just this page.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// One page of graded results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradePage {
    pub grades: Vec<GradeWithGpa>,
    pub pagination: Pagination,
}
