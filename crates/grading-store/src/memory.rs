//! MemoryGradeStore — in-process grade store.
//!
//! Grades are kept in insertion order, which stands in for creation order.
//! Scale entries are sorted on write so reads honor the same contract as
//! the PostgreSQL store. Failures and latency can be injected to exercise
//! callers' error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use grading_core::{Grade, ScaleEntry, ScaleTable, ScaleType};

use crate::error::{StoreError, StoreResult};
use crate::store::GradeStore;

#[derive(Default)]
struct Inner {
    grades: Vec<Grade>,
    scales: HashMap<ScaleType, Vec<ScaleEntry>>,
    fail_grades: Option<String>,
    fail_scales: Option<String>,
    delay: Option<Duration>,
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryGradeStore {
    inner: Arc<RwLock<Inner>>,
    grade_calls: Arc<AtomicUsize>,
    scale_calls: Arc<AtomicUsize>,
}

impl MemoryGradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_grade(&self, grade: Grade) {
        self.write().grades.push(grade);
    }

    /// Replace the entries of a scale. Entries are stored highest threshold first.
    pub fn put_scale(&self, name: impl Into<ScaleType>, mut entries: Vec<ScaleEntry>) {
        entries.sort_by(|a, b| b.min.cmp(&a.min));
        self.write().scales.insert(name.into(), entries);
    }

    /// Make every grade fetch fail with `message` (or succeed again with `None`).
    pub fn fail_grades(&self, message: Option<&str>) {
        self.write().fail_grades = message.map(str::to_string);
    }

    /// Make every scale fetch fail with `message` (or succeed again with `None`).
    pub fn fail_scales(&self, message: Option<&str>) {
        self.write().fail_scales = message.map(str::to_string);
    }

    /// Sleep for `delay` before answering any fetch.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Number of `fetch_grades_page` calls served so far.
    pub fn grade_calls(&self) -> usize {
        self.grade_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_scale` calls served so far.
    pub fn scale_calls(&self) -> usize {
        self.scale_calls.load(Ordering::SeqCst)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn pause(&self) {
        let delay = self.read().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GradeStore for MemoryGradeStore {
    async fn fetch_grades_page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Grade>, i64)> {
        self.grade_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let inner = self.read();
        if let Some(message) = &inner.fail_grades {
            return Err(StoreError::Query(message.clone()));
        }

        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let page = inner.grades.iter().skip(skip).take(take).copied().collect();
        let total = i64::try_from(inner.grades.len()).unwrap_or(i64::MAX);
        Ok((page, total))
    }

    async fn fetch_scale(&self, name: &ScaleType) -> StoreResult<ScaleTable> {
        self.scale_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let inner = self.read();
        if let Some(message) = &inner.fail_scales {
            return Err(StoreError::Query(message.clone()));
        }

        match inner.scales.get(name) {
            Some(entries) if !entries.is_empty() => Ok(ScaleTable::new(entries.clone())),
            _ => Err(StoreError::NotFound(format!("scale {name}"))),
        }
    }
}
