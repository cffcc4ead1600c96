//! PgGradeStore — PostgreSQL-backed grade store.
//!
//! All SQL is runtime-checked (`sqlx::query_as`, not `sqlx::query!`) so the
//! crate builds without a live database.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::{debug, info};
use uuid::Uuid;

use grading_core::config::{DatabaseConfig, SslMode};
use grading_core::{Grade, ScaleEntry, ScaleTable, ScaleType};

use crate::error::{StoreError, StoreResult};
use crate::queries::*;
use crate::store::GradeStore;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

#[derive(sqlx::FromRow)]
struct GradeRow {
    student_id: Uuid,
    course_id: Uuid,
    grade: i32,
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Grade {
            student_id: row.student_id,
            course_id: row.course_id,
            grade: row.grade,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScaleRow {
    min: i32,
    gpa: String,
}

fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Build sqlx connect options from the service's database section.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name)
        .ssl_mode(ssl_mode(config.ssl_mode));
    if config.password.is_empty() {
        options
    } else {
        options.password(&config.password)
    }
}

/// Open a connection pool sized and bounded by `config`.
pub async fn connect(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(connect_options(config))
        .await
        .map_err(map_err!(Connect))?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "connected to postgres"
    );
    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(map_err!(Migrate))?;
    info!("database migrations applied");
    Ok(())
}

/// Grade store reading from the `grade` and `scale` tables.
#[derive(Clone)]
pub struct PgGradeStore {
    pool: PgPool,
}

impl PgGradeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a grade; `created_at` is assigned by the database.
    pub async fn insert_grade(&self, grade: &Grade) -> StoreResult<()> {
        sqlx::query(INSERT_GRADE)
            .bind(grade.student_id)
            .bind(grade.course_id)
            .bind(grade.grade)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        Ok(())
    }

    /// Add or replace the thresholds of a scale.
    pub async fn put_scale(&self, name: &ScaleType, entries: &[ScaleEntry]) -> StoreResult<()> {
        let mut txn = self.pool.begin().await.map_err(map_err!(Query))?;
        for entry in entries {
            sqlx::query(UPSERT_SCALE_ENTRY)
                .bind(name.as_str())
                .bind(entry.min)
                .bind(&entry.gpa)
                .execute(&mut *txn)
                .await
                .map_err(map_err!(Query))?;
        }
        txn.commit().await.map_err(map_err!(Query))?;
        debug!(scale = %name, entries = entries.len(), "scale stored");
        Ok(())
    }
}

#[async_trait]
impl GradeStore for PgGradeStore {
    async fn fetch_grades_page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Grade>, i64)> {
        let rows = sqlx::query_as::<_, GradeRow>(SELECT_GRADES_PAGE)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("failed to get grades: {e}")))?;

        let total = sqlx::query_scalar::<_, i64>(COUNT_GRADES)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("failed to get total: {e}")))?;

        Ok((rows.into_iter().map(Grade::from).collect(), total))
    }

    async fn fetch_scale(&self, name: &ScaleType) -> StoreResult<ScaleTable> {
        let rows = sqlx::query_as::<_, ScaleRow>(SELECT_SCALE)
            .bind(name.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_err!(Query))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("scale {name}")));
        }

        Ok(rows
            .into_iter()
            .map(|row| ScaleEntry::new(row.min, row.gpa))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_modes_map_one_to_one() {
        assert!(matches!(ssl_mode(SslMode::Disable), PgSslMode::Disable));
        assert!(matches!(ssl_mode(SslMode::Require), PgSslMode::Require));
        assert!(matches!(ssl_mode(SslMode::VerifyCa), PgSslMode::VerifyCa));
        assert!(matches!(ssl_mode(SslMode::VerifyFull), PgSslMode::VerifyFull));
    }

    #[test]
    fn connect_options_carry_config() {
        let config = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 6543,
            name: "grades".to_string(),
            ..DatabaseConfig::default()
        };
        let options = connect_options(&config);
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("grades"));
        assert_eq!(options.get_username(), "postgres");
    }
}
