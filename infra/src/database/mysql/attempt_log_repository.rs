//! MySQL implementation of the AttemptLogRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use sw_core::domain::entities::{AttemptFilter, VerificationAttempt};
use sw_core::errors::StoreResult;
use sw_core::repositories::AttemptLogRepository;

use super::{corrupt, unavailable};

/// MySQL implementation of AttemptLogRepository
///
/// Rows in `verification_attempts` are inserted and deleted, never updated.
pub struct MySqlAttemptLogRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAttemptLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Column and bound value for a filter
    fn filter_column<'a>(filter: AttemptFilter<'a>) -> (&'static str, &'a str) {
        match filter {
            AttemptFilter::Phone(phone) => ("phone", phone),
            AttemptFilter::Ip(ip) => ("ip_address", ip),
        }
    }
}

#[async_trait]
impl AttemptLogRepository for MySqlAttemptLogRepository {
    async fn record(&self, attempt: &VerificationAttempt) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_attempts (id, phone, ip_address, success, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt.id.to_string())
        .bind(&attempt.phone)
        .bind(attempt.ip_address.as_deref())
        .bind(attempt.success)
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable("Failed to record verification attempt"))?;

        Ok(())
    }

    async fn recent_attempt_times(
        &self,
        filter: AttemptFilter<'_>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DateTime<Utc>>> {
        let (column, value) = Self::filter_column(filter);
        let query = format!(
            r#"
            SELECT created_at
            FROM verification_attempts
            WHERE {} = ? AND created_at >= ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
            column
        );

        let rows = sqlx::query(&query)
            .bind(value)
            .bind(since)
            .bind(u64::try_from(limit).unwrap_or(u64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable("Failed to read verification attempts"))?;

        rows.iter()
            .map(|row| {
                row.try_get::<DateTime<Utc>, _>("created_at")
                    .map_err(corrupt("created_at"))
            })
            .collect()
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let result = sqlx::query("DELETE FROM verification_attempts WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(unavailable("Failed to delete old verification attempts"))?;

        Ok(result.rows_affected() as usize)
    }
}
