//! MySQL implementation of the RateLimitStore trait.
//!
//! Each check runs in its own transaction. The placeholder upsert
//! (`INSERT ... ON DUPLICATE KEY UPDATE`) takes the exclusive row lock
//! whether or not the row already existed, and `SELECT ... FOR UPDATE` then
//! reads under that lock. Concurrent checks for one key therefore queue on a
//! single exclusive lock across every process sharing the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use tracing::debug;

use sw_core::domain::entities::{RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitWindow};
use sw_core::errors::StoreResult;
use sw_core::repositories::RateLimitStore;

use super::{corrupt, unavailable};

/// MySQL implementation of RateLimitStore
pub struct MySqlRateLimitStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRateLimitStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_window(row: &MySqlRow) -> StoreResult<RateLimitWindow> {
        Ok(RateLimitWindow {
            count: row.try_get("count").map_err(corrupt("count"))?,
            window_start: row
                .try_get::<DateTime<Utc>, _>("window_start")
                .map_err(corrupt("window_start"))?,
            window_expires_at: row
                .try_get::<DateTime<Utc>, _>("window_expires_at")
                .map_err(corrupt("window_expires_at"))?,
        })
    }
}

#[async_trait]
impl RateLimitStore for MySqlRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision> {
        let storage_key = key.storage_key();
        let placeholder = RateLimitWindow::placeholder(now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(unavailable("Failed to begin rate-limit transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO rate_limit_windows (rate_key, count, window_start, window_expires_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE rate_key = rate_key
            "#,
        )
        .bind(&storage_key)
        .bind(placeholder.count)
        .bind(placeholder.window_start)
        .bind(placeholder.window_expires_at)
        .execute(&mut *tx)
        .await
        .map_err(unavailable("Failed to upsert rate-limit window"))?;

        let row = sqlx::query(
            r#"
            SELECT count, window_start, window_expires_at
            FROM rate_limit_windows
            WHERE rate_key = ?
            FOR UPDATE
            "#,
        )
        .bind(&storage_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(unavailable("Failed to lock rate-limit window"))?;

        let mut window = Self::row_to_window(&row)?;
        let decision = window.admit(policy, now);

        if decision.allowed {
            sqlx::query(
                r#"
                UPDATE rate_limit_windows
                SET count = ?, window_start = ?, window_expires_at = ?
                WHERE rate_key = ?
                "#,
            )
            .bind(window.count)
            .bind(window.window_start)
            .bind(window.window_expires_at)
            .bind(&storage_key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable("Failed to update rate-limit window"))?;
        }

        tx.commit()
            .await
            .map_err(unavailable("Failed to commit rate-limit transaction"))?;

        Ok(decision)
    }

    async fn get_window(&self, key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>> {
        let row = sqlx::query(
            r#"
            SELECT count, window_start, window_expires_at
            FROM rate_limit_windows
            WHERE rate_key = ?
            "#,
        )
        .bind(key.storage_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("Failed to read rate-limit window"))?;

        match row {
            // A placeholder that was never admitted reads as no window
            Some(row) => Self::row_to_window(&row).map(|w| (w.count > 0).then_some(w)),
            None => Ok(None),
        }
    }

    async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM rate_limit_windows WHERE rate_key = ?")
            .bind(key.storage_key())
            .execute(&self.pool)
            .await
            .map_err(unavailable("Failed to reset rate-limit window"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let result = sqlx::query(
            r#"
            DELETE FROM rate_limit_windows
            WHERE DATE_ADD(
                window_expires_at,
                INTERVAL TIMESTAMPDIFF(MICROSECOND, window_start, window_expires_at) MICROSECOND
            ) <= ?
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(unavailable("Failed to sweep rate-limit windows"))?;

        let removed = result.rows_affected() as usize;
        debug!(removed, "Swept stale rate-limit windows");
        Ok(removed)
    }
}
