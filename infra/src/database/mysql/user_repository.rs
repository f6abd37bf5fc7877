//! MySQL implementation of the UserRepository trait.
//!
//! The `users` table is owned by the account service; this lookup only
//! reads its `id` and `phone` columns.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sw_core::domain::value_objects::{PhoneNumber, SubjectId};
use sw_core::errors::{StoreError, StoreResult};
use sw_core::repositories::UserRepository;

use super::{corrupt, unavailable};

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_subject_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<SubjectId>> {
        let row = sqlx::query("SELECT id FROM users WHERE phone = ? LIMIT 1")
            .bind(phone.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable("Failed to find user by phone"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(corrupt("id"))?;
        let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt {
            message: format!("Invalid user UUID: {}", e),
        })?;

        Ok(Some(SubjectId(id)))
    }
}
