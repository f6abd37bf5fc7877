//! MySQL implementations of the store interfaces

pub mod attempt_log_repository;
pub mod rate_limit_store;
pub mod user_repository;

pub use attempt_log_repository::MySqlAttemptLogRepository;
pub use rate_limit_store::MySqlRateLimitStore;
pub use user_repository::MySqlUserRepository;

use sw_core::errors::StoreError;

/// Map a query failure to an unavailable store
pub(crate) fn unavailable(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        StoreError::Unavailable {
            message: format!("{}: {}", context, e),
        }
    }
}

/// Map a column decode failure to a corrupt record
pub(crate) fn corrupt(column: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Corrupt {
        message: format!("Failed to get {}: {}", column, e),
    }
}
