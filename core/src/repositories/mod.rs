pub mod attempt_log;
pub mod rate_limit;
pub mod user;

pub use attempt_log::AttemptLogRepository;
pub use rate_limit::RateLimitStore;
pub use user::UserRepository;

#[cfg(test)]
pub use attempt_log::MockAttemptLog;
#[cfg(test)]
pub use rate_limit::MockRateLimitStore;
#[cfg(test)]
pub use user::MockUserRepository;
