//! # Stork Watch API
//!
//! actix-web surface over the verification coordinator: client origin
//! extraction, the login and registration routes, the session cookie
//! contract and the error to HTTP status mapping.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod telemetry;

pub use app::{create_app, AppState};
