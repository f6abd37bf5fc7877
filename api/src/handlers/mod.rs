//! Response helpers shared by the routes

pub mod error;

pub use error::{handle_auth_error, internal_error, validation_error_response};
