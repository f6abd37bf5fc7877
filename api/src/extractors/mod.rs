//! Request extractors

pub mod client_origin;

pub use client_origin::{client_origin, RequestOrigin};
