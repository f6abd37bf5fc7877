//! Value objects representing immutable domain concepts.

pub mod client_origin;
pub mod phone_number;
pub mod verification;
pub mod verification_code;

// Re-export commonly used types
pub use client_origin::ClientOrigin;
pub use phone_number::PhoneNumber;
pub use verification::{SubjectId, VerificationPurpose, VerificationState};
pub use verification_code::VerificationCode;
