//! Registration route handlers
//!
//! Registration only proves ownership of the phone. Creating the account
//! is left to the caller once `/api/register/verify` succeeds.

pub mod send_code;
pub mod verify_code;

pub use send_code::send_code;
pub use verify_code::verify_code;
