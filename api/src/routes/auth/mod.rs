//! Login route handlers
//!
//! - `POST /api/auth/send-code` - request a login code
//! - `POST /api/auth/verify` - check the code and start a session
//! - `POST /api/auth/logout` - clear the session cookie

pub mod logout;
pub mod send_code;
pub mod verify_code;

pub use logout::logout;
pub use send_code::send_code;
pub use verify_code::verify_code;
