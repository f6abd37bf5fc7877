//! Session cookie configuration
//!
//! The cookie is always HttpOnly and SameSite=Lax; only the name, lifetime
//! and Secure flag vary between environments.

use serde::{Deserialize, Serialize};

/// Longest cookie lifetime the session contract allows (30 days)
pub const MAX_SESSION_AGE_SECONDS: i64 = 60 * 60 * 24 * 30;

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Cookie name carrying the subject id
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Cookie lifetime in seconds
    #[serde(default = "default_max_age")]
    pub max_age_seconds: i64,

    /// Send the cookie over HTTPS only
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_seconds: default_max_age(),
            secure: false,
        }
    }
}

impl SessionConfig {
    /// Production settings: Secure cookie
    pub fn production() -> Self {
        Self {
            secure: true,
            ..Default::default()
        }
    }
}

fn default_cookie_name() -> String {
    String::from("session_user")
}

fn default_max_age() -> i64 {
    MAX_SESSION_AGE_SECONDS
}
