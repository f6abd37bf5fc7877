//! Session cookie contract
//!
//! On a successful login the subject id is handed to the client in an
//! HttpOnly, SameSite=Lax cookie scoped to `/`. Logout overwrites it with
//! an empty value and `Max-Age=0`.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use sw_core::domain::value_objects::SubjectId;
use sw_shared::config::SessionConfig;

/// Cookie carrying `subject` for `config.max_age_seconds`
pub fn session_cookie(config: &SessionConfig, subject: SubjectId) -> Cookie<'static> {
    build(config, subject.to_string(), Duration::seconds(config.max_age_seconds))
}

/// Cookie that clears the session
pub fn cleared_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    build(config, String::new(), Duration::ZERO)
}

fn build(config: &SessionConfig, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), value)
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.secure)
        .max_age(max_age)
        .finish()
}
