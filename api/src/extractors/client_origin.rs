//! Client origin extraction
//!
//! Headers are tried in order: first entry of `X-Forwarded-For`, then
//! `X-Real-IP`, then `CF-Connecting-IP`. A value only counts when it parses
//! as an IPv4 or IPv6 literal. Requests with no usable header share a
//! degraded bucket keyed by a hash of `User-Agent` and `Accept`.

use std::future::{ready, Ready};
use std::net::IpAddr;

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use sha2::{Digest, Sha256};
use sw_core::domain::value_objects::ClientOrigin;

const ORIGIN_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Resolve the origin of a request from its headers
pub fn client_origin(headers: &HeaderMap) -> ClientOrigin {
    for name in ORIGIN_HEADERS {
        let candidate = headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|value| value.parse::<IpAddr>().ok());

        if let Some(ip) = candidate {
            return ClientOrigin::from_ip(ip);
        }
    }

    ClientOrigin::fallback(&fingerprint(headers))
}

/// First 16 hex characters of sha256(User-Agent + Accept)
fn fingerprint(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    };

    let mut hasher = Sha256::new();
    hasher.update(header("user-agent").as_bytes());
    hasher.update(header("accept").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Extractor wrapping the resolved [`ClientOrigin`]
#[derive(Debug, Clone)]
pub struct RequestOrigin(pub ClientOrigin);

impl FromRequest for RequestOrigin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let origin = client_origin(req.headers());
        if origin.is_degraded() {
            tracing::debug!(origin = %origin.key(), "No usable client IP header");
        }
        ready(Ok(RequestOrigin(origin)))
    }
}
