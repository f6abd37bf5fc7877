//! Network origin of a request, used as the ip-scoped identifier.

use std::net::IpAddr;

/// Either a validated IP literal or a degraded `fallback-<hash>` bucket for
/// requests that carried no usable address header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientOrigin {
    key: String,
    degraded: bool,
}

impl ClientOrigin {
    pub fn from_ip(ip: IpAddr) -> Self {
        Self {
            key: ip.to_string(),
            degraded: false,
        }
    }

    /// Degraded origin bucketed by a header fingerprint
    pub fn fallback(fingerprint: &str) -> Self {
        Self {
            key: format!("fallback-{}", fingerprint),
            degraded: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The IP literal, or `None` for degraded origins
    pub fn ip_address(&self) -> Option<&str> {
        if self.degraded {
            None
        } else {
            Some(&self.key)
        }
    }
}
