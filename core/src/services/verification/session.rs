//! In-process tracking of verification session state

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::value_objects::{PhoneNumber, VerificationPurpose, VerificationState};

#[derive(Debug, Clone, Copy)]
struct TrackedState {
    state: VerificationState,
    expires_at: DateTime<Utc>,
}

/// Per (phone, purpose) session state with a TTL.
///
/// Expired entries read as [`VerificationState::NoCodeSent`] and are purged
/// by the sweeper.
pub struct SessionTracker {
    ttl: Duration,
    sessions: RwLock<HashMap<(String, VerificationPurpose), TrackedState>>,
}

impl SessionTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn state(
        &self,
        phone: &PhoneNumber,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
    ) -> VerificationState {
        let sessions = self.sessions.read().await;
        match sessions.get(&(phone.as_str().to_string(), purpose)) {
            Some(tracked) if now < tracked.expires_at => tracked.state,
            _ => VerificationState::NoCodeSent,
        }
    }

    /// Move the session towards `next` and refresh its TTL.
    /// Returns the resulting state.
    pub async fn transition(
        &self,
        phone: &PhoneNumber,
        purpose: VerificationPurpose,
        next: VerificationState,
        now: DateTime<Utc>,
    ) -> VerificationState {
        let mut sessions = self.sessions.write().await;
        let key = (phone.as_str().to_string(), purpose);

        let current = match sessions.get(&key) {
            Some(tracked) if now < tracked.expires_at => tracked.state,
            _ => VerificationState::NoCodeSent,
        };
        let state = current.advance(next);

        sessions.insert(
            key,
            TrackedState {
                state,
                expires_at: now + self.ttl,
            },
        );
        state
    }

    /// Drop expired entries. Returns the number removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, tracked| now < tracked.expires_at);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
