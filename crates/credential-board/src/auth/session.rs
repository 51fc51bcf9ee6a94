use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use super::guard::{AuthContext, AuthError};
use super::role::Role;
use crate::board::domain::UserId;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    context: AuthContext,
    expires_at: DateTime<Utc>,
}

/// Freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Opaque bearer tokens mapped to the user and role that logged in.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn issue(&self, user_id: UserId, role: Role) -> Result<IssuedSession, AuthError> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let mut raw = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::Unavailable)?;

        let mut sessions = self.sessions.lock().map_err(|_| AuthError::Unavailable)?;
        sessions.insert(
            token.clone(),
            SessionEntry {
                context: AuthContext { user_id, role },
                expires_at,
            },
        );

        Ok(IssuedSession { token, expires_at })
    }

    pub fn resolve(&self, token: &str) -> Result<AuthContext, AuthError> {
        self.resolve_at(token, Utc::now())
    }

    pub(crate) fn resolve_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut sessions = self.sessions.lock().map_err(|_| AuthError::Unavailable)?;
        let SessionEntry {
            context,
            expires_at,
        } = sessions.get(token).cloned().ok_or(AuthError::InvalidToken)?;
        if expires_at <= now {
            sessions.remove(token);
            return Err(AuthError::Expired);
        }
        Ok(context)
    }

    /// Returns whether a session was removed.
    pub fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::Unavailable)?;
        Ok(sessions.remove(token).is_some())
    }

    /// Drop every expired session, returning how many were removed.
    pub fn reap_expired(&self) -> Result<usize, AuthError> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::Unavailable)?;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        Ok(before - sessions.len())
    }

    pub fn active(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.len())
            .unwrap_or_default()
    }
}
