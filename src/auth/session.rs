//! Bearer-token sessions with expiry.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::UserProfile;
use crate::types::{HubError, Role};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionManager {
    ttl: Duration,
    sessions: HashMap<String, Session>,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    pub fn issue(&mut self, user: UserProfile) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        debug!(role = %session.user.role, "Session issued");
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn validate(&self, token: &str) -> Result<&Session, HubError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<&Session, HubError> {
        match self.sessions.get(token) {
            Some(s) if !s.is_expired_at(now) => Ok(s),
            Some(_) => Err(HubError::Unauthorized("Session expired".into())),
            None => Err(HubError::Unauthorized("Not logged in".into())),
        }
    }

    /// Validate and check the session belongs to `role`.
    pub fn require_role(&self, token: &str, role: Role) -> Result<&Session, HubError> {
        let session = self.validate(token)?;
        if session.user.role != role {
            return Err(HubError::Unauthorized(format!("{role} access required")));
        }
        Ok(session)
    }

    /// Logout. Returns false for unknown tokens.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired_at(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
