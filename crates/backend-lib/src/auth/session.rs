// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session issuance, regeneration and lookup.
//!
//! Sessions move through `Anonymous -> Authenticated -> gone`. Logging in
//! never upgrades a session in place: [`SessionManager::attach`] issues a new
//! id and a new CSRF token and drops the anonymous one, so an id planted
//! before login is useless afterwards.
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ::metrics::{counter, gauge};
use dashmap::DashMap;
use fintrack_common::IdentityId;

use super::token_generator::generate_secure_token;
use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_DESTROYED, SESSION_EXPIRED};

/// Absolute session lifetime (7 days)
pub const SESSION_ABSOLUTE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Idle timeout (2 hours)
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60 * 2);

/// Opaque session identifier carried in the session cookie
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(generate_secure_token())
    }

    /// Wrap a value read from a cookie. The value is only a lookup key.
    pub fn from_cookie(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep full ids out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionId({prefix}…)")
    }
}

/// Session information
#[derive(Clone, Debug)]
pub struct Session {
    pub id: SessionId,
    /// `None` for anonymous sessions
    pub identity: Option<IdentityId>,
    /// Synchronizer token bound to this session
    pub csrf_token: String,
    pub created_at: Instant,
    pub last_active: Instant,
}

impl Session {
    fn issue(identity: Option<IdentityId>) -> Self {
        let now = Instant::now();
        Self {
            id: SessionId::generate(),
            identity,
            csrf_token: generate_secure_token(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// In-memory session store with per-key locking
#[derive(Clone, Debug)]
pub struct SessionManager {
    sessions: Arc<DashMap<SessionId, Session>>,
    absolute_ttl: Duration,
    idle_ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    /// Create a new session manager with the default timeouts
    pub fn new() -> Self {
        Self::new_with_timeouts(SESSION_ABSOLUTE_TTL, SESSION_IDLE_TTL)
    }

    /// Create a new session manager with custom timeouts
    pub fn new_with_timeouts(absolute_ttl: Duration, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            absolute_ttl,
            idle_ttl,
        }
    }

    /// Start an anonymous session for a first-contact request
    pub fn create_anonymous(&self) -> Session {
        self.store(Session::issue(None))
    }

    /// Bind a verified identity. Always issues a new id and CSRF token and
    /// removes the previous session.
    pub fn attach(&self, session: &Session, identity: IdentityId) -> Session {
        self.sessions.remove(&session.id);
        let fresh = self.store(Session::issue(Some(identity)));
        tracing::info!(
            target: "security",
            %identity,
            "session regenerated on login"
        );
        fresh
    }

    /// Look up a session by cookie value. Unknown or expired ids resolve to
    /// `None` (anonymous) rather than an error.
    pub fn resolve(&self, id: &SessionId) -> Option<Session> {
        let now = Instant::now();
        {
            let mut entry = self.sessions.get_mut(id)?;
            if !self.is_expired(entry.value(), now) {
                entry.last_active = now;
                return Some(entry.value().clone());
            }
        }

        if self
            .sessions
            .remove_if(id, |_, session| self.is_expired(session, now))
            .is_some()
        {
            counter!(SESSION_EXPIRED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        }
        None
    }

    /// Remove a session. Removing a session that is already gone is fine.
    pub fn destroy(&self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            counter!(SESSION_DESTROYED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        }
        removed
    }

    /// Drop every expired session; returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !self.is_expired(session, now));
        let removed = before.saturating_sub(self.sessions.len());

        if removed > 0 {
            counter!(SESSION_EXPIRED).increment(removed as u64);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
            tracing::debug!(removed, "expired sessions swept");
        }
        removed
    }

    /// Whether a session is still held. Does not touch `last_active`.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    fn store(&self, session: Session) -> Session {
        self.sessions.insert(session.id.clone(), session.clone());
        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        session
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        now.duration_since(session.created_at) >= self.absolute_ttl
            || now.duration_since(session.last_active) >= self.idle_ttl
    }
}
