// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core functionality for the fintrack server: accounts, sessions, CSRF
//! protection and owner-scoped expense/budget records.

pub mod auth;
pub mod config;
pub mod cookie;
pub mod csrf;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod notice;
pub mod resources;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, DefaultAuth, SessionManager};
use crate::config::Settings;
use crate::middleware::RateLimiter;
use crate::notice::NoticeQueue;
use crate::storage::Storage;

pub use crate::router::create_router;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Credential store and verifier
    pub auth: Arc<dyn AuthService>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Flash notices, keyed by session
    pub notices: Arc<NoticeQueue>,
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    pub rate_limiter: Arc<RateLimiter>,
}

impl<S: Storage> AppState<S> {
    /// Create a new application state from validated settings
    pub fn new(storage: S, config: Settings) -> anyhow::Result<Self> {
        config.validate()?;

        let auth = DefaultAuth::new(
            storage.clone(),
            config.hash.params()?,
            config.password_requirements.clone(),
        )?;
        let sessions = SessionManager::new_with_timeouts(
            config.session.absolute_ttl(),
            config.session.idle_ttl(),
        );
        let rate_limiter = RateLimiter::new(
            Duration::from_secs(config.rate_limit.window_secs),
            config.rate_limit.max_requests,
        );

        Ok(Self {
            auth: Arc::new(auth),
            sessions: Arc::new(sessions),
            notices: Arc::new(NoticeQueue::new()),
            settings: Arc::new(config),
            storage,
            rate_limiter: Arc::new(rate_limiter),
        })
    }

    /// Periodic housekeeping: expired sessions, the notices they left
    /// behind, and stale rate-limit windows.
    pub fn sweep_expired(&self) {
        self.sessions.cleanup_expired();
        let orphaned = self.notices.retain_live(|id| self.sessions.contains(id));
        if orphaned > 0 {
            tracing::debug!(orphaned, "notice queues of expired sessions dropped");
        }
        self.rate_limiter.cleanup();
    }
}
