// ============================
// crates/backend-lib/src/notice.rs
// ============================
//! Per-session flash notices.
//!
//! Notices are pushed by one request and shown by the next page render for
//! the same session, then gone.
use std::sync::Arc;

use dashmap::DashMap;
use fintrack_common::Notice;

use crate::auth::SessionId;

/// FIFO notice queues keyed by session
#[derive(Clone, Debug, Default)]
pub struct NoticeQueue {
    queues: Arc<DashMap<SessionId, Vec<Notice>>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, session: &SessionId, notice: Notice) {
        self.queues.entry(session.clone()).or_default().push(notice);
    }

    /// Take every pending notice in push order. The queue is removed as one
    /// step, so two concurrent renders never show the same notice.
    pub fn drain_all(&self, session: &SessionId) -> Vec<Notice> {
        self.queues
            .remove(session)
            .map(|(_, notices)| notices)
            .unwrap_or_default()
    }

    /// Move pending notices to a regenerated session, ahead of any already
    /// queued there.
    pub fn transfer(&self, from: &SessionId, to: &SessionId) {
        let moved = self.drain_all(from);
        if moved.is_empty() {
            return;
        }
        let mut target = self.queues.entry(to.clone()).or_default();
        let queued = std::mem::take(target.value_mut());
        *target.value_mut() = moved.into_iter().chain(queued).collect();
    }

    /// Forget everything queued for a session
    pub fn discard(&self, session: &SessionId) {
        self.queues.remove(session);
    }

    /// Drop the queues of sessions `live` no longer recognises; returns how
    /// many were dropped
    pub fn retain_live(&self, live: impl Fn(&SessionId) -> bool) -> usize {
        let before = self.queues.len();
        self.queues.retain(|session, _| live(session));
        before.saturating_sub(self.queues.len())
    }

    pub fn queued_sessions(&self) -> usize {
        self.queues.len()
    }

    pub fn pending(&self, session: &SessionId) -> usize {
        self.queues.get(session).map_or(0, |q| q.len())
    }
}
