//! Authorization gate.
//!
//! Only answers whether a session carries an identity. Ownership scoping is
//! enforced by every store call taking the owner as part of its key.
use fintrack_common::IdentityId;

use super::Session;
use crate::error::AppError;

/// Identity bound to the session, if any
pub fn resolve_identity(session: &Session) -> Option<IdentityId> {
    session.identity
}

/// Pass with the caller's identity or fail with `Unauthenticated`
pub fn require_authenticated(session: &Session) -> Result<IdentityId, AppError> {
    resolve_identity(session).ok_or(AppError::Unauthenticated)
}
