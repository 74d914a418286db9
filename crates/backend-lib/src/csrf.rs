// ============================
// crates/backend-lib/src/csrf.rs
// ============================
//! Synchronizer-token CSRF guard.
//!
//! Every session owns one token (see [`crate::auth::Session::csrf_token`]).
//! Any request that can change state must echo it back, either in the
//! `x-csrf-token` header or as the `_csrf` field of a urlencoded form. The
//! check runs before any handler; a rejected request leaves sessions,
//! notices and records untouched.
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method};

use crate::auth::Session;
use crate::error::AppError;

/// Header carrying the token for script clients
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Form field carrying the token for HTML forms
pub const CSRF_FORM_FIELD: &str = "_csrf";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Safe methods are exempt; everything else is checked.
pub fn is_mutating(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Pull the submitted token from the header, falling back to the form body
pub fn submitted_token(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if let Some(token) = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token.to_string());
    }

    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));
    if !is_form {
        return None;
    }

    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.into_owned())
}

/// Constant-time comparison of the bound and submitted tokens
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    let (a, b) = (expected.as_bytes(), submitted.as_bytes());
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Gate a mutating request. Passes the session through on success.
///
/// A request without a live session cannot hold a valid token, so it is
/// rejected the same way as a mismatch.
pub fn check_csrf(session: Option<Session>, submitted: Option<&str>) -> Result<Session, AppError> {
    match (session, submitted) {
        (Some(session), Some(token)) if tokens_match(&session.csrf_token, token) => Ok(session),
        _ => Err(AppError::CsrfRejected),
    }
}
