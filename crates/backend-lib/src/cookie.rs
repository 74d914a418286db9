//! Session cookie parsing and issuing.
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

use crate::auth::SessionId;
use crate::error::AppError;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "fintrack.sid";

fn parse_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Session id presented by the client, if any
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    parse_cookie(headers, SESSION_COOKIE).map(SessionId::from_cookie)
}

fn cookie_header(value: &str, extra: &str, secure: bool) -> Result<HeaderValue, AppError> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={value}; HttpOnly; SameSite=Strict; Path=/{extra}{secure}"
    ))
    .map_err(|e| AppError::Internal(format!("invalid cookie header: {e}")))
}

/// `Set-Cookie` value binding the browser to `id`
pub fn session_cookie(id: &SessionId, secure: bool) -> Result<HeaderValue, AppError> {
    cookie_header(id.as_str(), "", secure)
}

/// `Set-Cookie` value that expires the session cookie
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    cookie_header("", "; Max-Age=0", secure)
}
