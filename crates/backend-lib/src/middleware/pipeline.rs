//! Per-request session pipeline.
//!
//! Runs, in order: session load from the cookie, the CSRF check for mutating
//! methods, and identity resolution. The result is stored in the request
//! extensions as an [`Arc<RequestContext>`] for the extractors in
//! [`crate::extract`]. The authorization gate itself runs in those
//! extractors, because only the route knows whether it is protected.
use std::sync::Arc;

use ::metrics::counter;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use fintrack_common::IdentityId;

use crate::auth::{resolve_identity, Session};
use crate::csrf::{check_csrf, is_mutating, submitted_token};
use crate::error::AppError;
use crate::metrics::CSRF_REJECTED;
use crate::storage::Storage;
use crate::{cookie, AppState};

/// Largest request body the pipeline will buffer to look for a form token
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// What the pipeline learned about the caller
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Session,
    pub identity: Option<IdentityId>,
    /// The session was created by this request and its cookie must be set
    pub fresh: bool,
}

impl RequestContext {
    fn new(session: Session, fresh: bool) -> Self {
        let identity = resolve_identity(&session);
        Self {
            session,
            identity,
            fresh,
        }
    }
}

/// Session/CSRF middleware
pub async fn session_pipeline<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let existing = cookie::session_id(&parts.headers).and_then(|id| state.sessions.resolve(&id));

    let (context, request) = if is_mutating(&parts.method) {
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return AppError::Validation("Request body could not be read".into())
                    .into_response()
            },
        };

        let submitted = submitted_token(&parts.headers, &bytes);
        match check_csrf(existing, submitted.as_deref()) {
            Ok(session) => (
                RequestContext::new(session, false),
                Request::from_parts(parts, Body::from(bytes)),
            ),
            Err(rejection) => {
                counter!(CSRF_REJECTED).increment(1);
                tracing::warn!(
                    target: "security",
                    method = %parts.method,
                    path = %parts.uri.path(),
                    token_present = submitted.is_some(),
                    "CSRF check failed"
                );
                return rejection.into_response();
            },
        }
    } else {
        let context = match existing {
            Some(session) => RequestContext::new(session, false),
            None => RequestContext::new(state.sessions.create_anonymous(), true),
        };
        (context, Request::from_parts(parts, body))
    };

    let context = Arc::new(context);
    let mut request = request;
    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;

    if context.fresh {
        match cookie::session_cookie(&context.session.id, state.settings.secure_cookies()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            },
            Err(e) => return e.into_response(),
        }
    }
    response
}
