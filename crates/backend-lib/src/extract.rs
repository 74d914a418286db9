//! Extractors reading the pipeline's [`RequestContext`].
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use fintrack_common::IdentityId;

use crate::auth::require_authenticated;
use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::storage::Storage;
use crate::AppState;

/// Where page flows send anonymous callers
pub const LOGON_PATH: &str = "/sessions/logon";

fn context(parts: &Parts) -> Result<Arc<RequestContext>, AppError> {
    parts
        .extensions
        .get::<Arc<RequestContext>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session pipeline not installed".into()))
}

/// The caller's session, signed in or not
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Arc<RequestContext>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context(parts).map(CurrentSession)
    }
}

/// A signed-in API caller. Anonymous callers get a 401 JSON error.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: IdentityId,
    pub context: Arc<RequestContext>,
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = context(parts)?;
        let identity = require_authenticated(&context.session)?;
        Ok(Self { identity, context })
    }
}

/// A signed-in page visitor. Anonymous visitors are sent to the logon page
/// with a notice explaining why.
#[derive(Debug, Clone)]
pub struct PageUser {
    pub identity: IdentityId,
    pub context: Arc<RequestContext>,
}

impl<S: Storage> FromRequestParts<Arc<AppState<S>>> for PageUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let context = context(parts).map_err(IntoResponse::into_response)?;
        match require_authenticated(&context.session) {
            Ok(identity) => Ok(Self { identity, context }),
            Err(denied) => {
                if let Some(notice) = denied.notice() {
                    state.notices.push(&context.session.id, notice);
                }
                Err(Redirect::to(LOGON_PATH).into_response())
            },
        }
    }
}
