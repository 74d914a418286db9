//! HTTP handlers.
//!
//! Page handlers answer with a [`PageView`] payload or a redirect; failures a
//! visitor can recover from become notices on the next page. API handlers
//! answer with JSON and [`AppError`] bodies.
use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use fintrack_common::{Notice, PageView};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::notice::NoticeQueue;
use crate::storage::Storage;
use crate::AppState;

pub mod auth;
pub mod resources;

/// Build the page payload, draining the session's notices into it
pub async fn render<S: Storage, T: Serialize>(
    state: &AppState<S>,
    context: &RequestContext,
    data: T,
) -> Result<Json<PageView<T>>, AppError> {
    let user = match context.identity {
        Some(id) => state.auth.identity(id).await?.map(|identity| identity.email),
        None => None,
    };
    let notices = state.notices.drain_all(&context.session.id);

    Ok(Json(PageView {
        csrf_token: context.session.csrf_token.clone(),
        user,
        notices,
        data,
    }))
}

/// Queue a notice for the caller and send them to `to`
pub fn redirect_with_notice(
    notices: &NoticeQueue,
    context: &RequestContext,
    notice: Notice,
    to: &str,
) -> Response {
    notices.push(&context.session.id, notice);
    Redirect::to(to).into_response()
}

/// Turn a failed page action into a notice and a redirect. Errors with no
/// notice (infrastructure failures) answer directly.
pub fn settle_failure(
    notices: &NoticeQueue,
    context: &RequestContext,
    err: AppError,
    to: &str,
) -> Response {
    match err.notice() {
        Some(notice) => redirect_with_notice(notices, context, notice, to),
        None => err.into_response(),
    }
}
