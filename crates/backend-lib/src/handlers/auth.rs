//! Registration, logon and logoff.
use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use fintrack_common::{LoginForm, Notice, RegisterForm};
use serde_json::json;
use zeroize::Zeroize;

use super::{redirect_with_notice, render, settle_failure};
use crate::cookie::{clear_session_cookie, session_cookie};
use crate::error::AppError;
use crate::extract::{CurrentSession, LOGON_PATH};
use crate::storage::Storage;
use crate::AppState;

pub const REGISTER_PATH: &str = "/sessions/register";
pub const HOME_PATH: &str = "/expenses";

/// `GET /`
pub async fn root(CurrentSession(context): CurrentSession) -> Redirect {
    if context.identity.is_some() {
        Redirect::to(HOME_PATH)
    } else {
        Redirect::to(LOGON_PATH)
    }
}

async fn auth_page<S: Storage>(
    state: &AppState<S>,
    context: &crate::middleware::RequestContext,
) -> Result<Response, AppError> {
    if context.identity.is_some() {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }
    Ok(render(state, context, ()).await?.into_response())
}

/// `GET /sessions/register`
pub async fn register_show<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentSession(context): CurrentSession,
) -> Result<Response, AppError> {
    auth_page(&state, &context).await
}

/// `POST /sessions/register`
pub async fn register_do<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentSession(context): CurrentSession,
    Form(form): Form<RegisterForm>,
) -> Response {
    let RegisterForm {
        email,
        password,
        password1,
    } = form;
    let email = email.unwrap_or_default();
    let mut password = password.unwrap_or_default();
    let mut confirm = password1.unwrap_or_default();

    let matched = password == confirm;
    confirm.zeroize();
    if !matched {
        password.zeroize();
        return settle_failure(
            &state.notices,
            &context,
            AppError::PasswordMismatch,
            REGISTER_PATH,
        );
    }

    match state.auth.register(&email, password).await {
        Ok(_) => redirect_with_notice(
            &state.notices,
            &context,
            Notice::info("Registration successful! Please log in."),
            LOGON_PATH,
        ),
        Err(e) => settle_failure(&state.notices, &context, e, REGISTER_PATH),
    }
}

/// `GET /sessions/logon`
pub async fn logon_show<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentSession(context): CurrentSession,
) -> Result<Response, AppError> {
    auth_page(&state, &context).await
}

/// `POST /sessions/logon`
///
/// On success the anonymous session is replaced: new id, new CSRF token,
/// pending notices carried over.
pub async fn logon_do<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentSession(context): CurrentSession,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    let identity = match state.auth.verify(&email, password).await {
        Ok(identity) => identity,
        Err(e) => return settle_failure(&state.notices, &context, e, LOGON_PATH),
    };

    let session = state.sessions.attach(&context.session, identity.id);
    state.notices.transfer(&context.session.id, &session.id);

    match session_cookie(&session.id, state.settings.secure_cookies()) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to(HOME_PATH)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /sessions/logoff`
pub async fn logoff<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentSession(context): CurrentSession,
) -> Result<Response, AppError> {
    state.sessions.destroy(&context.session.id);
    state.notices.discard(&context.session.id);
    if let Some(identity) = context.identity {
        tracing::info!(target: "security", %identity, "session ended by logoff");
    }

    let cookie = clear_session_cookie(state.settings.secure_cookies())?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to(LOGON_PATH)).into_response())
}

/// `GET /api/v1/csrf`
pub async fn csrf_token(CurrentSession(context): CurrentSession) -> Json<serde_json::Value> {
    Json(json!({ "csrf_token": context.session.csrf_token }))
}
