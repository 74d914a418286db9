//! Page and API handlers shared by every owned resource kind.
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use fintrack_common::{ListQuery, Notice, RecordList};

use super::{redirect_with_notice, render, settle_failure};
use crate::error::AppError;
use crate::extract::{Authenticated, PageUser};
use crate::resources::{service, OwnedResource};
use crate::storage::{ResourceStore, Storage};
use crate::AppState;

fn index_path<R: OwnedResource>() -> String {
    format!("/{}", R::COLLECTION)
}

fn done<R: OwnedResource>(verb: &str) -> Notice {
    Notice::info(format!("{} {verb} successfully!", R::LABEL))
}

/// `GET /{kind}`
pub async fn list_page<S, R>(
    State(state): State<Arc<AppState<S>>>,
    user: PageUser,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let result = match service::list::<R, S>(&state.storage, user.identity, query).await {
        Ok(records) => render(&state, &user.context, RecordList::new(records)).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(page) => page.into_response(),
        // a rejected filter falls back to the unfiltered list
        Err(e) => settle_failure(&state.notices, &user.context, e, &index_path::<R>()),
    }
}

/// `GET /{kind}/{id}`
pub async fn show_page<S, R>(
    State(state): State<Arc<AppState<S>>>,
    user: PageUser,
    Path(id): Path<String>,
) -> Response
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let result = match service::get::<R, S>(&state.storage, user.identity, &id).await {
        Ok(record) => render(&state, &user.context, record).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(page) => page.into_response(),
        Err(e) => settle_failure(&state.notices, &user.context, e, &index_path::<R>()),
    }
}

/// `POST /{kind}`
pub async fn create_page<S, R>(
    State(state): State<Arc<AppState<S>>>,
    user: PageUser,
    Form(form): Form<R::Form>,
) -> Response
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let to = index_path::<R>();
    match service::create::<R, S>(&state.storage, user.identity, form).await {
        Ok(_) => redirect_with_notice(&state.notices, &user.context, done::<R>("added"), &to),
        Err(e) => settle_failure(&state.notices, &user.context, e, &to),
    }
}

/// `POST /{kind}/{id}`
pub async fn update_page<S, R>(
    State(state): State<Arc<AppState<S>>>,
    user: PageUser,
    Path(id): Path<String>,
    Form(form): Form<R::Form>,
) -> Response
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let to = index_path::<R>();
    match service::update::<R, S>(&state.storage, user.identity, &id, form).await {
        Ok(_) => redirect_with_notice(&state.notices, &user.context, done::<R>("updated"), &to),
        Err(e) => settle_failure(&state.notices, &user.context, e, &to),
    }
}

/// `POST /{kind}/{id}/delete`
pub async fn delete_page<S, R>(
    State(state): State<Arc<AppState<S>>>,
    user: PageUser,
    Path(id): Path<String>,
) -> Response
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let to = index_path::<R>();
    match service::delete::<R, S>(&state.storage, user.identity, &id).await {
        Ok(()) => redirect_with_notice(&state.notices, &user.context, done::<R>("deleted"), &to),
        Err(e) => settle_failure(&state.notices, &user.context, e, &to),
    }
}

/// `GET /api/v1/{kind}`
pub async fn list_api<S, R>(
    State(state): State<Arc<AppState<S>>>,
    caller: Authenticated,
    Query(query): Query<ListQuery>,
) -> Result<Json<RecordList<R>>, AppError>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let records = service::list::<R, S>(&state.storage, caller.identity, query).await?;
    Ok(Json(RecordList::new(records)))
}

/// `POST /api/v1/{kind}`
pub async fn create_api<S, R>(
    State(state): State<Arc<AppState<S>>>,
    caller: Authenticated,
    Json(form): Json<R::Form>,
) -> Result<(StatusCode, Json<R>), AppError>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let record = service::create::<R, S>(&state.storage, caller.identity, form).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/v1/{kind}/{id}`
pub async fn get_api<S, R>(
    State(state): State<Arc<AppState<S>>>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    Ok(Json(
        service::get::<R, S>(&state.storage, caller.identity, &id).await?,
    ))
}

/// `PATCH /api/v1/{kind}/{id}`
pub async fn update_api<S, R>(
    State(state): State<Arc<AppState<S>>>,
    caller: Authenticated,
    Path(id): Path<String>,
    Json(form): Json<R::Form>,
) -> Result<Json<R>, AppError>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    Ok(Json(
        service::update::<R, S>(&state.storage, caller.identity, &id, form).await?,
    ))
}

/// `DELETE /api/v1/{kind}/{id}`
pub async fn delete_api<S, R>(
    State(state): State<Arc<AppState<S>>>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    service::delete::<R, S>(&state.storage, caller.identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
