// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use fintrack_common::{Budget, Expense};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::handlers::{auth, resources};
use crate::middleware::{rate_limit, session_pipeline};
use crate::resources::OwnedResource;
use crate::storage::{ResourceStore, Storage};
use crate::AppState;

/// Create the application router.
///
/// Layers run outside-in: tracing, rate limit, then the session pipeline,
/// so a rate-limited request never creates a session.
pub fn create_router<S: Storage>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(auth::root))
        .route("/health", get(health_handler))
        .route(
            "/sessions/register",
            get(auth::register_show::<S>).post(auth::register_do::<S>),
        )
        .route(
            "/sessions/logon",
            get(auth::logon_show::<S>).post(auth::logon_do::<S>),
        )
        .route("/sessions/logoff", post(auth::logoff::<S>))
        .route("/api/v1/csrf", get(auth::csrf_token))
        .merge(resource_routes::<S, Expense>())
        .merge(resource_routes::<S, Budget>())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_pipeline::<S>,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Page and API routes for one resource kind
fn resource_routes<S, R>() -> Router<Arc<AppState<S>>>
where
    S: Storage + ResourceStore<R>,
    R: OwnedResource,
{
    let kind = R::COLLECTION;
    Router::new()
        .route(
            &format!("/{kind}"),
            get(resources::list_page::<S, R>).post(resources::create_page::<S, R>),
        )
        .route(
            &format!("/{kind}/{{id}}"),
            get(resources::show_page::<S, R>).post(resources::update_page::<S, R>),
        )
        .route(
            &format!("/{kind}/{{id}}/delete"),
            post(resources::delete_page::<S, R>),
        )
        .route(
            &format!("/api/v1/{kind}"),
            get(resources::list_api::<S, R>).post(resources::create_api::<S, R>),
        )
        .route(
            &format!("/api/v1/{kind}/{{id}}"),
            get(resources::get_api::<S, R>)
                .patch(resources::update_api::<S, R>)
                .delete(resources::delete_api::<S, R>),
        )
}

/// Health check handler
pub async fn health_handler() -> &'static str {
    "Healthy"
}

async fn not_found() -> AppError {
    AppError::NotFound("Page".into())
}
