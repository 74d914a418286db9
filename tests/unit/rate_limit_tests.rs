// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! Request rate limiting, directly and through the router
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use backend_lib::{create_router, middleware::RateLimiter, storage::MemoryStore, AppState};

use crate::test_utils::{json_body, test_settings, TestClient};

#[test]
fn test_rate_limiter_allows_up_to_budget() {
    let limiter = RateLimiter::new(Duration::from_secs(60), 3);
    for _ in 0..3 {
        assert!(limiter.check("127.0.0.1"));
    }
    assert!(!limiter.check("127.0.0.1"));
    assert!(limiter.check("127.0.0.2"));
}

#[tokio::test]
async fn test_router_answers_429_past_budget() {
    let mut settings = test_settings();
    settings.rate_limit.max_requests = 2;
    let state = Arc::new(AppState::new(MemoryStore::new(), settings).unwrap());
    let mut client = TestClient::new(create_router(state));

    assert_eq!(client.get("/health").await.status(), StatusCode::OK);
    assert_eq!(client.get("/health").await.status(), StatusCode::OK);

    let limited = client.get("/health").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(limited).await;
    assert_eq!(body["error"]["code"], "RATE_001");
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_budget() {
    let mut settings = test_settings();
    settings.rate_limit.max_requests = 2;
    let state = Arc::new(AppState::new(MemoryStore::new(), settings).unwrap());
    let mut client = TestClient::new(create_router(state));

    for (i, expected) in [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
        .into_iter()
        .enumerate()
    {
        let request = Request::builder()
            .uri("/health")
            .header("x-forwarded-for", format!("198.51.100.{i}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(client.send(request).await.status(), expected);
    }
}
