//! CSRF guard behaviour through the full middleware stack
use axum::http::{header::SET_COOKIE, Method, StatusCode};
use serde_json::json;

use crate::test_utils::{json_body, memory_app, notice_texts, TestClient};

fn coffee() -> serde_json::Value {
    json!({
        "title": "Coffee",
        "amount": 4.5,
        "category": "Food",
        "date": "2024-03-01"
    })
}

#[tokio::test]
async fn test_mutation_without_token_is_rejected_and_changes_nothing() {
    let (app, state) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;
    let sessions_before = state.sessions.active_count();

    let response = client
        .api(Method::POST, "/api/v1/expenses", Some(coffee()), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "CSRF_001");

    let page = client.page("/expenses").await;
    assert_eq!(page["data"]["count"], 0);
    assert!(notice_texts(&page).is_empty());
    assert_eq!(state.sessions.active_count(), sessions_before);
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;

    let response = client
        .api(Method::POST, "/api/v1/expenses", Some(coffee()), Some("forged"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post_form_raw("/sessions/logoff", &[("_csrf", "forged")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    // still signed in
    assert_eq!(client.page("/expenses").await["user"], "user@example.com");
}

#[tokio::test]
async fn test_header_token_authorizes_api_calls() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;
    let token = client.csrf_token().await;

    let response = client
        .api(Method::POST, "/api/v1/expenses", Some(coffee()), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_post_without_session_creates_nothing() {
    let (app, state) = memory_app();
    let mut client = TestClient::new(app);

    let response = client
        .post_form_raw(
            "/sessions/register",
            &[
                ("email", "user@example.com"),
                ("password", "test1234"),
                ("password1", "test1234"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(state.sessions.active_count(), 0);

    // the account was not created either
    client.page("/sessions/logon").await;
    let logon = client.logon("user@example.com", "test1234").await;
    assert_eq!(crate::test_utils::location(&logon), "/sessions/logon");
}

#[tokio::test]
async fn test_token_from_logged_out_session_is_rejected() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;
    let old_token = client.csrf_token().await;

    client.post_form("/sessions/logoff", &[]).await;
    // first contact after logoff issues a fresh anonymous session
    client.page("/sessions/logon").await;
    assert!(client.session().is_some());

    let response = client
        .post_form_raw(
            "/sessions/logon",
            &[
                ("email", "user@example.com"),
                ("password", "test1234"),
                ("_csrf", old_token.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_is_bound_to_its_session() {
    let (app, _) = memory_app();
    let mut alice = TestClient::new(app.clone());
    let mut mallory = TestClient::new(app);
    alice.sign_up("alice@example.com", "test1234").await;
    mallory.page("/sessions/logon").await;
    let mallory_token = mallory.csrf_token().await;

    let response = alice
        .api(
            Method::POST,
            "/api/v1/expenses",
            Some(coffee()),
            Some(&mallory_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_safe_methods_need_no_token() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;
    client.forget_cookie();

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(client.session().is_some());
}
