//! Registration, logon and logoff through the router
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::SET_COOKIE, Method, StatusCode};
use backend_lib::{create_router, storage::MemoryStore, AppState};

use crate::test_utils::{flat_file_app, location, memory_app, notice_texts, test_settings, TestClient};

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_root_redirects_by_session_state() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);

    assert_eq!(location(&client.get("/").await), "/sessions/logon");

    client.sign_up("user@example.com", "test1234").await;
    assert_eq!(location(&client.get("/").await), "/expenses");
}

#[tokio::test]
async fn test_register_then_logon() {
    let (app, state) = memory_app();
    let mut client = TestClient::new(app);

    let response = client.register("User@Example.com", "test1234").await;
    assert_eq!(location(&response), "/sessions/logon");

    let page = client.page("/sessions/logon").await;
    assert_eq!(
        notice_texts(&page),
        ["Registration successful! Please log in."]
    );
    assert!(page["user"].is_null());

    let anonymous_sid = client.session().unwrap().to_string();
    let anonymous_token = client.csrf_token().await;

    let response = client.logon("user@example.com", "test1234").await;
    assert_eq!(location(&response), "/expenses");

    // login regenerates the session id and its CSRF token
    let signed_in_sid = client.session().unwrap().to_string();
    assert_ne!(signed_in_sid, anonymous_sid);
    assert_ne!(client.csrf_token().await, anonymous_token);
    assert_eq!(state.sessions.active_count(), 1);

    let page = client.page("/expenses").await;
    assert_eq!(page["user"], "user@example.com");
    assert_eq!(page["data"]["count"], 0);
}

#[tokio::test]
async fn test_signed_in_users_skip_auth_pages() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;

    assert_eq!(location(&client.get("/sessions/logon").await), "/expenses");
    assert_eq!(location(&client.get("/sessions/register").await), "/expenses");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    client.register("user@example.com", "test1234").await;
    client.page("/sessions/logon").await;

    let wrong = client.logon("user@example.com", "nope12345").await;
    assert_eq!(location(&wrong), "/sessions/logon");
    let wrong_notices = notice_texts(&client.page("/sessions/logon").await);

    let unknown = client.logon("ghost@example.com", "test1234").await;
    assert_eq!(location(&unknown), "/sessions/logon");
    let unknown_notices = notice_texts(&client.page("/sessions/logon").await);

    assert_eq!(wrong_notices, ["Incorrect credentials."]);
    assert_eq!(wrong_notices, unknown_notices);
}

#[tokio::test]
async fn test_registration_failures_return_to_register() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);

    client.page("/sessions/register").await;
    let mismatch = client
        .post_form(
            "/sessions/register",
            &[
                ("email", "user@example.com"),
                ("password", "test1234"),
                ("password1", "test12345"),
            ],
        )
        .await;
    assert_eq!(location(&mismatch), "/sessions/register");
    assert_eq!(
        notice_texts(&client.page("/sessions/register").await),
        ["Passwords do not match."]
    );

    client.register("user@example.com", "test1234").await;
    client.page("/sessions/logon").await;

    let duplicate = client.register("USER@example.com", "other123").await;
    assert_eq!(location(&duplicate), "/sessions/register");
    assert_eq!(
        notice_texts(&client.page("/sessions/register").await),
        ["Email already registered."]
    );

    let invalid = client.register("not-an-email", "test1234").await;
    assert_eq!(location(&invalid), "/sessions/register");
    assert_eq!(
        notice_texts(&client.page("/sessions/register").await),
        ["Invalid email address format"]
    );
}

#[tokio::test]
async fn test_protected_page_redirects_with_notice() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);

    let response = client.get("/expenses").await;
    assert_eq!(location(&response), "/sessions/logon");

    let page = client.page("/sessions/logon").await;
    assert_eq!(
        notice_texts(&page),
        ["You can't access that page before logging in."]
    );
}

#[tokio::test]
async fn test_protected_api_answers_401() {
    let (app, _) = memory_app();
    let mut client = TestClient::new(app);
    let response = client.api(Method::GET, "/api/v1/budgets", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logoff_destroys_session() {
    let (app, state) = memory_app();
    let mut client = TestClient::new(app);
    client.sign_up("user@example.com", "test1234").await;
    let signed_in_sid = client.session().unwrap().to_string();

    let response = client.post_form("/sessions/logoff", &[]).await;
    assert!(response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    assert_eq!(location(&response), "/sessions/logon");
    assert!(client.session().is_none());
    assert_eq!(state.sessions.active_count(), 0);

    // replaying the old cookie gets an anonymous session, not the old identity
    let mut replay = TestClient::new(create_router(state.clone()));
    replay.set_session(&signed_in_sid);
    assert_eq!(location(&replay.get("/expenses").await), "/sessions/logon");
}

#[tokio::test]
async fn test_long_email_on_flat_files() {
    let (app, _state, _temp_dir) = flat_file_app();
    let mut client = TestClient::new(app);
    let email = format!("{}@example.com", "a".repeat(200));

    let response = client.register(&email, "test1234").await;
    assert_eq!(location(&response), "/sessions/logon");
    client.page("/sessions/logon").await;

    let unknown = format!("{}@example.com", "b".repeat(200));
    let response = client.logon(&unknown, "test1234").await;
    assert_eq!(location(&response), "/sessions/logon");
    assert_eq!(
        notice_texts(&client.page("/sessions/logon").await),
        ["Incorrect credentials."]
    );

    let response = client.logon(&email, "test1234").await;
    assert_eq!(location(&response), "/expenses");
    assert_eq!(client.page("/expenses").await["user"], email.as_str());
}

#[tokio::test]
async fn test_sweep_drops_notices_of_expired_sessions() {
    let mut settings = test_settings();
    settings.session.idle_ttl_secs = 1;
    let state = Arc::new(AppState::new(MemoryStore::new(), settings).unwrap());
    let app = create_router(state.clone());

    // each cookieless visit gets a session holding the sign-in notice
    for _ in 0..5 {
        let mut visitor = TestClient::new(app.clone());
        assert_eq!(location(&visitor.get("/expenses").await), "/sessions/logon");
    }
    assert_eq!(state.notices.queued_sessions(), 5);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    state.sweep_expired();

    assert_eq!(state.sessions.active_count(), 0);
    assert_eq!(state.notices.queued_sessions(), 0);
}
