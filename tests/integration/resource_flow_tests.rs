//! Expense and budget flows, page and API
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::test_utils::{flat_file_app, json_body, location, memory_app, notice_texts, TestClient};

const COFFEE: [(&str, &str); 4] = [
    ("title", "Coffee"),
    ("amount", "4.50"),
    ("category", "Food"),
    ("date", "2024-03-01"),
];

async fn signed_in(app: axum::Router, email: &str) -> TestClient {
    let mut client = TestClient::new(app);
    client.sign_up(email, "test1234").await;
    client
}

async fn create_api(client: &mut TestClient, kind: &str, body: Value) -> Value {
    let token = client.csrf_token().await;
    let response = client
        .api(Method::POST, &format!("/api/v1/{kind}"), Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

async fn coffee_scenario(mut client: TestClient) {
    let response = client.post_form("/expenses", &COFFEE).await;
    assert_eq!(location(&response), "/expenses");

    let page = client.page("/expenses").await;
    assert_eq!(notice_texts(&page), ["Expense added successfully!"]);
    assert_eq!(page["data"]["count"], 1);
    let record = &page["data"]["records"][0];
    assert_eq!(record["title"], "Coffee");
    assert_eq!(record["amount"], 4.5);
    let id = record["id"].as_str().unwrap().to_string();

    let response = client
        .post_form(&format!("/expenses/{id}/delete"), &[])
        .await;
    assert_eq!(location(&response), "/expenses");
    let page = client.page("/expenses").await;
    assert_eq!(notice_texts(&page), ["Expense deleted successfully!"]);
    assert_eq!(page["data"]["count"], 0);

    let response = client
        .api(Method::GET, &format!("/api/v1/expenses/{id}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Expense not found.");
}

#[tokio::test]
async fn test_coffee_lifecycle_in_memory() {
    let (app, _) = memory_app();
    coffee_scenario(signed_in(app, "user@example.com").await).await;
}

#[tokio::test]
async fn test_coffee_lifecycle_on_flat_files() {
    let (app, _state, _temp_dir) = flat_file_app();
    coffee_scenario(signed_in(app, "user@example.com").await).await;
}

#[tokio::test]
async fn test_flat_file_rejects_duplicate_email() {
    let (app, _state, _temp_dir) = flat_file_app();
    let mut client = TestClient::new(app);
    client.register("user@example.com", "test1234").await;

    let response = client.register("user@example.com", "test1234").await;
    assert_eq!(location(&response), "/sessions/register");
    assert_eq!(
        notice_texts(&client.page("/sessions/register").await),
        ["Email already registered."]
    );
}

#[tokio::test]
async fn test_update_and_duplicate_notices() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    client.post_form("/expenses", &COFFEE).await;
    client.post_form("/expenses", &COFFEE).await;
    let page = client.page("/expenses").await;
    assert_eq!(
        notice_texts(&page),
        ["Expense added successfully!", "This expense already exists!"]
    );
    assert_eq!(page["notices"][1]["kind"], "info");
    assert_eq!(page["data"]["count"], 1);
    let id = page["data"]["records"][0]["id"].as_str().unwrap().to_string();

    let response = client
        .post_form(
            &format!("/expenses/{id}"),
            &[
                ("title", "Tea"),
                ("amount", "3"),
                ("category", "Food"),
                ("date", "2024-03-02"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/expenses");

    let page = client.page(&format!("/expenses/{id}")).await;
    assert_eq!(notice_texts(&page), ["Expense updated successfully!"]);
    assert_eq!(page["data"]["title"], "Tea");
}

#[tokio::test]
async fn test_invalid_input_becomes_a_notice_or_400() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    let response = client
        .post_form("/expenses", &[("amount", "4.50"), ("category", "Food")])
        .await;
    assert_eq!(location(&response), "/expenses");
    let page = client.page("/expenses").await;
    assert_eq!(notice_texts(&page), ["Please provide title"]);
    assert_eq!(page["notices"][0]["kind"], "error");

    let token = client.csrf_token().await;
    let response = client
        .api(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({ "name": "ab", "limit": 10, "period": "monthly" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Budget name must be at least 3 characters long"
    );
}

#[tokio::test]
async fn test_other_owners_records_are_not_found() {
    let (app, _) = memory_app();
    let mut alice = signed_in(app.clone(), "alice@example.com").await;
    let mut bob = signed_in(app, "bob@example.com").await;

    let record = create_api(
        &mut alice,
        "expenses",
        json!({ "title": "Rent", "amount": 900, "category": "Home", "date": "2024-03-01" }),
    )
    .await;
    let path = format!("/api/v1/expenses/{}", record["id"].as_str().unwrap());

    let token = bob.csrf_token().await;
    let get = bob.api(Method::GET, &path, None, None).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);
    let patch = bob
        .api(
            Method::PATCH,
            &path,
            Some(json!({ "title": "Mine", "amount": 1, "category": "Home", "date": "2024-03-01" })),
            Some(&token),
        )
        .await;
    assert_eq!(patch.status(), StatusCode::NOT_FOUND);
    let delete = bob.api(Method::DELETE, &path, None, Some(&token)).await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    // page routes answer the same way
    let page_delete = bob
        .post_form(&format!("/expenses/{}/delete", record["id"].as_str().unwrap()), &[])
        .await;
    assert_eq!(location(&page_delete), "/expenses");
    assert_eq!(
        notice_texts(&bob.page("/expenses").await),
        ["Expense not found."]
    );

    let still_there = json_body(alice.api(Method::GET, &path, None, None).await).await;
    assert_eq!(still_there["title"], "Rent");
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    let response = client
        .api(Method::GET, "/api/v1/budgets/not-a-uuid", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expense_filters() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    for (title, category, date) in [
        ("Coffee", "Food & Drink", "2024-01-05"),
        ("Bus", "Transport", "2024-01-20"),
        ("Lunch", "food", "2024-02-10"),
    ] {
        create_api(
            &mut client,
            "expenses",
            json!({ "title": title, "amount": 5, "category": category, "date": date }),
        )
        .await;
    }

    let all = json_body(client.api(Method::GET, "/api/v1/expenses", None, None).await).await;
    let titles: Vec<_> = all["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Lunch", "Bus", "Coffee"]);

    let food = json_body(
        client
            .api(Method::GET, "/api/v1/expenses?category=FOOD", None, None)
            .await,
    )
    .await;
    assert_eq!(food["count"], 2);

    let january = json_body(
        client
            .api(
                Method::GET,
                "/api/v1/expenses?startDate=2024-01-05&endDate=2024-01-20",
                None,
                None,
            )
            .await,
    )
    .await;
    assert_eq!(january["count"], 2);

    let bad = client
        .api(Method::GET, "/api/v1/expenses?endDate=soon", None, None)
        .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_budget_api_lifecycle() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    let budget = create_api(
        &mut client,
        "budgets",
        json!({ "name": "Groceries", "limit": 300, "period": "monthly" }),
    )
    .await;
    assert_eq!(budget["active"], true);
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let token = client.csrf_token().await;
    let paused = client
        .api(
            Method::PATCH,
            &path,
            Some(json!({ "name": "Groceries", "limit": 250, "period": "monthly", "active": false })),
            Some(&token),
        )
        .await;
    assert_eq!(paused.status(), StatusCode::OK);
    assert_eq!(json_body(paused).await["active"], false);

    // leaving `active` out keeps the current flag
    let renamed = client
        .api(
            Method::PATCH,
            &path,
            Some(json!({ "name": "Food", "limit": 250, "period": "weekly" })),
            Some(&token),
        )
        .await;
    let renamed = json_body(renamed).await;
    assert_eq!(renamed["name"], "Food");
    assert_eq!(renamed["period"], "weekly");
    assert_eq!(renamed["active"], false);

    let listed = json_body(
        client
            .api(Method::GET, "/api/v1/budgets?category=fo", None, None)
            .await,
    )
    .await;
    assert_eq!(listed["count"], 1);

    let deleted = client.api(Method::DELETE, &path, None, Some(&token)).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let gone = client.api(Method::GET, &path, None, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_budget_page_flow() {
    let (app, _) = memory_app();
    let mut client = signed_in(app, "user@example.com").await;

    let response = client
        .post_form(
            "/budgets",
            &[("name", "Travel"), ("limit", "1200"), ("period", "yearly")],
        )
        .await;
    assert_eq!(location(&response), "/budgets");

    let page = client.page("/budgets").await;
    assert_eq!(notice_texts(&page), ["Budget added successfully!"]);
    assert_eq!(page["data"]["records"][0]["name"], "Travel");
    assert_eq!(page["data"]["records"][0]["active"], true);
}
