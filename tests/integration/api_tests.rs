//! API integration tests
//!
//! These run against a live server and database:
//! `cargo test -- --ignored` with the server listening on port 8080.

use bibliotheca_server::models::user::{AccountType, Rights, UserClaims, UserRights};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

fn token_for(account_type: AccountType, rights: UserRights) -> String {
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: "integration".to_string(),
        user_id: 1,
        account_type,
        rights,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&jwt_secret())
    .expect("Failed to mint token")
}

fn admin_token() -> String {
    token_for(AccountType::Admin, UserRights::default())
}

fn nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Suffix keeping unique names apart between runs
fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, nanos())
}

/// Student card number, at most 13 characters
fn card_number(prefix: &str) -> String {
    format!("{}{}", prefix, nanos() % 1_000_000_000_000)
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, token: &str, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Book, branch and student ready for loans
struct Fixture {
    book_id: i64,
    branch_id: i64,
    student_id: i64,
    faculty_id: i64,
}

async fn fixture(client: &Client, token: &str) -> Fixture {
    let (status, faculty) = post(client, token, "/faculties", json!({ "name": unique("Faculty") })).await;
    assert_eq!(status, StatusCode::CREATED);
    let faculty_id = faculty["id"].as_i64().expect("faculty id");

    let (status, student) = post(
        client,
        token,
        "/students",
        json!({
            "last_name": "Ivanova",
            "first_name": "Anna",
            "student_id": card_number("S"),
            "faculty_id": faculty_id
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", student);

    let (status, branch) = post(client, token, "/branches", json!({ "name": unique("Branch") })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = post(
        client,
        token,
        "/books",
        json!({ "title": unique("Book"), "page_count": 320, "price": "12.50" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", book);

    Fixture {
        book_id: book["id"].as_i64().expect("book id"),
        branch_id: branch["id"].as_i64().expect("branch id"),
        student_id: student["id"].as_i64().expect("student id"),
        faculty_id,
    }
}

async fn counts(client: &Client, token: &str, f: &Fixture) -> (i64, i64) {
    let (status, body) = get(
        client,
        token,
        &format!("/inventory?book_id={}&branch_id={}", f.book_id, f.branch_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["total_copies"].as_i64().expect("total"),
        body["available_copies"].as_i64().expect("available"),
    )
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();
    let (status, body) = get(&client, "", "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_missing_token_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_read_rights_cannot_issue_loans() {
    let client = Client::new();
    let token = token_for(
        AccountType::Librarian,
        UserRights {
            loans_rights: Rights::Read,
            ..Default::default()
        },
    );

    let (status, _) = post(
        &client,
        &token,
        "/loans",
        json!({ "student_id": 1, "book_id": 1, "branch_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_adjust_creates_record() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    assert_eq!(counts(&client, &token, &f).await, (0, 0));

    let (status, record) = post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["total_copies"], 3);
    assert_eq!(record["available_copies"], 3);
}

#[tokio::test]
#[ignore]
async fn test_adjust_below_zero_is_rejected() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 2 }),
    )
    .await;

    let (status, body) = post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": -3 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InventoryViolation");
    assert_eq!(counts(&client, &token, &f).await, (2, 2));
}

#[tokio::test]
#[ignore]
async fn test_issue_duplicate_and_return() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 10 }),
    )
    .await;

    let loan_request = json!({
        "student_id": f.student_id,
        "book_id": f.book_id,
        "branch_id": f.branch_id
    });

    let (status, loan) = post(&client, &token, "/loans", loan_request.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", loan);
    assert_eq!(loan["status"], "active");
    assert_eq!(counts(&client, &token, &f).await, (10, 9));

    let (status, body) = post(&client, &token, "/loans", loan_request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateActiveLoan");
    assert_eq!(counts(&client, &token, &f).await, (10, 9));

    let loan_id = loan["id"].as_i64().expect("loan id");
    let (status, returned) = post(&client, &token, &format!("/loans/{}/return", loan_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["is_returned"], true);
    assert_eq!(counts(&client, &token, &f).await, (10, 10));

    let (status, body) = post(&client, &token, &format!("/loans/{}/return", loan_id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LoanAlreadyReturned");
    assert_eq!(counts(&client, &token, &f).await, (10, 10));

    let (status, body) = get(&client, &token, &format!("/books/{}/borrowers/count", f.book_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students"], 1);
}

#[tokio::test]
#[ignore]
async fn test_issue_without_available_copies() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    let loan_request = json!({
        "student_id": f.student_id,
        "book_id": f.book_id,
        "branch_id": f.branch_id
    });

    // Not stocked at all
    let (status, body) = post(&client, &token, "/loans", loan_request.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NoAvailableCopies");

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 1 }),
    )
    .await;
    let (status, _) = post(&client, &token, "/loans", loan_request).await;
    assert_eq!(status, StatusCode::CREATED);

    // Second student finds the shelf empty
    let (_, other) = post(
        &client,
        &token,
        "/students",
        json!({
            "last_name": "Petrov",
            "first_name": "Ivan",
            "student_id": card_number("P"),
            "faculty_id": f.faculty_id
        }),
    )
    .await;
    let (status, body) = post(
        &client,
        &token,
        "/loans",
        json!({
            "student_id": other["id"],
            "book_id": f.book_id,
            "branch_id": f.branch_id
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NoAvailableCopies");
    assert_eq!(counts(&client, &token, &f).await, (1, 0));
}

#[tokio::test]
#[ignore]
async fn test_delete_active_loan_restores_stock() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 2 }),
    )
    .await;
    let (_, loan) = post(
        &client,
        &token,
        "/loans",
        json!({ "student_id": f.student_id, "book_id": f.book_id, "branch_id": f.branch_id }),
    )
    .await;
    assert_eq!(counts(&client, &token, &f).await, (2, 1));

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(counts(&client, &token, &f).await, (2, 2));

    let (status, body) = get(&client, &token, &format!("/loans/{}", loan["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchLoan");
}

#[tokio::test]
#[ignore]
async fn test_delete_returned_loan_keeps_stock() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 3 }),
    )
    .await;
    let (status, loan) = post(
        &client,
        &token,
        "/loans",
        json!({ "student_id": f.student_id, "book_id": f.book_id, "branch_id": f.branch_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", loan);
    assert_eq!(counts(&client, &token, &f).await, (3, 2));

    let loan_id = loan["id"].as_i64().expect("loan id");
    let (status, _) = post(&client, &token, &format!("/loans/{}/return", loan_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts(&client, &token, &f).await, (3, 3));

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(counts(&client, &token, &f).await, (3, 3));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_issues_share_last_copy() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 1 }),
    )
    .await;

    let (status, other) = post(
        &client,
        &token,
        "/students",
        json!({
            "last_name": "Sidorova",
            "first_name": "Maria",
            "student_id": card_number("C"),
            "faculty_id": f.faculty_id
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", other);

    let first = json!({ "student_id": f.student_id, "book_id": f.book_id, "branch_id": f.branch_id });
    let second = json!({ "student_id": other["id"], "book_id": f.book_id, "branch_id": f.branch_id });
    let ((status_a, body_a), (status_b, body_b)) = tokio::join!(
        post(&client, &token, "/loans", first),
        post(&client, &token, "/loans", second),
    );

    let mut statuses = [status_a, status_b];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

    let rejected = if status_a == StatusCode::CONFLICT { body_a } else { body_b };
    assert_eq!(rejected["error"], "NoAvailableCopies");
    assert_eq!(counts(&client, &token, &f).await, (1, 0));
}

#[tokio::test]
#[ignore]
async fn test_faculty_usage_requires_stock() {
    let client = Client::new();
    let token = admin_token();
    let f = fixture(&client, &token).await;

    let usage = json!({
        "book_id": f.book_id,
        "faculty_id": f.faculty_id,
        "branch_id": f.branch_id,
        "course_code": "MATH101",
        "academic_year": "2025-2026"
    });

    let (status, _) = post(&client, &token, "/faculty-usages", usage.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    post(
        &client,
        &token,
        "/inventory/adjust",
        json!({ "book_id": f.book_id, "branch_id": f.branch_id, "delta": 1 }),
    )
    .await;

    let (status, first) = post(&client, &token, "/faculty-usages", usage.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = post(&client, &token, "/faculty-usages", usage).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);

    let (status, body) = get(
        &client,
        &token,
        &format!(
            "/faculty-usages/faculties?book_id={}&branch_id={}",
            f.book_id, f.branch_id
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["faculties"][0]["id"], f.faculty_id);
}
