//! API integration tests

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to register a book, returning its ID
async fn create_test_book(client: &Client, isbn: &str, accessions: &[&str]) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "call_number": format!("FIL 813 {}", isbn),
            "title": "Test Book",
            "accession_numbers": accessions
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

/// Helper to register a patron, returning its ID
async fn create_test_patron(client: &Client, identifier: &str) -> i64 {
    let response = client
        .post(format!("{}/patrons", BASE_URL))
        .json(&json!({
            "identifier": identifier,
            "kind": "Student",
            "first_name": "Test",
            "last_name": "Patron"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No patron ID")
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

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_and_archive_book() {
    let client = Client::new();
    let book_id = create_test_book(&client, "978-0-00-100001-1", &["IT-ARC-1"]).await;

    let response = client
        .get(format!("{}/books/{}/copies", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let copies: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(copies.as_array().expect("Not an array").len(), 1);

    // Archive (soft delete)
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
#[ignore]
async fn test_create_book_duplicate_isbn() {
    let client = Client::new();
    create_test_book(&client, "978-0-00-100002-8", &["IT-DUP-1"]).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": "978-0-00-100002-8",
            "call_number": "FIL 813 T36",
            "title": "Another Test Book",
            "accession_numbers": ["IT-DUP-2"]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_issue_and_return_loan() {
    let client = Client::new();
    let book_id =
        create_test_book(&client, "978-0-00-100003-5", &["IT-LOAN-1", "IT-LOAN-2"]).await;
    let patron_id = create_test_patron(&client, "IT-2024-0001").await;

    // Issue
    let due_at = Utc::now() + Duration::days(7);
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "patron_id": patron_id,
            "accession_number": "IT-LOAN-1",
            "due_at": due_at
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    assert_eq!(loan["status"], "Issued");
    assert_eq!(loan["accession_number"], "IT-LOAN-1");

    // One copy out, the last one withheld on reserve
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["copies_available"], 1);
    assert_eq!(book["status"], "NotAvailable");

    let response = client
        .get(format!("{}/books/{}/copies", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let copies: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(copies[1]["state"], "Reserve");

    // Return on time
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["status"], "Returned");
    assert_eq!(returned["fine_amount"], "0");
    assert_eq!(returned["fine_status"], "Cleared");
}

#[tokio::test]
#[ignore]
async fn test_issue_rejects_second_loan() {
    let client = Client::new();
    create_test_book(&client, "978-0-00-100004-2", &["IT-2ND-1", "IT-2ND-1B"]).await;
    create_test_book(&client, "978-0-00-100005-9", &["IT-2ND-2", "IT-2ND-2B"]).await;
    let patron_id = create_test_patron(&client, "IT-2024-0002").await;

    let due_at = Utc::now() + Duration::days(7);
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "patron_id": patron_id,
            "accession_number": "IT-2ND-1",
            "due_at": due_at
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "patron_id": patron_id,
            "accession_number": "IT-2ND-2",
            "due_at": due_at
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "PatronHasActiveLoan");
}

#[tokio::test]
#[ignore]
async fn test_issue_rejects_past_due_date() {
    let client = Client::new();
    create_test_book(&client, "978-0-00-100006-6", &["IT-PAST-1", "IT-PAST-2"]).await;
    let patron_id = create_test_patron(&client, "IT-2024-0003").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "patron_id": patron_id,
            "accession_number": "IT-PAST-1",
            "due_at": Utc::now() - Duration::hours(1)
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "InvalidDueDate");
}

#[tokio::test]
#[ignore]
async fn test_sole_copy_is_not_issuable() {
    let client = Client::new();
    create_test_book(&client, "978-0-00-100007-3", &["IT-SOLE-1"]).await;
    let patron_id = create_test_patron(&client, "IT-2024-0005").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "patron_id": patron_id,
            "accession_number": "IT-SOLE-1",
            "due_at": Utc::now() + Duration::days(7)
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "CopyUnavailable");
}

#[tokio::test]
#[ignore]
async fn test_patron_loan_history() {
    let client = Client::new();
    let patron_id = create_test_patron(&client, "IT-2024-0004").await;

    let response = client
        .get(format!("{}/patrons/{}/loans", BASE_URL, patron_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_refresh_sweep() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans/refresh", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["overdue"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["catalog"]["books"].is_number());
    assert!(body["patrons"].is_number());
    assert!(body["loans"]["active"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_unknown_loan_returns_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/loans/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NotFound");
}
