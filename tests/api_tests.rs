//! API integration tests
//!
//! These run against a live server with an empty-ish database:
//! `cargo test -- --ignored`. Tokens are minted locally with the
//! development secret, standing in for the external identity provider.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use bookhaven_server::models::user::{Role, UserClaims};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEV_SECRET: &str = "change-this-secret-in-production";

fn token(role: Role, user_id: i32) -> String {
    let now = Utc::now();
    let claims = UserClaims {
        sub: format!("user-{}", user_id),
        user_id,
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };
    claims.create_token(DEV_SECRET).expect("Failed to mint token")
}

/// Create a user through the API and return its ID
async fn create_user(client: &Client, email: &str, role: &str) -> i32 {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token(Role::Admin, 1)))
        .json(&json!({
            "email": email,
            "full_name": "Test User",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No user ID") as i32
}

/// Create a book with the given quantity and return its ID
async fn create_book(client: &Client, isbn: &str, quantity: i32) -> i32 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Librarian, 1)),
        )
        .json(&json!({
            "isbn": isbn,
            "title": "Test Book",
            "author": "Test Author",
            "inventory": {
                "quantity": quantity,
                "selling_price": "9.99"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID") as i32
}

async fn get_quantity(client: &Client, book_id: i32) -> i64 {
    let response = client
        .get(format!("{}/books/{}/availability", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Librarian, 1)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    body["quantity"].as_i64().expect("No quantity")
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
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_customer_cannot_create_book() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, 1)),
        )
        .json(&json!({
            "isbn": "978-0-00-000000-0",
            "title": "Nope",
            "author": "Nope",
            "inventory": { "quantity": 1 }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_checkout_return_round_trip() {
    let client = Client::new();

    let user_a = create_user(&client, "round-trip-a@example.com", "customer").await;
    let user_b = create_user(&client, "round-trip-b@example.com", "customer").await;
    let book_id = create_book(&client, "978-1-11-111111-1", 1).await;

    // First checkout succeeds; due date is 14 days out
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, user_a)),
        )
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["id"].as_i64().expect("No loan ID");
    assert_eq!(body["loan"]["status"], "active");
    assert!(body["loan"]["return_date"].is_null());

    assert_eq!(get_quantity(&client, book_id).await, 0);

    // Second checkout of the last copy fails without touching stock
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, user_b)),
        )
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
    assert_eq!(get_quantity(&client, book_id).await, 0);

    // Return restores the pre-checkout quantity
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, user_a)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["status"], "returned");
    assert!(body["loan"]["return_date"].is_string());

    assert_eq!(get_quantity(&client, book_id).await, 1);

    // Returning again fails and does not double-increment
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, user_a)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    assert_eq!(get_quantity(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_customer_cannot_checkout_for_another_user() {
    let client = Client::new();

    let user_a = create_user(&client, "proxy-a@example.com", "customer").await;
    let user_b = create_user(&client, "proxy-b@example.com", "customer").await;
    let book_id = create_book(&client, "978-2-22-222222-2", 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, user_a)),
        )
        .json(&json!({ "book_id": book_id, "user_id": user_b }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
    assert_eq!(get_quantity(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_purchase_decrements_stock() {
    let client = Client::new();

    let buyer = create_user(&client, "buyer@example.com", "customer").await;
    let book_id = create_book(&client, "978-3-33-333333-3", 2).await;

    let response = client
        .post(format!("{}/books/{}/purchase", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, buyer)),
        )
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["sale"]["book_id"].as_i64().unwrap() as i32, book_id);

    assert_eq!(get_quantity(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_loan_history_is_staff_only() {
    let client = Client::new();

    let customer = create_user(&client, "history@example.com", "customer").await;
    let book_id = create_book(&client, "978-4-44-444444-4", 1).await;

    let response = client
        .get(format!("{}/books/{}/loans", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, customer)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/books/{}/loans", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Librarian, 1)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_active_loan_is_rejected() {
    let client = Client::new();

    let borrower = create_user(&client, "deleter@example.com", "customer").await;
    let book_id = create_book(&client, "978-5-55-555555-5", 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, borrower)),
        )
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let loan_id = response
        .json::<Value>()
        .await
        .expect("Failed to parse response")["id"]
        .as_i64()
        .unwrap();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Librarian, 1)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // After the return, deletion goes through
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Customer, borrower)),
        )
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header(
            "Authorization",
            format!("Bearer {}", token(Role::Librarian, 1)),
        )
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}
