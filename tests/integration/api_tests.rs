//! API integration tests
//!
//! Run against a live server with a verified administrator account:
//! `ADMIN_EMAIL=... ADMIN_PASSWORD=... cargo test -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000/api/v1";

fn admin_credentials() -> (String, String) {
    (
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@fonlibrary.org".to_string()),
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
    )
}

/// Helper to get an administrator token
async fn get_auth_token(client: &Client) -> String {
    let (email, password) = admin_credentials();
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique_suffix() -> String {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

async fn available_copies(client: &Client, book_id: i64) -> i64 {
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    book["available_copies"].as_i64().expect("No available_copies")
}

async fn get_json(client: &Client, token: &str, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn create_genre(client: &Client, token: &str, name: &str) -> i64 {
    let genre: Value = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    genre["id"].as_i64().expect("No genre id")
}

async fn create_book(client: &Client, token: &str, title: &str, genre_id: i64) -> i64 {
    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "author": "Ranking Author",
            "genre_id": genre_id,
            "total_copies": 1,
            "available_copies": 1,
            "published_year": 1999
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    book["id"].as_i64().expect("No book id")
}

async fn borrow_book(client: &Client, token: &str, book_id: i64) {
    let due = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "book_id": book_id, "due_date": due }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn borrow_count(entry: &Value) -> i64 {
    entry["borrow_count"].as_i64().expect("No borrow_count")
}

/// Counts never increase down the list; equal counts keep ids ascending
fn assert_ranked(entries: &[Value], id_field: &str) {
    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(borrow_count(a) >= borrow_count(b), "{:?} before {:?}", a, b);
        if borrow_count(a) == borrow_count(b) {
            assert!(a[id_field].as_i64() < b[id_field].as_i64(), "{:?} before {:?}", a, b);
        }
    }
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
async fn test_login() {
    let client = Client::new();
    let (email, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().get("set-cookie").is_some());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "nobody@example.com", "password": "nope" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Wrong credentials");
}

#[tokio::test]
#[ignore]
async fn test_register_twice_conflicts() {
    let client = Client::new();
    let email = format!("reader{}@example.com", unique_suffix());
    let payload = json!({ "name": "Reader", "email": email, "password": "secret123" });

    let first = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Not verified yet
    let login = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(login.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?page=1&limit=5&sort=year", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["items"].as_array().unwrap().len() <= 5);
    assert!(body["total"].is_number());
    assert!(body["pages"].is_number());
    assert_eq!(body["per_page"], 5);
}

#[tokio::test]
#[ignore]
async fn test_unknown_genre_filter_lists_everything() {
    let client = Client::new();

    let all: Value = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let filtered: Value = client
        .get(format!("{}/books?genre=NoSuchGenre{}", BASE_URL, unique_suffix()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(filtered["total"], all["total"]);
}

#[tokio::test]
#[ignore]
async fn test_book_with_missing_genre_is_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Orphan",
            "author": "Nobody",
            "genre_id": i32::MAX,
            "total_copies": 1,
            "available_copies": 1,
            "published_year": 1990
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Genre not found");

    let genre_id = create_genre(&client, &token, &format!("Genre {}", unique_suffix())).await;
    let book_id = create_book(&client, &token, "Orphan", genre_id).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "genre_id": i32::MAX }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for path in [format!("/books/{}", book_id), format!("/genres/{}", genre_id)] {
        let response = client
            .delete(format!("{}{}", BASE_URL, path))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_restores_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let suffix = unique_suffix();

    let genre: Value = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": format!("Genre {}", suffix) }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let genre_id = genre["id"].as_i64().expect("No genre id");

    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": format!("Book {}", suffix),
            "author": "Test Author",
            "genre_id": genre_id,
            "total_copies": 2,
            "available_copies": 2,
            "published_year": 2001
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book id");
    assert_eq!(book["genre"]["id"].as_i64(), Some(genre_id));
    assert!(book["cover_image_url"].as_str().unwrap_or_default().starts_with("https://"));

    let due = (chrono::Utc::now() + chrono::Duration::days(14)).to_rfc3339();
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_id": book_id, "due_date": due }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let borrow: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(borrow["status"], "borrowed");
    assert_eq!(available_copies(&client, book_id).await, 1);

    let check: Value = client
        .get(format!("{}/borrows/check/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(check["borrowed"], true);

    let returned: Value = client
        .put(format!("{}/borrows/{}/return", BASE_URL, borrow["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(returned["status"], "returned");
    assert_eq!(available_copies(&client, book_id).await, 2);

    let check: Value = client
        .get(format!("{}/borrows/check/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(check["borrowed"], false);

    // Genre still referenced by the book
    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_due_date_in_past_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_id": 1, "due_date": "2000-01-01" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_reports() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for (report, max_len, id_field) in [
        ("top-books", 5, "book_id"),
        ("top-genres", 5, "genre_id"),
        ("top-users", 3, "user_id"),
    ] {
        let body = get_json(&client, &token, &format!("/reports/{}", report)).await;
        let entries = body.as_array().expect("Report is not an array");
        assert!(entries.len() <= max_len);
        assert_ranked(entries, id_field);
    }
}

#[tokio::test]
#[ignore]
async fn test_reports_rank_the_most_borrowed_first() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let suffix = unique_suffix();
    let (admin_email, _) = admin_credentials();

    // One more borrow than any current leader guarantees the new book leads
    let mut leader = 0;
    for report in ["top-books", "top-genres", "top-users"] {
        let body = get_json(&client, &token, &format!("/reports/{}", report)).await;
        if let Some(first) = body.as_array().and_then(|a| a.first()) {
            leader = leader.max(borrow_count(first));
        }
    }
    let times = leader + 1;

    let genre_id = create_genre(&client, &token, &format!("Ranked {}", suffix)).await;
    let book_id = create_book(&client, &token, &format!("Ranked {}", suffix), genre_id).await;
    let removed_id = create_book(&client, &token, &format!("Removed {}", suffix), genre_id).await;

    for _ in 0..times {
        borrow_book(&client, &token, book_id).await;
    }
    borrow_book(&client, &token, removed_id).await;

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, removed_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let books = get_json(&client, &token, "/reports/top-books").await;
    let books = books.as_array().expect("Report is not an array");
    assert_eq!(books[0]["book_id"].as_i64(), Some(book_id));
    assert_eq!(borrow_count(&books[0]), times);
    assert!(books
        .iter()
        .all(|b| b["book_id"].is_i64() && b["book_id"].as_i64() != Some(removed_id)));
    assert_ranked(books, "book_id");

    // The removed book's borrow no longer counts toward its genre
    let genres = get_json(&client, &token, "/reports/top-genres").await;
    let genres = genres.as_array().expect("Report is not an array");
    assert_eq!(genres[0]["genre_id"].as_i64(), Some(genre_id));
    assert_eq!(borrow_count(&genres[0]), times);
    assert_ranked(genres, "genre_id");

    let users = get_json(&client, &token, "/reports/top-users").await;
    let users = users.as_array().expect("Report is not an array");
    assert_eq!(users[0]["email"].as_str(), Some(admin_email.as_str()));
    assert!(borrow_count(&users[0]) >= times + 1);
    assert!(users.iter().all(|u| u["password"].is_null()));
    assert_ranked(users, "user_id");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrows/my", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
