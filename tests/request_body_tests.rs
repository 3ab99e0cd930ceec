// tests/request_body_tests.rs

mod common;

use common::{TestApp, spawn_app};
use serde_json::{Value, json};

/// Asserts a `400 {"error": ...}` answer whose message mentions `needle`.
async fn assert_bad_request(response: reqwest::Response, needle: &str) {
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    let message = body["error"].as_str().expect("error should be a string");
    assert!(
        message.contains(needle),
        "expected `{}` in error message: {}",
        needle,
        message
    );
}

async fn user(app: &TestApp) -> i64 {
    app.signup("Ann", "ann@example.com").await.0
}

#[tokio::test]
async fn wrong_typed_field_is_a_bad_request() {
    let app = spawn_app().await;
    let user_id = user(&app).await;

    let response = app
        .post(
            "/api/bookings",
            json!({ "mentorId": "1", "userId": user_id, "date": "2030-03-01T10:00:00Z", "topic": "X" }),
        )
        .await;

    assert_bad_request(response, "mentorId").await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn missing_post_title_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app
        .post(
            "/api/posts",
            json!({ "content": "Body", "author": "Ann", "authorId": "u1" }),
        )
        .await;

    assert_bad_request(response, "title").await;
}

#[tokio::test]
async fn missing_user_id_is_a_bad_request() {
    let app = spawn_app().await;

    let forum = app
        .post("/api/forum", json!({ "topic": "Rust", "content": "Body" }))
        .await;
    let register = app
        .post(
            "/api/mentors/register",
            json!({ "name": "Ann", "domain": "Rust", "bio": "Systems" }),
        )
        .await;

    assert_bad_request(forum, "userId").await;
    assert_bad_request(register, "userId").await;
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = spawn_app().await;

    let syntax = app
        .client
        .post(app.url("/api/forum"))
        .header("content-type", "application/json")
        .body(r#"{"userId": 1, "topic": "#)
        .send()
        .await
        .expect("Failed to execute request");
    let no_content_type = app
        .client
        .post(app.url("/api/forum"))
        .body(r#"{"userId": 1, "topic": "Rust", "content": "Body"}"#)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(syntax.status().as_u16(), 400);
    let body: Value = syntax.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(no_content_type.status().as_u16(), 400);
    let body: Value = no_content_type.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn whitespace_post_fields_are_rejected() {
    let app = spawn_app().await;

    let blank_title = app
        .post(
            "/api/posts",
            json!({ "title": "   ", "content": "Body", "author": "Ann", "authorId": "u1" }),
        )
        .await;
    let blank_content = app
        .post(
            "/api/posts",
            json!({ "title": "Tips", "content": "\n\t", "author": "Ann", "authorId": "u1" }),
        )
        .await;

    assert_bad_request(blank_title, "title").await;
    assert_bad_request(blank_content, "content").await;
    let posts: Value = app.get("/api/posts").await.json().await.unwrap();
    assert_eq!(posts["posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn whitespace_comment_and_edit_are_rejected() {
    let app = spawn_app().await;
    let created: Value = app
        .post(
            "/api/posts",
            json!({ "title": "Tips", "content": "Body", "author": "Ann", "authorId": "u1" }),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = created["post"]["id"].as_str().unwrap().to_string();

    let comment = app
        .post(
            &format!("/api/posts/{}/comments", id),
            json!({ "content": "  ", "author": "Bo", "authorId": "u2" }),
        )
        .await;
    let edit = app
        .put(&format!("/api/posts/{}", id), json!({ "title": " " }))
        .await;

    assert_bad_request(comment, "content").await;
    assert_bad_request(edit, "title").await;
}
