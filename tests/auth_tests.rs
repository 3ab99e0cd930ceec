// tests/auth_tests.rs

mod common;

use common::{ADMIN_EMAIL, ADMIN_PASSWORD, spawn_app, spawn_app_with, test_config};
use mentorship_backend::config::GoogleConfig;
use serde_json::{Value, json};

#[tokio::test]
async fn ping_works() {
    let app = spawn_app().await;

    let response = app.get("/api/ping").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "pong");
}

#[tokio::test]
async fn unknown_api_route_returns_json_404() {
    let app = spawn_app().await;

    let response = app.get("/api/does-not-exist").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "API route not found");
    assert_eq!(body["path"], "/api/does-not-exist");
}

#[tokio::test]
async fn signup_returns_tokens_and_mentee_user() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post(
            "/api/auth/signup",
            json!({ "email": "ann@example.com", "password": "password123", "displayName": "Ann" }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["role"], "mentee");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn signup_accepts_legacy_shape() {
    let app = spawn_app().await;

    let response = app
        .post(
            "/api/auth/registration",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "password1": "password123",
                "password2": "password123"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["name"], "bob");
}

#[tokio::test]
async fn signup_rejects_duplicate_email_and_bad_input() {
    // Arrange
    let app = spawn_app().await;
    app.signup("Ann", "ann@example.com").await;

    // Act
    let duplicate = app
        .post(
            "/api/auth/signup",
            json!({ "email": "ann@example.com", "password": "password123", "displayName": "Ann 2" }),
        )
        .await;
    let short_password = app
        .post(
            "/api/auth/signup",
            json!({ "email": "c@example.com", "password": "abc", "displayName": "C" }),
        )
        .await;
    let mismatched = app
        .post(
            "/api/auth/signup",
            json!({
                "username": "d",
                "email": "d@example.com",
                "password1": "password123",
                "password2": "password456"
            }),
        )
        .await;

    // Assert
    assert_eq!(duplicate.status().as_u16(), 400);
    let body: Value = duplicate.json().await.unwrap();
    assert_eq!(body["error"], "A user with this email already exists.");
    assert_eq!(short_password.status().as_u16(), 400);
    assert_eq!(mismatched.status().as_u16(), 400);
}

#[tokio::test]
async fn signin_checks_credentials() {
    let app = spawn_app().await;
    app.signup("Ann", "ann@example.com").await;

    let ok = app
        .post(
            "/api/auth/signin",
            json!({ "email": "ANN@example.com", "password": "password123" }),
        )
        .await;
    let wrong = app
        .post(
            "/api/auth/signin",
            json!({ "email": "ann@example.com", "password": "nope-nope" }),
        )
        .await;
    let unknown = app
        .post(
            "/api/auth/login",
            json!({ "username": "ghost@example.com", "password": "password123" }),
        )
        .await;

    assert_eq!(ok.status().as_u16(), 200);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ann@example.com");

    assert_eq!(wrong.status().as_u16(), 400);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "Unable to log in with provided credentials.");
    assert_eq!(unknown.status().as_u16(), 400);
}

#[tokio::test]
async fn refresh_only_accepts_refresh_tokens() {
    // Arrange
    let app = spawn_app().await;
    let response = app
        .post(
            "/api/auth/signup",
            json!({ "email": "ann@example.com", "password": "password123", "displayName": "Ann" }),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let access = body["access"].as_str().unwrap();
    let refresh = body["refresh"].as_str().unwrap();

    // Act
    let with_refresh = app
        .post("/api/auth/token/refresh", json!({ "refresh": refresh }))
        .await;
    let with_access = app
        .post("/api/auth/token/refresh", json!({ "refresh": access }))
        .await;

    // Assert
    assert_eq!(with_refresh.status().as_u16(), 200);
    let body: Value = with_refresh.json().await.unwrap();
    assert!(body["access"].is_string());
    assert_eq!(with_access.status().as_u16(), 400);
}

#[tokio::test]
async fn get_user_by_email() {
    let app = spawn_app().await;
    app.signup("Ann", "ann@example.com").await;

    let found = app.get("/api/auth/user/ann@example.com").await;
    let missing = app.get("/api/auth/user/nobody@example.com").await;

    assert_eq!(found.status().as_u16(), 200);
    let body: Value = found.json().await.unwrap();
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn password_reset_flow() {
    // Arrange
    let app = spawn_app().await;
    let (user_id, _) = app.signup("Ann", "ann@example.com").await;

    // Unknown accounts get the same answer.
    let unknown = app
        .post("/api/auth/reset-request", json!({ "email": "ghost@example.com" }))
        .await;
    assert_eq!(unknown.status().as_u16(), 200);

    let requested = app
        .post("/api/auth/reset-request", json!({ "email": "ann@example.com" }))
        .await;
    assert_eq!(requested.status().as_u16(), 200);

    let token: String = sqlx::query_scalar("SELECT reset_token FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();

    // Act
    let reset = app
        .post(
            "/api/auth/reset-password",
            json!({ "resetToken": token, "newPassword": "brand-new-pass" }),
        )
        .await;
    let reused = app
        .post(
            "/api/auth/reset-password",
            json!({ "resetToken": token, "newPassword": "another-pass" }),
        )
        .await;

    // Assert
    assert_eq!(reset.status().as_u16(), 200);
    assert_eq!(reused.status().as_u16(), 400);

    let old = app
        .post(
            "/api/auth/signin",
            json!({ "email": "ann@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(old.status().as_u16(), 400);

    let new = app
        .post(
            "/api/auth/signin",
            json!({ "email": "ann@example.com", "password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(new.status().as_u16(), 200);
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let app = spawn_app().await;
    let (user_id, _) = app.signup("Ann", "ann@example.com").await;

    sqlx::query(
        "UPDATE users SET reset_token = 'stale', reset_token_expiry = '2000-01-01T00:00:00Z' WHERE id = ?",
    )
    .bind(user_id)
    .execute(&app.pool)
    .await
    .unwrap();

    let response = app
        .post(
            "/api/auth/reset-password",
            json!({ "resetToken": "stale", "newPassword": "brand-new-pass" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid or expired reset token");
}

#[tokio::test]
async fn google_login_is_unavailable_without_credentials() {
    let app = spawn_app().await;

    let response = app.get("/api/auth/google").await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn google_login_returns_consent_url() {
    // Arrange
    let mut config = test_config();
    config.google = Some(GoogleConfig {
        client_id: "client-123".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:8080/api/auth/google/callback".to_string(),
    });
    let app = spawn_app_with(config).await;

    // Act
    let response = app.get("/api/auth/google").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let url = body["authUrl"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.google.com/"));
    assert!(url.contains("client_id=client-123"));
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    // Arrange
    let app = spawn_app().await;
    let (_, mentee_token) = app.signup("Ann", "ann@example.com").await;

    let signin = app
        .post(
            "/api/auth/signin",
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(signin.status().as_u16(), 200);
    let body: Value = signin.json().await.unwrap();
    let admin_token = body["access"].as_str().unwrap().to_string();

    // Act
    let anonymous = app.get("/api/admin/users").await;
    let as_mentee = app
        .client
        .get(app.url("/api/admin/users"))
        .bearer_auth(&mentee_token)
        .send()
        .await
        .unwrap();
    let as_admin = app
        .client
        .get(app.url("/api/admin/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(anonymous.status().as_u16(), 401);
    assert_eq!(as_mentee.status().as_u16(), 403);
    assert_eq!(as_admin.status().as_u16(), 200);
    let body: Value = as_admin.json().await.unwrap();
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_analytics_reports_counts() {
    // Arrange
    let app = spawn_app().await;
    let (user_id, _) = app.signup("Ann", "ann@example.com").await;
    app.complete_session(1, user_id, "2030-01-01T10:00:00Z", "Python")
        .await;

    let signin = app
        .post(
            "/api/auth/signin",
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    let body: Value = signin.json().await.unwrap();
    let admin_token = body["access"].as_str().unwrap().to_string();

    // Act
    let response = app
        .client
        .get(app.url("/api/admin/analytics"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overview"]["totalUsers"], 2);
    assert_eq!(body["overview"]["totalMentors"], 8);
    assert_eq!(body["overview"]["totalBookings"], 1);
    assert_eq!(body["overview"]["completedBookings"], 1);
    assert_eq!(body["topMentors"][0]["id"], 1);
    assert_eq!(body["topTopics"][0]["topic"], "Python");
}

#[tokio::test]
async fn google_callback_redirects_failures_to_signin() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    // Act
    let without_code = app.get("/api/auth/google/callback").await;
    let unconfigured = client
        .get(app.url("/api/auth/google/callback?code=abc"))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(without_code.status().as_u16(), 400);
    assert!(unconfigured.status().is_redirection());
    let location = unconfigured.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/signin?error="));
}

#[tokio::test]
async fn emails_are_unique_regardless_of_case() {
    let app = spawn_app().await;
    app.signup("Bob", "bob@example.com").await;

    let response = app
        .post(
            "/api/auth/signup",
            json!({ "email": "Bob@example.com", "password": "password123", "displayName": "Bob 2" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "A user with this email already exists.");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = 'BOB@EXAMPLE.COM'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
