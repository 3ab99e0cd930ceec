// tests/common/mod.rs

#![allow(dead_code)]

use std::{path::PathBuf, str::FromStr};

use mentorship_backend::{
    config::Config, db, realtime::ChatHub, routes, seed, state::AppState, store::PostStore,
};
use serde_json::{Value, json};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    pub posts_path: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a mentee account and returns `(user_id, access_token)`.
    pub async fn signup(&self, name: &str, email: &str) -> (i64, String) {
        let response = self
            .post(
                "/api/auth/signup",
                json!({ "email": email, "password": "password123", "displayName": name }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        (
            body["user"]["id"].as_i64().unwrap(),
            body["access"].as_str().unwrap().to_string(),
        )
    }

    /// Books a session and returns the booking id.
    pub async fn book(&self, mentor_id: i64, user_id: i64, date: &str, topic: &str) -> i64 {
        let response = self
            .post(
                "/api/bookings",
                json!({ "mentorId": mentor_id, "userId": user_id, "date": date, "topic": topic }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["booking"]["id"].as_i64().unwrap()
    }

    pub async fn set_status(&self, booking_id: i64, status: &str) -> reqwest::Response {
        self.put(
            &format!("/api/bookings/{}", booking_id),
            json!({ "status": status }),
        )
        .await
    }

    /// Books, confirms and completes a session.
    pub async fn complete_session(&self, mentor_id: i64, user_id: i64, date: &str, topic: &str) -> i64 {
        let id = self.book(mentor_id, user_id, date, topic).await;
        assert_eq!(self.set_status(id, "confirmed").await.status().as_u16(), 200);
        assert_eq!(self.set_status(id, "completed").await.status().as_u16(), 200);
        id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.posts_path);
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        jwt_refresh_expiration: 3600,
        rust_log: "error".to_string(),
        port: 0,
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        posts_path: std::env::temp_dir()
            .join(format!("posts-{}.json", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        ml_python: "python3".to_string(),
        ml_script: "inference.py".to_string(),
        ml_timeout_secs: 10,
        google: None,
        seed_mentors: true,
    }
}

/// Spawns the app on a random port with a fresh in-memory database
/// (admin account and demo mentors seeded).
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    // A single connection that never expires keeps the in-memory DB alive.
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid database url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");

    seed::run(&pool, &config).await;

    let posts_path = PathBuf::from(&config.posts_path);
    let state = AppState {
        pool: pool.clone(),
        posts: PostStore::new(&posts_path),
        chat: ChatHub::new(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
        posts_path,
    }
}
