// src/handlers/mod.rs

use axum::response::IntoResponse;
use serde_json::json;

use crate::extract::Json;

pub mod admin;
pub mod ai;
pub mod auth;
pub mod badge;
pub mod booking;
pub mod chat;
pub mod feedback;
pub mod forum;
pub mod mentor;
pub mod peer;
pub mod posts;
pub mod progress;

/// Liveness probe.
pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}
