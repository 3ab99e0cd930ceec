// src/models/progress.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'progress' table: one level per (user, skill).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Progress {
    pub id: i64,
    pub user_id: i64,
    pub skill: String,
    pub level: i64,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub skill: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub level: Option<i64>,
}
