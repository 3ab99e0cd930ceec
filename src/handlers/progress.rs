// src/handlers/progress.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    extract::Json,
    models::progress::{Progress, UpdateProgressRequest},
};

pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let progress = sqlx::query_as::<_, Progress>(
        r#"
        SELECT id, user_id, skill, level, updated_at
        FROM progress
        WHERE user_id = ?
        ORDER BY updated_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "progress": progress })))
}

/// Sets the level of one skill, creating the row on first use.
pub async fn update_progress(
    State(pool): State<SqlitePool>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (Some(user_id), Some(skill), Some(level)) =
        (payload.user_id, payload.skill, payload.level)
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let progress = sqlx::query_as::<_, Progress>(
        r#"
        INSERT INTO progress (user_id, skill, level)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, skill) DO UPDATE SET
            level = excluded.level,
            updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
        RETURNING id, user_id, skill, level, updated_at
        "#,
    )
    .bind(user_id)
    .bind(skill)
    .bind(level)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_foreign_key_violation())
        {
            AppError::NotFound("User not found".to_string())
        } else {
            tracing::error!("Failed to update progress: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(Json(json!({ "progress": progress })))
}
