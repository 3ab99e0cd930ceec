// src/handlers/badge.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::AppError,
    extract::Json,
    models::badge::{
        Badge, MANUAL_BADGES, Milestone, REVIEW_MILESTONES, SESSION_MILESTONES, reached,
    },
};

/// Grants every milestone `count` has reached.
///
/// `INSERT OR IGNORE` against `UNIQUE(user_id, badge_name)` makes this safe to
/// call repeatedly and concurrently. Returns the number of new badges.
async fn award(
    conn: &mut SqliteConnection,
    user_id: i64,
    milestones: &[Milestone],
    count: i64,
) -> Result<u64, AppError> {
    let mut awarded = 0;
    for milestone in reached(milestones, count) {
        awarded += sqlx::query(
            "INSERT OR IGNORE INTO badges (user_id, badge_name, badge_type) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(milestone.name)
        .bind(milestone.badge_type)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }

    if awarded > 0 {
        tracing::info!("User {} earned {} new badge(s)", user_id, awarded);
    }
    Ok(awarded)
}

/// Session badges, based on the user's completed bookings.
pub(crate) async fn award_session_badges(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<u64, AppError> {
    let completed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE user_id = ? AND status = 'completed'",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    award(conn, user_id, &SESSION_MILESTONES, completed).await
}

/// Review badges, based on how much feedback the user has written.
pub(crate) async fn award_review_badges(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<u64, AppError> {
    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    award(conn, user_id, &REVIEW_MILESTONES, reviews).await
}

/// Badges earned by a user, newest first.
pub async fn user_badges(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let badges = sqlx::query_as::<_, Badge>(
        r#"
        SELECT id, user_id, badge_name, badge_type, earned_at
        FROM badges
        WHERE user_id = ?
        ORDER BY earned_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "badges": badges })))
}

/// Every badge that can be earned.
pub async fn catalog() -> impl IntoResponse {
    let badges: Vec<&Milestone> = SESSION_MILESTONES
        .iter()
        .chain(REVIEW_MILESTONES.iter())
        .chain(MANUAL_BADGES.iter())
        .collect();

    Json(json!({ "badges": badges }))
}
