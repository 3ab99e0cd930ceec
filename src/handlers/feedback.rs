// src/handlers/feedback.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    extract::Json,
    handlers::{badge::award_review_badges, mentor::refresh_rating},
    models::feedback::{Feedback, FeedbackDetail, FeedbackListParams, SubmitFeedbackRequest},
};

/// Reviews of a mentor, newest first.
pub async fn list_feedback(
    State(pool): State<SqlitePool>,
    Query(params): Query<FeedbackListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mentor_id = params
        .mentor_id
        .ok_or_else(|| AppError::BadRequest("Mentor ID is required".to_string()))?;

    let feedback = sqlx::query_as::<_, FeedbackDetail>(
        r#"
        SELECT f.id, f.booking_id, f.user_id, f.mentor_id, f.rating, f.comment, f.created_at,
            u.name AS user_name, u.email AS user_email
        FROM feedback f
        JOIN users u ON u.id = f.user_id
        WHERE f.mentor_id = ?
        ORDER BY f.created_at DESC, f.id DESC
        "#,
    )
    .bind(mentor_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "feedback": feedback })))
}

/// Records a review for a booking and refreshes the mentor's aggregate rating.
///
/// The insert, the full recompute of `rating`/`total_ratings` and the review
/// badge all commit together. A booking accepts one review; the UNIQUE
/// constraint on `booking_id` rejects a second one even under concurrency.
pub async fn submit_feedback(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (Some(booking_id), Some(user_id), Some(mentor_id), Some(rating)) = (
        payload.booking_id,
        payload.user_id,
        payload.mentor_id,
        payload.rating,
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let mut tx = pool.begin().await?;

    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedback (booking_id, user_id, mentor_id, rating, comment)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, booking_id, user_id, mentor_id, rating, comment, created_at
        "#,
    )
    .bind(booking_id)
    .bind(user_id)
    .bind(mentor_id)
    .bind(rating)
    .bind(payload.comment.filter(|c| !c.trim().is_empty()))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest("Feedback already submitted for this booking".to_string())
        } else if e
            .as_database_error()
            .is_some_and(|db| db.is_foreign_key_violation())
        {
            AppError::NotFound("Booking, user or mentor not found".to_string())
        } else {
            tracing::error!("Failed to submit feedback: {:?}", e);
            AppError::from(e)
        }
    })?;

    refresh_rating(&mut tx, mentor_id).await?;
    award_review_badges(&mut tx, user_id).await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "feedback": feedback }))))
}
