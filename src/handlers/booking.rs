// src/handlers/booking.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    extract::Json,
    handlers::{badge::award_session_badges, mentor::refresh_rating},
    models::booking::{
        Booking, BookingDetail, BookingListParams, BookingStatus, CreateBookingRequest,
        UpdateBookingRequest,
    },
    utils::sql_timestamp,
};

const BOOKING_COLUMNS: &str =
    "id, mentor_id, user_id, date, topic, status, duration, meeting_link, created_at";

const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Lists bookings joined with mentor and mentee details, latest session first.
pub async fn list_bookings(
    State(pool): State<SqlitePool>,
    Query(params): Query<BookingListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT b.id, b.mentor_id, b.user_id, b.date, b.topic, b.status, b.duration,
            b.meeting_link, b.created_at,
            m.name AS mentor_name, m.domain AS mentor_domain,
            u.name AS user_name, u.email AS user_email
        FROM bookings b
        JOIN mentors m ON m.id = b.mentor_id
        JOIN users u ON u.id = b.user_id
        WHERE 1 = 1
        "#,
    );

    if let Some(user_id) = params.user_id {
        qb.push(" AND b.user_id = ").push_bind(user_id);
    }
    if let Some(mentor_id) = params.mentor_id {
        qb.push(" AND b.mentor_id = ").push_bind(mentor_id);
    }
    if let Some(status) = params.status.filter(|s| !s.is_empty()) {
        qb.push(" AND b.status = ").push_bind(status);
    }

    qb.push(" ORDER BY b.date DESC");

    let bookings = qb
        .build_query_as::<BookingDetail>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list bookings: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({ "bookings": bookings })))
}

/// Requests a session with a mentor.
///
/// A mentor holds at most one pending or confirmed booking per start time;
/// the partial unique index on `(mentor_id, date)` enforces this even under
/// concurrent requests.
pub async fn create_booking(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (Some(mentor_id), Some(user_id), Some(date), Some(topic)) = (
        payload.mentor_id,
        payload.user_id,
        payload.date,
        payload.topic.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let date = DateTime::parse_from_rfc3339(&date)
        .map_err(|_| {
            AppError::BadRequest("Invalid date, expected an RFC 3339 timestamp".to_string())
        })?
        .with_timezone(&Utc);

    let mentor_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM mentors WHERE id = ?")
        .bind(mentor_id)
        .fetch_optional(&pool)
        .await?;
    if mentor_exists.is_none() {
        return Err(AppError::NotFound("Mentor not found".to_string()));
    }

    let user_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;
    if user_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings (mentor_id, user_id, date, topic, duration, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(mentor_id)
    .bind(user_id)
    .bind(sql_timestamp(date))
    .bind(topic.trim())
    .bind(payload.duration.unwrap_or(DEFAULT_DURATION_MINUTES))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest("Time slot already booked".to_string())
        } else {
            tracing::error!("Failed to create booking: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(
        "Booking {} created: user {} with mentor {} at {}",
        booking.id,
        user_id,
        mentor_id,
        booking.date
    );

    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

/// Moves a booking through its lifecycle and optionally sets the meeting link.
///
/// Completing a session awards the mentee's session badges in the same transaction.
pub async fn update_booking_status(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let next: BookingStatus = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status".to_string()))?;

    let meeting_link = payload.meeting_link.filter(|l| !l.is_empty());

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !current.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change booking from {} to {}",
            current.status, next
        )));
    }

    // Guarded on the status we read so a concurrent change is never overwritten.
    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings
        SET status = ?, meeting_link = COALESCE(?, meeting_link)
        WHERE id = ? AND status = ?
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(next)
    .bind(meeting_link)
    .bind(id)
    .bind(current.status)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Conflict("Booking was modified concurrently".to_string()))?;

    if next == BookingStatus::Completed && current.status != BookingStatus::Completed {
        award_session_badges(&mut tx, booking.user_id).await?;
    }

    tx.commit().await?;

    if current.status != next {
        tracing::info!("Booking {}: {} -> {}", id, current.status, next);
    }

    Ok(Json(json!({ "booking": booking })))
}

/// Deletes a booking together with its feedback.
///
/// The rated mentor's aggregate is recomputed in the same transaction.
pub async fn delete_booking(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let rated_mentor: Option<i64> =
        sqlx::query_scalar("SELECT mentor_id FROM feedback WHERE booking_id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let deleted: Option<i64> =
        sqlx::query_scalar("DELETE FROM bookings WHERE id = ? RETURNING mentor_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    if deleted.is_none() {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    if let Some(mentor_id) = rated_mentor {
        refresh_rating(&mut tx, mentor_id).await?;
    }

    tx.commit().await?;

    Ok(Json(json!({ "message": "Booking deleted successfully" })))
}
