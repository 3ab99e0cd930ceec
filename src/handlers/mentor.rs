// src/handlers/mentor.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    extract::Json,
    handlers::auth::find_user_by_id,
    models::{
        booking::Booking,
        feedback::FeedbackDetail,
        mentor::{
            Mentor, MentorListParams, MentorListing, MentorProfile, RegisterMentorRequest,
            UpdateRatingRequest,
        },
    },
    utils::sql_timestamp,
};

const MENTOR_COLUMNS: &str = "m.id, m.user_id, m.name, m.domain, m.skills, m.bio, \
    m.experience, m.rating, m.total_ratings, m.linkedin, m.github, m.profile_image, \
    m.hourly_rate, m.availability, m.created_at";

/// Directory row with account email and counters. Seeded mentors have no
/// account, hence the LEFT JOIN.
pub(crate) fn listing_query<'a>() -> QueryBuilder<'a, Sqlite> {
    QueryBuilder::new(format!(
        r#"
        SELECT {MENTOR_COLUMNS},
            u.email AS email,
            (SELECT COUNT(*) FROM bookings b
                WHERE b.mentor_id = m.id AND b.status = 'completed') AS total_sessions,
            (SELECT COUNT(*) FROM feedback f WHERE f.mentor_id = m.id) AS total_feedback
        FROM mentors m
        LEFT JOIN users u ON u.id = m.user_id
        WHERE 1 = 1
        "#
    ))
}

/// Lists mentors, optionally filtered by domain and free-text search.
///
/// Ordered by rating, then by completed sessions.
pub async fn list_mentors(
    State(pool): State<SqlitePool>,
    Query(params): Query<MentorListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut qb = listing_query();

    if let Some(domain) = params
        .domain
        .as_deref()
        .filter(|d| !d.is_empty() && *d != "all")
    {
        qb.push(" AND m.domain LIKE ")
            .push_bind(format!("%{}%", domain));
    }

    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let term = format!("%{}%", search.trim());
        qb.push(" AND (m.name LIKE ")
            .push_bind(term.clone())
            .push(" OR m.bio LIKE ")
            .push_bind(term.clone())
            .push(" OR m.domain LIKE ")
            .push_bind(term.clone())
            .push(" OR m.skills LIKE ")
            .push_bind(term)
            .push(")");
    }

    qb.push(" ORDER BY m.rating DESC, total_sessions DESC");

    let mentors = qb
        .build_query_as::<MentorListing>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list mentors: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({ "mentors": mentors })))
}

pub async fn list_by_domain(
    State(pool): State<SqlitePool>,
    Path(domain): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut qb = listing_query();
    qb.push(" AND m.domain LIKE ")
        .push_bind(format!("%{}%", domain))
        .push(" ORDER BY m.rating DESC");

    let mentors = qb
        .build_query_as::<MentorListing>()
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({ "mentors": mentors })))
}

/// Mentor profile with upcoming sessions and the latest reviews.
pub async fn get_mentor(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut qb = listing_query();
    qb.push(" AND m.id = ").push_bind(id);

    let listing = qb
        .build_query_as::<MentorListing>()
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))?;

    let upcoming_bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, mentor_id, user_id, date, topic, status, duration, meeting_link, created_at
        FROM bookings
        WHERE mentor_id = ? AND status IN ('pending', 'confirmed') AND date > ?
        ORDER BY date ASC
        LIMIT 10
        "#,
    )
    .bind(id)
    .bind(sql_timestamp(chrono::Utc::now()))
    .fetch_all(&pool)
    .await?;

    let recent_feedback = sqlx::query_as::<_, FeedbackDetail>(
        r#"
        SELECT f.id, f.booking_id, f.user_id, f.mentor_id, f.rating, f.comment, f.created_at,
            u.name AS user_name, u.email AS user_email
        FROM feedback f
        JOIN users u ON u.id = f.user_id
        WHERE f.mentor_id = ?
        ORDER BY f.created_at DESC, f.id DESC
        LIMIT 5
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "mentor": MentorProfile {
            listing,
            upcoming_bookings,
            recent_feedback,
        }
    })))
}

/// Recomputes `rating` and `total_ratings` from every feedback row of the mentor.
///
/// Returns false when the mentor does not exist.
pub(crate) async fn refresh_rating(
    conn: &mut SqliteConnection,
    mentor_id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE mentors
        SET rating = COALESCE((SELECT AVG(rating) FROM feedback WHERE mentor_id = ?), 0.0),
            total_ratings = (SELECT COUNT(*) FROM feedback WHERE mentor_id = ?)
        WHERE id = ?
        "#,
    )
    .bind(mentor_id)
    .bind(mentor_id)
    .bind(mentor_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_rating(
    State(pool): State<SqlitePool>,
    Json(payload): Json<UpdateRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    if !refresh_rating(&mut conn, payload.mentor_id).await? {
        return Err(AppError::NotFound("Mentor not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

/// Turns an account into a mentor, or updates its existing mentor profile.
///
/// Admin accounts keep their role.
pub async fn register_mentor(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterMentorRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    find_user_by_id(&pool, payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE users SET role = 'mentor' WHERE id = ? AND role = 'mentee'")
        .bind(payload.user_id)
        .execute(&mut *tx)
        .await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM mentors WHERE user_id = ?")
        .bind(payload.user_id)
        .fetch_optional(&mut *tx)
        .await?;

    let mentor = sqlx::query_as::<_, Mentor>(
        r#"
        INSERT INTO mentors (
            user_id, name, domain, skills, bio, experience,
            linkedin, github, hourly_rate, availability
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            name = excluded.name,
            domain = excluded.domain,
            skills = excluded.skills,
            bio = excluded.bio,
            experience = excluded.experience,
            linkedin = excluded.linkedin,
            github = excluded.github,
            hourly_rate = excluded.hourly_rate,
            availability = excluded.availability
        RETURNING id, user_id, name, domain, skills, bio, experience, rating, total_ratings,
            linkedin, github, profile_image, hourly_rate, availability, created_at
        "#,
    )
    .bind(payload.user_id)
    .bind(&payload.name)
    .bind(&payload.domain)
    .bind(payload.skills.map(SqlJson))
    .bind(&payload.bio)
    .bind(payload.experience)
    .bind(payload.linkedin)
    .bind(payload.github)
    .bind(payload.hourly_rate)
    .bind(payload.availability)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to register mentor: {:?}", e);
        AppError::from(e)
    })?;

    tx.commit().await?;

    let (status, message) = if existing.is_some() {
        (StatusCode::OK, "Mentor profile updated successfully")
    } else {
        tracing::info!("User {} registered as mentor {}", payload.user_id, mentor.id);
        (StatusCode::CREATED, "Registered as mentor successfully")
    };

    Ok((
        status,
        Json(json!({
            "success": true,
            "mentor": mentor,
            "message": message,
        })),
    ))
}
