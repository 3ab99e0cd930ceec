// src/handlers/admin.rs

use axum::{extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    extract::Json,
    models::{
        analytics::{Analytics, MonthlyCount, Overview, TopMentor, TopicCount},
        user::User,
    },
};

/// Lists all users in the system, newest first.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, created_at
        FROM users
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({ "users": users })))
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(sql).fetch_one(pool).await?)
}

/// Platform usage figures for the admin dashboard.
/// Admin only.
pub async fn analytics(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let overview = Overview {
        total_users: count(&pool, "SELECT COUNT(*) FROM users").await?,
        total_mentors: count(&pool, "SELECT COUNT(*) FROM mentors").await?,
        total_bookings: count(&pool, "SELECT COUNT(*) FROM bookings").await?,
        completed_bookings: count(
            &pool,
            "SELECT COUNT(*) FROM bookings WHERE status = 'completed'",
        )
        .await?,
        active_users: count(
            &pool,
            r#"
            SELECT COUNT(DISTINCT user_id) FROM bookings
            WHERE date > strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-30 days')
            "#,
        )
        .await?,
    };

    let top_mentors = sqlx::query_as::<_, TopMentor>(
        r#"
        SELECT m.id, m.name, m.domain, m.rating, COUNT(b.id) AS session_count
        FROM mentors m
        LEFT JOIN bookings b ON b.mentor_id = m.id AND b.status = 'completed'
        GROUP BY m.id
        ORDER BY session_count DESC, m.rating DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let bookings_per_month = sqlx::query_as::<_, MonthlyCount>(
        r#"
        SELECT substr(date, 1, 7) AS month, COUNT(*) AS count
        FROM bookings
        WHERE date > strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-6 months')
        GROUP BY month
        ORDER BY month ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let active_users_over_time = sqlx::query_as::<_, MonthlyCount>(
        r#"
        SELECT substr(date, 1, 7) AS month, COUNT(DISTINCT user_id) AS count
        FROM bookings
        WHERE date > strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-6 months')
        GROUP BY month
        ORDER BY month ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let top_topics = sqlx::query_as::<_, TopicCount>(
        r#"
        SELECT topic, COUNT(*) AS count
        FROM bookings
        WHERE status = 'completed'
        GROUP BY topic
        ORDER BY count DESC, topic ASC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(Analytics {
        overview,
        top_mentors,
        bookings_per_month,
        active_users_over_time,
        top_topics,
    }))
}
