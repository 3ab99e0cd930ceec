// src/handlers/peer.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::{AppError, is_unique_violation},
    extract::Json,
    models::peer::{
        ConnectRequest, FindPeersParams, PeerConnection, PeerConnectionDetail, PeerSuggestion,
        UpdateConnectionRequest,
    },
};

const PEER_LIMIT: i64 = 10;

/// Suggests other mentees to study with.
///
/// With no booking history the most active mentees are returned; otherwise
/// mentees whose completed sessions share topics with the requester's bookings.
pub async fn find_peers(
    State(pool): State<SqlitePool>,
    Query(params): Query<FindPeersParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    let topics: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT topic FROM bookings WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&pool)
            .await?;

    if topics.is_empty() {
        let peers = sqlx::query_as::<_, PeerSuggestion>(
            r#"
            SELECT u.id, u.name, u.email, COUNT(b.id) AS session_count
            FROM users u
            LEFT JOIN bookings b ON b.user_id = u.id AND b.status = 'completed'
            WHERE u.id != ? AND u.role = 'mentee'
            GROUP BY u.id
            ORDER BY session_count DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(PEER_LIMIT)
        .fetch_all(&pool)
        .await?;

        return Ok(Json(json!({ "peers": peers })));
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT u.id, u.name, u.email,
            COUNT(DISTINCT b.id) AS session_count,
            COUNT(DISTINCT CASE WHEN b.topic IN (
        "#,
    );
    let mut list = qb.separated(", ");
    for topic in &topics {
        list.push_bind(topic.clone());
    }
    qb.push(
        r#"
            ) THEN b.id END) AS common_topics
        FROM users u
        LEFT JOIN bookings b ON b.user_id = u.id AND b.status = 'completed'
        WHERE u.role = 'mentee' AND u.id != "#,
    )
    .push_bind(user_id)
    .push(
        r#"
        GROUP BY u.id
        HAVING common_topics > 0
        ORDER BY common_topics DESC, session_count DESC
        LIMIT "#,
    )
    .push_bind(PEER_LIMIT);

    let peers = qb
        .build_query_as::<PeerSuggestion>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find peers: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({ "peers": peers })))
}

/// Accepted connections of a user, seen from that user's side.
pub async fn list_connections(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let connections = sqlx::query_as::<_, PeerConnectionDetail>(
        r#"
        SELECT pc.id, pc.user_id, pc.peer_id, pc.status, pc.created_at,
            u.name AS peer_name, u.email AS peer_email,
            (SELECT COUNT(*) FROM bookings b
                WHERE b.user_id = u.id AND b.status = 'completed') AS peer_sessions
        FROM peer_connections pc
        JOIN users u ON u.id = CASE WHEN pc.user_id = ? THEN pc.peer_id ELSE pc.user_id END
        WHERE (pc.user_id = ? OR pc.peer_id = ?) AND pc.status = 'accepted'
        ORDER BY pc.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "connections": connections })))
}

/// Sends a connection request. One connection per pair, whichever side asked.
pub async fn connect(
    State(pool): State<SqlitePool>,
    Json(payload): Json<ConnectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(user_id), Some(peer_id)) = (payload.user_id, payload.peer_id) else {
        return Err(AppError::BadRequest(
            "userId and peerId are required".to_string(),
        ));
    };

    if user_id == peer_id {
        return Err(AppError::BadRequest("Cannot connect to yourself".to_string()));
    }

    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM peer_connections
        WHERE (user_id = ? AND peer_id = ?) OR (user_id = ? AND peer_id = ?)
        "#,
    )
    .bind(user_id)
    .bind(peer_id)
    .bind(peer_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest("Connection already exists".to_string()));
    }

    let connection = sqlx::query_as::<_, PeerConnection>(
        r#"
        INSERT INTO peer_connections (user_id, peer_id, status)
        VALUES (?, ?, 'pending')
        RETURNING id, user_id, peer_id, status, created_at
        "#,
    )
    .bind(user_id)
    .bind(peer_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest("Connection already exists".to_string())
        } else if e
            .as_database_error()
            .is_some_and(|db| db.is_foreign_key_violation())
        {
            AppError::NotFound("User not found".to_string())
        } else {
            tracing::error!("Failed to create connection: {:?}", e);
            AppError::from(e)
        }
    })?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "connection": connection }))))
}

/// Accepts or rejects a connection request.
pub async fn update_connection(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateConnectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload
        .status
        .filter(|s| s == "accepted" || s == "rejected")
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

    let connection = sqlx::query_as::<_, PeerConnection>(
        r#"
        UPDATE peer_connections SET status = ?
        WHERE id = ?
        RETURNING id, user_id, peer_id, status, created_at
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Connection not found".to_string()))?;

    Ok(Json(json!({ "connection": connection })))
}
