// src/handlers/forum.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    extract::Json,
    models::forum::{
        CreateForumCommentRequest, CreateForumPostRequest, ForumComment, ForumListParams,
        ForumPost, ForumPostListing, ForumSort, ForumThread,
    },
    utils::html::clean_html,
};

const FORUM_COLUMNS: &str = "id, user_id, topic, content, tags, upvotes, views, created_at";

fn listing_query<'a>() -> QueryBuilder<'a, Sqlite> {
    QueryBuilder::new(
        r#"
        SELECT f.id, f.user_id, f.topic, f.content, f.tags, f.upvotes, f.views, f.created_at,
            u.name AS author_name, u.email AS author_email,
            (SELECT COUNT(*) FROM forum_comments fc WHERE fc.forum_id = f.id) AS comment_count
        FROM forum f
        JOIN users u ON u.id = f.user_id
        WHERE 1 = 1
        "#,
    )
}

fn foreign_key_as_not_found(e: sqlx::Error, what: &str) -> AppError {
    if e.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
    {
        AppError::NotFound(format!("{} not found", what))
    } else {
        tracing::error!("Forum write failed: {:?}", e);
        AppError::from(e)
    }
}

pub async fn list_posts(
    State(pool): State<SqlitePool>,
    Query(params): Query<ForumListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut qb = listing_query();

    if let Some(tag) = params.tag.filter(|t| !t.is_empty()) {
        qb.push(" AND f.tags LIKE ").push_bind(format!("%{}%", tag));
    }

    if let Some(search) = params.search.filter(|s| !s.trim().is_empty()) {
        let term = format!("%{}%", search.trim());
        qb.push(" AND (f.topic LIKE ")
            .push_bind(term.clone())
            .push(" OR f.content LIKE ")
            .push_bind(term)
            .push(")");
    }

    qb.push(match params.sort_by {
        ForumSort::Recent => " ORDER BY f.created_at DESC, f.id DESC",
        ForumSort::Popular => " ORDER BY f.upvotes DESC, f.views DESC",
    });

    let posts = qb
        .build_query_as::<ForumPostListing>()
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({ "posts": posts })))
}

/// Opens a thread. Counts as a view.
pub async fn get_post(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let viewed = sqlx::query("UPDATE forum SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;
    if viewed.rows_affected() == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let mut qb = listing_query();
    qb.push(" AND f.id = ").push_bind(id);
    let post = qb
        .build_query_as::<ForumPostListing>()
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = sqlx::query_as::<_, ForumComment>(
        r#"
        SELECT fc.id, fc.forum_id, fc.user_id, fc.content, fc.created_at,
            u.name AS author_name
        FROM forum_comments fc
        JOIN users u ON u.id = fc.user_id
        WHERE fc.forum_id = ?
        ORDER BY fc.created_at ASC, fc.id ASC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "post": ForumThread { post, comments } })))
}

pub async fn create_post(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateForumPostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = sqlx::query_as::<_, ForumPost>(&format!(
        r#"
        INSERT INTO forum (user_id, topic, content, tags)
        VALUES (?, ?, ?, ?)
        RETURNING {FORUM_COLUMNS}
        "#
    ))
    .bind(payload.user_id)
    .bind(clean_html(&payload.topic))
    .bind(clean_html(&payload.content))
    .bind(payload.tags.filter(|t| !t.is_empty()))
    .fetch_one(&pool)
    .await
    .map_err(|e| foreign_key_as_not_found(e, "User"))?;

    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

pub async fn add_comment(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateForumCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM forum WHERE id = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if post_exists.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comment_id: i64 = sqlx::query_scalar(
        "INSERT INTO forum_comments (forum_id, user_id, content) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(id)
    .bind(payload.user_id)
    .bind(clean_html(&payload.content))
    .fetch_one(&pool)
    .await
    .map_err(|e| foreign_key_as_not_found(e, "User"))?;

    let comment = sqlx::query_as::<_, ForumComment>(
        r#"
        SELECT fc.id, fc.forum_id, fc.user_id, fc.content, fc.created_at,
            u.name AS author_name
        FROM forum_comments fc
        JOIN users u ON u.id = fc.user_id
        WHERE fc.id = ?
        "#,
    )
    .bind(comment_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

pub async fn upvote_post(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, ForumPost>(&format!(
        "UPDATE forum SET upvotes = upvotes + 1 WHERE id = ? RETURNING {FORUM_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(json!({ "post": post })))
}
