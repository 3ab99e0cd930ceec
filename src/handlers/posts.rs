// src/handlers/posts.rs

//! Community feed backed by the JSON post store.

use std::cmp::Reverse;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    extract::Json,
    models::post::{
        ActingUser, CreatePostCommentRequest, CreatePostRequest, Post, PostComment,
        PostListParams, PostSort, UpdatePostRequest,
    },
    store::PostStore,
};

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn list_posts(
    State(store): State<PostStore>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut posts = store.all().await?;

    match params.sort_by {
        PostSort::Votes => posts.sort_by_key(|p| Reverse(p.upvotes)),
        PostSort::Newest => posts.sort_by_key(|p| Reverse(p.date)),
    }

    let total = posts.len();
    Ok(Json(json!({ "posts": posts, "total": total })))
}

/// Publishes a post at the top of the feed.
pub async fn create_post(
    State(store): State<PostStore>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = Post {
        id: new_id("post"),
        author: payload.author,
        author_id: payload.author_id,
        author_avatar: payload.author_avatar,
        author_verified: payload.author_verified,
        date: Utc::now(),
        title: payload.title.trim().to_string(),
        content: payload.content.trim().to_string(),
        upvotes: 0,
        likes: 0,
        liked_by: Vec::new(),
        views: 0,
        comments: 0,
        comments_list: Vec::new(),
        image: payload.image.filter(|i| !i.is_empty()),
        category: payload.category,
    };

    let post = store
        .mutate(|posts| {
            posts.insert(0, post.clone());
            Ok(post)
        })
        .await?;

    tracing::info!("Post {} created by {}", post.id, post.author_id);

    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

/// Edits the content fields of a post. Counters are untouched.
pub async fn update_post(
    State(store): State<PostStore>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = store
        .update(&id, |post| {
            if let Some(title) = payload.title {
                post.title = title.trim().to_string();
            }
            if let Some(content) = payload.content {
                post.content = content.trim().to_string();
            }
            if let Some(image) = payload.image {
                post.image = Some(image).filter(|i| !i.is_empty());
            }
            if let Some(category) = payload.category {
                post.category = Some(category);
            }
            Ok(post.clone())
        })
        .await?;

    Ok(Json(json!({ "post": post })))
}

/// Only the author may delete a post.
pub async fn delete_post(
    State(store): State<PostStore>,
    Path(id): Path<String>,
    Json(payload): Json<ActingUser>,
) -> Result<impl IntoResponse, AppError> {
    store
        .mutate(|posts| {
            let idx = posts
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

            if payload.user_id.as_deref() != Some(posts[idx].author_id.as_str()) {
                return Err(AppError::Forbidden(
                    "You can only delete your own posts".to_string(),
                ));
            }

            posts.remove(idx);
            Ok(())
        })
        .await?;

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

/// Adds a comment; the newest comment is listed first.
pub async fn add_comment(
    State(store): State<PostStore>,
    Path(id): Path<String>,
    Json(payload): Json<CreatePostCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let comment = PostComment {
        id: new_id("comment"),
        author: payload.author,
        author_id: payload.author_id,
        author_avatar: payload.author_avatar,
        content: payload.content.trim().to_string(),
        date: Utc::now(),
    };

    let post = store
        .update(&id, |post| {
            post.comments_list.insert(0, comment.clone());
            post.comments = post.comments_list.len() as i64;
            Ok(post.clone())
        })
        .await?;

    Ok(Json(json!({ "post": post, "comment": comment })))
}

/// Likes the post for `userId`, or removes the like if already present.
pub async fn toggle_like(
    State(store): State<PostStore>,
    Path(id): Path<String>,
    Json(payload): Json<ActingUser>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;

    let post = store
        .update(&id, |post| {
            if let Some(pos) = post.liked_by.iter().position(|u| *u == user_id) {
                post.liked_by.remove(pos);
            } else {
                post.liked_by.push(user_id);
            }
            post.likes = post.liked_by.len() as i64;
            Ok(post.clone())
        })
        .await?;

    Ok(Json(json!({ "post": post })))
}

pub async fn upvote_post(
    State(store): State<PostStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = store
        .update(&id, |post| {
            post.upvotes += 1;
            Ok(post.clone())
        })
        .await?;

    Ok(Json(json!({ "post": post })))
}

pub async fn record_view(
    State(store): State<PostStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = store
        .update(&id, |post| {
            post.views += 1;
            Ok(post.clone())
        })
        .await?;

    Ok(Json(json!({ "post": post })))
}
