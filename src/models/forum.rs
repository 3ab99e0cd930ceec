// src/models/forum.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'forum' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub user_id: i64,
    pub topic: String,
    pub content: String,
    /// Free-form, comma separated.
    pub tags: Option<String>,
    pub upvotes: i64,
    pub views: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Forum post with author info, as returned by list and detail views.
#[derive(Debug, Serialize, FromRow)]
pub struct ForumPostListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: ForumPost,
    pub author_name: String,
    pub author_email: String,
    pub comment_count: i64,
}

/// Represents the 'forum_comments' table joined with the author name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ForumComment {
    pub id: i64,
    pub forum_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub author_name: String,
}

#[derive(Debug, Serialize)]
pub struct ForumThread {
    #[serde(flatten)]
    pub post: ForumPostListing,
    pub comments: Vec<ForumComment>,
}

/// Sort order for the forum listing.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForumSort {
    #[default]
    Recent,
    Popular,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumListParams {
    pub tag: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: ForumSort,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumPostRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 200, message = "Topic must be between 1 and 200 chars"))]
    pub topic: String,
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be between 1 and 10000 chars"
    ))]
    pub content: String,
    #[validate(length(max = 500))]
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumCommentRequest {
    pub user_id: i64,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub content: String,
}
