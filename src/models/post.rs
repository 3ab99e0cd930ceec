// src/models/post.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A community post as persisted in the JSON store.
///
/// Field names are camelCase on disk and on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub author_verified: bool,
    pub date: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub content: String,
    pub upvotes: i64,
    /// Always equal to `liked_by.len()`.
    pub likes: i64,
    pub liked_by: Vec<String>,
    pub views: i64,
    /// Always equal to `comments_list.len()`.
    pub comments: i64,
    pub comments_list: Vec<PostComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub id: String,
    pub author: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub content: String,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// Sort order for the community feed.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Votes,
    Newest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListParams {
    #[serde(default)]
    pub sort_by: PostSort,
}

/// Text fields are stored trimmed, so whitespace alone counts as empty.
fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank")
            .with_message("Must not be blank".into()));
    }
    Ok(())
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ), custom(function = not_blank))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ), custom(function = not_blank))]
    pub content: String,

    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 100))]
    pub author_id: String,
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub author_verified: bool,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Editable fields of a post. Counters are only changed through their own endpoints.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200), custom(function = not_blank))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000), custom(function = not_blank))]
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostCommentRequest {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ), custom(function = not_blank))]
    pub content: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 100))]
    pub author_id: String,
    pub author_avatar: Option<String>,
}

/// Identifies the acting user for like/delete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUser {
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, content: &str) -> CreatePostRequest {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "content": content,
            "author": "Ann",
            "authorId": "u1"
        }))
        .unwrap()
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let err = create("   ", "Body").validate().unwrap_err();
        assert!(err.field_errors().contains_key("title"));
    }

    #[test]
    fn whitespace_edit_is_rejected_but_absent_fields_pass() {
        let edit = UpdatePostRequest {
            content: Some("\n\t ".to_string()),
            ..Default::default()
        };
        assert!(edit.validate().unwrap_err().field_errors().contains_key("content"));
        assert!(UpdatePostRequest::default().validate().is_ok());
    }

    #[test]
    fn padded_text_is_accepted() {
        assert!(create("  Rust tips  ", " Use clippy. ").validate().is_ok());
    }
}
