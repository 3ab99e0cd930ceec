// src/models/feedback.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'feedback' table. One row per booking.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub mentor_id: i64,
    /// 1 to 5 stars.
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Feedback with the reviewer's name and email.
#[derive(Debug, Serialize, FromRow)]
pub struct FeedbackDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user_name: String,
    pub user_email: String,
}

/// DTO for submitting a review of a session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub booking_id: Option<i64>,
    pub user_id: Option<i64>,
    pub mentor_id: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i64>,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListParams {
    pub mentor_id: Option<i64>,
}
