// src/models/mentor.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use super::{booking::Booking, feedback::FeedbackDetail};

/// Represents the 'mentors' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Mentor {
    pub id: i64,

    /// Owning account. Seeded directory entries have none.
    pub user_id: Option<i64>,

    pub name: String,
    pub domain: String,

    /// Stored as a JSON array in a TEXT column.
    pub skills: Option<Json<Vec<String>>>,

    pub bio: Option<String>,
    pub experience: Option<String>,

    /// Mean of all feedback ratings for this mentor.
    pub rating: f64,
    /// Number of feedback rows behind `rating`.
    pub total_ratings: i64,

    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub profile_image: Option<String>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Directory row: the mentor plus account email and session counters.
#[derive(Debug, Serialize, FromRow)]
pub struct MentorListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub mentor: Mentor,
    pub email: Option<String>,
    pub total_sessions: i64,
    pub total_feedback: i64,
}

/// Full mentor profile returned by `GET /api/mentors/{id}`.
#[derive(Debug, Serialize)]
pub struct MentorProfile {
    #[serde(flatten)]
    pub listing: MentorListing,
    #[serde(rename = "upcomingBookings")]
    pub upcoming_bookings: Vec<Booking>,
    #[serde(rename = "recentFeedback")]
    pub recent_feedback: Vec<FeedbackDetail>,
}

/// Query parameters for listing mentors.
#[derive(Debug, Deserialize)]
pub struct MentorListParams {
    /// Substring match on domain. `all` disables the filter.
    pub domain: Option<String>,
    /// Free text matched against name, bio, domain and skills.
    pub search: Option<String>,
}

/// DTO for turning an account into a mentor (or updating its profile).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMentorRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "domain is required"))]
    pub domain: String,
    #[validate(length(min = 1, max = 5000, message = "bio is required"))]
    pub bio: String,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    #[validate(url)]
    pub linkedin: Option<String>,
    #[validate(url)]
    pub github: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(alias = "hourly_rate")]
    pub hourly_rate: Option<f64>,
    pub availability: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingRequest {
    pub mentor_id: i64,
}
