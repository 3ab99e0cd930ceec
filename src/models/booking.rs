// src/models/booking.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle of a mentorship session.
///
/// `pending -> confirmed -> completed`, and either non-terminal state may be
/// cancelled. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an explicit status update may move a booking from `self` to `next`.
    /// Re-applying the current status is allowed and has no effect.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending | Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// Represents the 'bookings' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub mentor_id: i64,
    pub user_id: i64,
    /// Session start.
    pub date: chrono::DateTime<chrono::Utc>,
    pub topic: String,
    pub status: BookingStatus,
    /// Length in minutes.
    pub duration: i64,
    pub meeting_link: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Booking joined with mentor and mentee display data.
#[derive(Debug, Serialize, FromRow)]
pub struct BookingDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub mentor_name: String,
    pub mentor_domain: String,
    pub user_name: String,
    pub user_email: String,
}

/// DTO for requesting a session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub mentor_id: Option<i64>,
    pub user_id: Option<i64>,
    pub date: Option<String>,
    #[validate(length(max = 200, message = "Topic must be at most 200 characters"))]
    pub topic: Option<String>,
    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration: Option<i64>,
}

/// DTO for moving a booking through its lifecycle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub status: Option<String>,
    pub meeting_link: Option<String>,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListParams {
    pub user_id: Option<i64>,
    pub mentor_id: Option<i64>,
    pub status: Option<String>,
}
