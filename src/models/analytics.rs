// src/models/analytics.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: i64,
    pub total_mentors: i64,
    pub total_bookings: i64,
    pub completed_bookings: i64,
    /// Distinct mentees with a session in the last 30 days.
    pub active_users: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopMentor {
    pub id: i64,
    pub name: String,
    pub domain: String,
    pub rating: f64,
    pub session_count: i64,
}

/// `month` is `YYYY-MM`.
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopicCount {
    pub topic: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overview: Overview,
    pub top_mentors: Vec<TopMentor>,
    pub bookings_per_month: Vec<MonthlyCount>,
    pub active_users_over_time: Vec<MonthlyCount>,
    pub top_topics: Vec<TopicCount>,
}
