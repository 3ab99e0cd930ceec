// src/models/badge.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'badges' table. `(user_id, badge_name)` is unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub user_id: i64,
    pub badge_name: String,
    pub badge_type: String,
    pub earned_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A badge granted once a counter reaches `threshold`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Milestone {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub badge_type: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub threshold: i64,
}

/// Awarded on completed sessions.
pub const SESSION_MILESTONES: [Milestone; 3] = [
    Milestone {
        name: "First Session",
        badge_type: "achievement",
        description: "Complete your first mentorship session",
        threshold: 1,
    },
    Milestone {
        name: "5 Sessions",
        badge_type: "milestone",
        description: "Complete 5 mentorship sessions",
        threshold: 5,
    },
    Milestone {
        name: "10 Sessions",
        badge_type: "milestone",
        description: "Complete 10 mentorship sessions",
        threshold: 10,
    },
];

/// Awarded on submitted feedback.
pub const REVIEW_MILESTONES: [Milestone; 1] = [Milestone {
    name: "10 Reviews",
    badge_type: "achievement",
    description: "Submit 10 feedback reviews",
    threshold: 10,
}];

/// Listed in the catalog but granted outside the counters.
pub const MANUAL_BADGES: [Milestone; 2] = [
    Milestone {
        name: "Active Mentor",
        badge_type: "achievement",
        description: "Become an active mentor",
        threshold: 0,
    },
    Milestone {
        name: "Community Helper",
        badge_type: "achievement",
        description: "Help others in the forum",
        threshold: 0,
    },
];

/// Milestones reached by `count`, in threshold order.
pub fn reached(milestones: &[Milestone], count: i64) -> impl Iterator<Item = &Milestone> {
    milestones.iter().filter(move |m| count >= m.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_thresholds() {
        let names = |n| {
            reached(&SESSION_MILESTONES, n)
                .map(|m| m.name)
                .collect::<Vec<_>>()
        };
        assert!(names(0).is_empty());
        assert_eq!(names(1), vec!["First Session"]);
        assert_eq!(names(4), vec!["First Session"]);
        assert_eq!(names(5), vec!["First Session", "5 Sessions"]);
        assert_eq!(names(12).len(), 3);
    }
}
