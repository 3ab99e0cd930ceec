// src/models/peer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'peer_connections' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PeerConnection {
    pub id: i64,
    /// Requesting user.
    pub user_id: i64,
    pub peer_id: i64,
    /// 'pending', 'accepted' or 'rejected'.
    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Accepted connection seen from one side, with the other side's details.
#[derive(Debug, Serialize, FromRow)]
pub struct PeerConnectionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub connection: PeerConnection,
    pub peer_name: String,
    pub peer_email: String,
    pub peer_sessions: i64,
}

/// A suggested study partner.
#[derive(Debug, Serialize, FromRow)]
pub struct PeerSuggestion {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub session_count: i64,
    /// Absent when the requester has no booking history to compare against.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_topics: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPeersParams {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub user_id: Option<i64>,
    pub peer_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub status: Option<String>,
}
