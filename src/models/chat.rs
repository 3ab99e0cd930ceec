// src/models/chat.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted chat message with resolved display names.
///
/// Sender and receiver ids may point at a user or at a mentor.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub read: bool,
    pub sender_name: Option<String>,
    #[sqlx(default)]
    pub receiver_name: Option<String>,
}

/// Latest state of a conversation from one participant's side.
#[derive(Debug, Serialize, FromRow)]
pub struct Conversation {
    pub other_user_id: i64,
    pub other_user_name: String,
    pub other_user_email: String,
    pub last_message: Option<String>,
    pub last_message_time: Option<chrono::DateTime<chrono::Utc>>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesParams {
    pub user_id1: Option<i64>,
    pub user_id2: Option<i64>,
}

/// Payload of a `send-message` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}

/// Payload of a `join-chat-room` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChatRoom {
    pub user_id: serde_json::Value,
    pub mentor_id: serde_json::Value,
}
