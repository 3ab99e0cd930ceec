// src/handlers/chat.rs

use std::collections::HashSet;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    error::AppError,
    extract::Json,
    models::chat::{ChatMessage, Conversation, JoinChatRoom, MessagesParams, SendMessage},
    realtime::{ChatHub, Frame, chat_room, id_key, user_room},
};

/// Participants may be users or mentors, so names come from either table.
const MESSAGE_SELECT: &str = r#"
    SELECT c.id, c.sender_id, c.receiver_id, c.message, c.timestamp, c.read,
        COALESCE(u1.name, m1.name) AS sender_name,
        COALESCE(u2.name, m2.name) AS receiver_name
    FROM chats c
    LEFT JOIN users u1 ON u1.id = c.sender_id
    LEFT JOIN users u2 ON u2.id = c.receiver_id
    LEFT JOIN mentors m1 ON m1.id = c.sender_id
    LEFT JOIN mentors m2 ON m2.id = c.receiver_id
"#;

/// Messages between `reader` and `other` in either direction, oldest first.
/// Messages addressed to `reader` are marked read afterwards.
async fn history(pool: &SqlitePool, reader: i64, other: i64) -> Result<Vec<ChatMessage>, AppError> {
    let messages = sqlx::query_as::<_, ChatMessage>(&format!(
        r#"{MESSAGE_SELECT}
        WHERE (c.sender_id = ? AND c.receiver_id = ?)
           OR (c.sender_id = ? AND c.receiver_id = ?)
        ORDER BY c.timestamp ASC, c.id ASC
        "#
    ))
    .bind(reader)
    .bind(other)
    .bind(other)
    .bind(reader)
    .fetch_all(pool)
    .await?;

    sqlx::query("UPDATE chats SET read = 1 WHERE receiver_id = ? AND sender_id = ? AND read = 0")
        .bind(reader)
        .bind(other)
        .execute(pool)
        .await?;

    Ok(messages)
}

pub async fn get_messages(
    State(pool): State<SqlitePool>,
    Query(params): Query<MessagesParams>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(user_id1), Some(user_id2)) = (params.user_id1, params.user_id2) else {
        return Err(AppError::BadRequest(
            "Both userId1 and userId2 are required".to_string(),
        ));
    };

    let messages = history(&pool, user_id1, user_id2).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// History between a mentee and a mentor.
pub async fn get_chat_history(
    State(pool): State<SqlitePool>,
    Path((mentor_id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let messages = history(&pool, user_id, mentor_id).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// One row per counterpart with the latest message and the unread count.
pub async fn get_conversations(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let conversations = sqlx::query_as::<_, Conversation>(
        r#"
        WITH mine AS (
            SELECT id, CASE WHEN sender_id = ? THEN receiver_id ELSE sender_id END AS other_id
            FROM chats
            WHERE sender_id = ? OR receiver_id = ?
        ),
        latest AS (
            SELECT other_id, MAX(id) AS last_id FROM mine GROUP BY other_id
        )
        SELECT l.other_id AS other_user_id,
            u.name AS other_user_name,
            u.email AS other_user_email,
            c.message AS last_message,
            c.timestamp AS last_message_time,
            (SELECT COUNT(*) FROM chats
                WHERE sender_id = l.other_id AND receiver_id = ? AND read = 0) AS unread_count
        FROM latest l
        JOIN users u ON u.id = l.other_id
        JOIN chats c ON c.id = l.last_id
        ORDER BY c.timestamp DESC, c.id DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "conversations": conversations })))
}

/// Persists a message and returns it with display names resolved.
pub(crate) async fn save_message(
    pool: &SqlitePool,
    msg: &SendMessage,
) -> Result<ChatMessage, AppError> {
    if msg.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO chats (sender_id, receiver_id, message) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(msg.sender_id)
    .bind(msg.receiver_id)
    .bind(&msg.message)
    .fetch_one(pool)
    .await?;

    let saved = sqlx::query_as::<_, ChatMessage>(&format!("{MESSAGE_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(saved)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(pool): State<SqlitePool>,
    State(hub): State<ChatHub>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, pool, hub))
}

/// Drives one chat connection until either side goes away.
async fn handle_socket(mut socket: WebSocket, pool: SqlitePool, hub: ChatHub) {
    let mut rx = hub.subscribe();
    let mut rooms = HashSet::new();

    tracing::debug!("Chat socket connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(text) => {
                        if let Some(reply) = handle_frame(text.as_str(), &pool, &hub, &mut rooms).await {
                            if send_frame(&mut socket, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = rx.recv() => match event {
                Ok(event) if event.is_for_any(&rooms) => {
                    if send_frame(&mut socket, &event.frame).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Chat socket lagged, {} event(s) dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    tracing::debug!("Chat socket disconnected ({} room(s))", rooms.len());
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    let text = serde_json::to_string(frame).map_err(axum::Error::new)?;
    socket.send(Message::Text(text.into())).await
}

/// Applies one client frame. Returns the reply for this socket, if any.
async fn handle_frame(
    text: &str,
    pool: &SqlitePool,
    hub: &ChatHub,
    rooms: &mut HashSet<String>,
) -> Option<Frame> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Ignoring malformed chat frame: {}", e);
            return None;
        }
    };

    match frame.event.as_str() {
        "join-room" => {
            let room = user_room(id_key(&frame.data)?);
            rooms.insert(room.clone());
            Some(Frame::new("room-joined", json!({ "room": room })))
        }
        "join-chat-room" => {
            let join: JoinChatRoom = serde_json::from_value(frame.data).ok()?;
            let room = chat_room(id_key(&join.user_id)?, id_key(&join.mentor_id)?);
            rooms.insert(room.clone());
            Some(Frame::new("room-joined", json!({ "room": room })))
        }
        "send-message" => {
            let result = match serde_json::from_value::<SendMessage>(frame.data) {
                Ok(msg) => save_message(pool, &msg).await.map(|saved| (msg, saved)),
                Err(e) => Err(AppError::from(e)),
            };

            match result {
                Ok((msg, saved)) => {
                    let data = json!(saved);
                    hub.publish(
                        vec![
                            user_room(msg.receiver_id),
                            chat_room(msg.sender_id, msg.receiver_id),
                            chat_room(msg.receiver_id, msg.sender_id),
                        ],
                        Frame::new("new-message", data.clone()),
                    );
                    Some(Frame::new("message-sent", data))
                }
                Err(e) => {
                    tracing::error!("Error sending message: {}", e);
                    Some(Frame::new(
                        "message-error",
                        json!({ "error": "Failed to send message" }),
                    ))
                }
            }
        }
        other => {
            tracing::debug!("Unknown chat event '{}'", other);
            None
        }
    }
}
