// src/realtime.rs

//! Room-based fan-out for chat events.
//!
//! A single `tokio::sync::broadcast` channel carries every event; each socket
//! keeps its own set of joined rooms and drops events addressed elsewhere.
//! Delivery is at-most-once: a lagging or disconnected socket misses pushes,
//! but the underlying rows stay in the database.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// An event addressed to one or more rooms.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub rooms: Vec<String>,
    pub frame: Frame,
}

impl RoomEvent {
    pub fn is_for_any(&self, joined: &std::collections::HashSet<String>) -> bool {
        self.rooms.iter().any(|room| joined.contains(room))
    }
}

/// Wire envelope shared by both directions: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            data,
        }
    }
}

#[derive(Clone)]
pub struct ChatHub {
    tx: broadcast::Sender<RoomEvent>,
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.tx.subscribe()
    }

    /// Publishes `frame` to `rooms`. Returns how many sockets were listening.
    pub fn publish(&self, rooms: Vec<String>, frame: Frame) -> usize {
        self.tx.send(RoomEvent { rooms, frame }).unwrap_or(0)
    }
}

pub fn user_room(user_id: impl std::fmt::Display) -> String {
    format!("user-{}", user_id)
}

pub fn chat_room(a: impl std::fmt::Display, b: impl std::fmt::Display) -> String {
    format!("chat-{}-{}", a, b)
}

/// Renders a JSON id (number or string) the way it appears in room names.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn subscribers_see_published_events() {
        let hub = ChatHub::new();
        let mut rx = hub.subscribe();
        let n = hub.publish(
            vec![user_room(2)],
            Frame::new("new-message", serde_json::json!({"id": 1})),
        );
        assert_eq!(n, 1);

        let ev = rx.recv().await.unwrap();
        let joined: HashSet<String> = [user_room(2)].into_iter().collect();
        assert!(ev.is_for_any(&joined));
        assert_eq!(ev.frame.event, "new-message");
    }

    #[test]
    fn publishing_without_listeners_is_harmless() {
        let hub = ChatHub::new();
        assert_eq!(hub.publish(vec![chat_room(1, 2)], Frame::new("x", Value::Null)), 0);
    }

    #[test]
    fn id_keys_accept_numbers_and_strings() {
        assert_eq!(id_key(&serde_json::json!(5)), Some("5".to_string()));
        assert_eq!(id_key(&serde_json::json!("5")), Some("5".to_string()));
        assert_eq!(id_key(&serde_json::json!(null)), None);
    }
}
