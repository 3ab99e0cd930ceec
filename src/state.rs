// src/state.rs

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{config::Config, realtime::ChatHub, store::PostStore};

/// Everything a handler may need, injected through `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub posts: PostStore,
    pub chat: ChatHub,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for PostStore {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for ChatHub {
    fn from_ref(state: &AppState) -> Self {
        state.chat.clone()
    }
}
