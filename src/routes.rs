// src/routes.rs

use axum::{
    Json, Router,
    extract::OriginalUri,
    http::{Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{
        self, admin, ai, auth, badge, booking, chat, feedback, forum, mentor, peer, posts,
        progress,
    },
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Nests every REST resource under `/api` and mounts the chat socket at `/ws`.
/// * Guards `/api/admin` with authentication followed by the admin role check.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/registration", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/login", post(auth::sign_in))
        .route("/token/refresh", post(auth::refresh_token))
        .route("/user/{email}", get(auth::get_user))
        .route("/reset-request", post(auth::request_password_reset))
        .route("/reset-password", post(auth::reset_password))
        .route("/google", get(auth::google_auth))
        .route("/google/callback", get(auth::google_callback));

    let mentor_routes = Router::new()
        .route("/", get(mentor::list_mentors))
        .route("/domain/{domain}", get(mentor::list_by_domain))
        .route("/update-rating", post(mentor::update_rating))
        .route("/register", post(mentor::register_mentor))
        .route("/{id}", get(mentor::get_mentor));

    let booking_routes = Router::new()
        .route("/", get(booking::list_bookings).post(booking::create_booking))
        .route(
            "/{id}",
            put(booking::update_booking_status).delete(booking::delete_booking),
        );

    let forum_routes = Router::new()
        .route("/", get(forum::list_posts).post(forum::create_post))
        .route("/{id}", get(forum::get_post))
        .route("/{id}/comment", post(forum::add_comment))
        .route("/{id}/upvote", post(forum::upvote_post));

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/{id}", put(posts::update_post).delete(posts::delete_post))
        .route("/{id}/comments", post(posts::add_comment))
        .route("/{id}/like", post(posts::toggle_like))
        .route("/{id}/upvote", post(posts::upvote_post))
        .route("/{id}/view", post(posts::record_view));

    let peer_routes = Router::new()
        .route("/find", get(peer::find_peers))
        .route("/connections/{user_id}", get(peer::list_connections))
        .route("/connect", post(peer::connect))
        .route("/{id}", put(peer::update_connection));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/analytics", get(admin::analytics))
        // Auth runs first (outermost), then the role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/auth", auth_routes)
        .nest("/mentors", mentor_routes)
        .nest("/bookings", booking_routes)
        .route("/feedback", get(feedback::list_feedback).post(feedback::submit_feedback))
        .route("/badges", get(badge::catalog))
        .route("/badges/{user_id}", get(badge::user_badges))
        .nest("/forum", forum_routes)
        .nest("/posts", post_routes)
        .nest("/peers", peer_routes)
        .route("/progress", post(progress::update_progress))
        .route("/progress/{user_id}", get(progress::get_progress))
        .route("/chats/conversations/{user_id}", get(chat::get_conversations))
        .route("/chats/messages", get(chat::get_messages))
        .route("/chat/{mentor_id}/{user_id}", get(chat::get_chat_history))
        .route("/ai/recommend", post(ai::recommend_mentors))
        .route("/ai/pathway", post(ai::generate_pathway))
        .nest("/admin", admin_routes)
        .fallback(api_not_found);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(chat::ws_handler))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "API route not found", "path": uri.path() })),
    )
}
