//! # cb-api
//!
//! The web routing and orchestration layer for Campus-Board. HTTP framing
//! only: authentication happens upstream and arrives as an `x-user-id`
//! header; everything consequential lives in `cb-services`.

pub mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use cb_services::ForumService;

/// State shared across all handler tasks.
pub struct AppState {
    pub service: ForumService,
}

/// Builds the application router.
///
/// Mutations live under /actions/ (mirroring the upstream gateway's
/// route map); reads hang off the entity collections.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/topics", get(handlers::list_topics).post(handlers::create_topic))
        .route("/topics/{name}/posts", get(handlers::list_posts_for_topic))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/posts/{id}/comments", get(handlers::list_comments))
        .route("/images", post(handlers::create_image))
        .route("/images/{id}", get(handlers::get_image))
        .route("/actions/create-post", post(handlers::create_post))
        .route("/actions/create-comment", post(handlers::create_comment))
        .route("/actions/update-post/{id}", patch(handlers::update_post))
        .route("/actions/update-comment/{id}", patch(handlers::update_comment))
        .route("/actions/delete-post/{id}", delete(handlers::delete_post))
        .route("/actions/delete-comment/{id}", delete(handlers::delete_comment))
        .route("/actions/toggle-bookmark/{post}", post(handlers::toggle_bookmark))
        .route("/actions/toggle-like-post/{post}", post(handlers::toggle_like_post))
        .route(
            "/actions/toggle-like-comment/{comment}",
            post(handlers::toggle_like_comment),
        )
        .route("/actions/my-bookmarks", get(handlers::my_bookmarks))
        .route("/actions/my-likes", get(handlers::my_likes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
