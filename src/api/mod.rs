// HTTP surface - REST API for reviews, comments, and identities

pub mod auth;
pub mod comments;
pub mod reviews;
pub mod users;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::auth::auth_middleware;

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "bookclub",
        "timestamp": Utc::now().timestamp()
    }))
}

pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        // Review operations
        .route(
            "/api/reviews",
            get(reviews::list_reviews_handler).post(reviews::create_review_handler),
        )
        .route(
            "/api/reviews/{id}",
            get(reviews::get_review_handler)
                .put(reviews::update_review_handler)
                .delete(reviews::delete_review_handler),
        )
        .route("/api/reviews/{id}/view", post(reviews::record_view_handler))
        // Comment operations
        .route(
            "/api/reviews/{id}/comments",
            get(comments::list_review_comments_handler).post(comments::create_comment_handler),
        )
        .route(
            "/api/comments/{id}",
            put(comments::update_comment_handler).delete(comments::delete_comment_handler),
        )
        .route(
            "/api/users/{username}/comments",
            get(comments::list_author_comments_handler),
        )
        // Identity operations
        .route("/api/users/check", get(users::check_username_handler))
        .route("/api/me", get(users::me_handler))
        .route("/api/auth/signup", post(auth::signup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/social/pending", post(auth::pending_username_handler))
        .route("/api/auth/social", post(auth::social_login_handler))
        .route("/api/auth/email/code", post(auth::email_code_handler))
        .route("/api/auth/password/reset", post(auth::password_reset_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
