pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod services;
pub mod voting;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/users/{username}",
            get(handlers::users::get_user_by_username),
        )
        .route("/api/subreddits", get(handlers::subreddits::list_subreddits))
        .route(
            "/api/subreddits/{name}",
            get(handlers::subreddits::get_subreddit),
        )
        .route(
            "/api/submissions/{submission_id}",
            get(handlers::submissions::get_thread),
        );

    // Protected routes
    let protected_routes = Router::new()
        .route("/api/users/me", put(handlers::users::update_current_user))
        .route(
            "/api/subreddits",
            post(handlers::subreddits::create_subreddit),
        )
        .route(
            "/api/subreddits/{name}/subscribe",
            post(handlers::subreddits::subscribe),
        )
        .route(
            "/api/subreddits/{name}/unsubscribe",
            post(handlers::subreddits::unsubscribe),
        )
        .route(
            "/api/subreddits/{name}/submissions",
            post(handlers::submissions::create_submission),
        )
        .route("/api/comments", post(handlers::comments::create_comment))
        .route("/api/vote", post(handlers::votes::vote));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
